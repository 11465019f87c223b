//! Signed-up participants and their registry leaves.

use crate::field::Field;
use crate::hash::hash_fields;
use crate::keys::PublicKey;
use serde::{Deserialize, Serialize};

const DOMAIN_REGISTRY_LEAF: &str = "urna.participant.leaf";

/// One signed-up participant, in signup order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// The key the participant signed up with.
    pub public_key: PublicKey,
    /// Initial voice credit balance.
    pub voice_credits: u64,
    /// Block timestamp of the signup.
    pub signup_timestamp: u64,
}

impl Participant {
    /// The signup-tree leaf committed for this participant.
    #[must_use]
    pub fn leaf(&self) -> Field {
        hash_fields(
            DOMAIN_REGISTRY_LEAF,
            &[
                self.public_key.hash(),
                Field::from_u64(self.voice_credits),
                Field::from_u64(self.signup_timestamp),
            ],
        )
    }
}
