//! Foundational value types for the Urna voting protocol.
//!
//! This crate contains only pure value types and deterministic hashing —
//! no I/O, no async, no protocol logic. The reconstruction engine in
//! `urna-replay` builds on these.
//!
//! # Contents
//!
//! - [`Field`]: the 32-byte scalar word used for payload words, tree leaves,
//!   tree roots, and key hashes
//! - [`hash`]: domain-separated hashing, the single source of truth for the
//!   commitment algorithm
//! - [`keys`]: participant and coordinator key material
//! - [`Message`]: one published command ciphertext and its leaf/key hashes
//! - [`Participant`]: one signed-up participant and its registry leaf
//! - [`params`]: per-poll numeric parameters supplied by the chain

#![forbid(unsafe_code)]

pub mod field;
pub mod hash;
pub mod keys;
pub mod message;
pub mod params;
pub mod participant;

pub use field::Field;
pub use keys::{Keypair, PublicKey, SecretKey};
pub use message::{Ciphertext, Message};
pub use params::{BatchSizes, MaxValues, PollCounts, PollParams, TreeDepths};
pub use participant::Participant;
