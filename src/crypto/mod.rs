//! Cryptography module - SHA-256d/BLAKE2b hashing, yespower, Merkle trees, block commitments

mod hash;
mod merkle;
mod commitments;
mod yespower;

pub use hash::*;
pub use merkle::*;
pub use commitments::*;
pub use yespower::*;
