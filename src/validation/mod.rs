//! Transaction and script primitives

pub mod script;
pub mod transaction;

pub use script::Script;
pub use transaction::{OutPoint, Transaction, TxIn, TxOut, JOINSPLIT_VERSION, LEGACY_AUTH_DIGEST};
