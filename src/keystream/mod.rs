// src/keystream/mod.rs

//! Keyed XOR keystream for media payloads.
//!
//! [`keystream`] turns a decimal key into `length` bytes; [`xor_decrypt`]
//! applies it to a buffer. The generator is ISAAC64 ([`Isaac64`]) with a
//! target-specific block reversal applied on top ([`Keystream`]).

pub(crate) mod isaac64;
pub(crate) mod stream;

pub use isaac64::Isaac64;
pub use stream::{keystream, parse_seed, xor_decrypt, Keystream, MediaKind};
