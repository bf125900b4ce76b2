//! Key derivation functions.

pub mod pbkdf2;
