// src/envelope/mod.rs

//! Envelope decryption search.
//!
//! Media envelopes of unknown internal layout are attacked with an ordered,
//! bounded table of `(key derivation × layout × cipher mode)` strategies.
//! The first strategy that authenticates (AES-GCM) or yields a recognised
//! image (CBC/ECB fallbacks) wins.
//!
//! New layouts are appended to [`AEAD_LAYOUTS`] or [`FALLBACKS`]; the search
//! loop never changes.

pub(crate) mod derive;
pub(crate) mod layout;
pub(crate) mod search;

pub use derive::{CandidateKey, KeyDerivation, KEY_DERIVATIONS};
pub use layout::{AeadLayout, AeadParts, FallbackMode, AEAD_LAYOUTS, FALLBACKS};
pub use search::{
    decrypt_envelope, decrypt_envelope_any, strategy_table, EnvelopePlaintext, Mode, Strategy,
};
