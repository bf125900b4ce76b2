//! # Secure-Gate Type Aliases
//!
//! Fixed-size secret buffers used across the crate. Every type here is a
//! [`secure_gate::Fixed`] and is zeroized on drop; callers must go through
//! `.expose_secret()` / `.expose_secret_mut()` to touch the bytes.
//!
//! ## Type Categories
//!
//! ### HMAC Primitives
//! - [`HmacSha512`] - page authentication and PBKDF2 PRF
//!
//! ### Fixed-Size Secrets
//! - [`Aes128Key16`] - runtime media key recovered from process memory
//! - [`Aes256Key32`] - database raw key, page encryption key, page MAC key
//! - [`Iv16`] - per-page CBC initialization vector
//! - [`Salt16`] - database file salt (first 16 bytes of page 0)
//!
//! ### Generic Secure Buffers
//! - [`SpanBuffer<N>`] - generic secure stack buffer for any size `N`

use hmac::Hmac;
use sha2::Sha512;

// ─────────────────────────────────────────────────────────────────────────────
// HMAC primitives
// ─────────────────────────────────────────────────────────────────────────────
pub type HmacSha512 = Hmac<Sha512>;

// ─────────────────────────────────────────────────────────────────────────────
// SpanBuffer: generic secure stack buffer (direct alias to secure-gate's Fixed)
// ─────────────────────────────────────────────────────────────────────────────
pub type SpanBuffer<const N: usize> = secure_gate::Fixed<[u8; N]>;

// ─────────────────────────────────────────────────────────────────────────────
// Fixed-size concrete secrets, alphabetical order
// ─────────────────────────────────────────────────────────────────────────────
pub type Aes128Key16 = SpanBuffer<16>; // media AES-128 key
pub type Aes256Key32 = SpanBuffer<32>; // raw key, enc key, mac key
pub type Iv16 = SpanBuffer<16>; // page IV
pub type Salt16 = SpanBuffer<16>; // page 0 salt
