//! src/page/read.rs
//! Page-sized reads and plaintext detection

use crate::consts::{PLAINTEXT_HEADER, PLAINTEXT_MAGIC_LEN};
use std::io::{ErrorKind, Read};

/// Fill `buf` from `reader`, stopping early only at EOF.
///
/// Returns the number of bytes read: `buf.len()` for a full page, less for a
/// trailing partial page, `0` at end of input.
#[inline(always)]
pub fn read_page<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// `true` when `page` starts with the plaintext database magic.
#[inline(always)]
pub fn is_plaintext_database(page: &[u8]) -> bool {
    page.len() >= PLAINTEXT_MAGIC_LEN
        && page[..PLAINTEXT_MAGIC_LEN] == PLAINTEXT_HEADER[..PLAINTEXT_MAGIC_LEN]
}
