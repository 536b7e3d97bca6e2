//! Random identifier generation.
//!
//! Bytes from the OS RNG are masked down to the smallest power of two that
//! covers the alphabet; values that fall outside the alphabet are rejected
//! instead of wrapped, so every character is equally likely.

use rand::{rngs::OsRng, RngCore};

/// Alphanumerics with visually ambiguous characters removed.
pub const READABLE_CHARSET: &str = "abcdefghjmnortvwxyABDEFGHIJKLMNPQRSTU23456789";
/// URL-safe alphabet used for session identifiers.
pub const URL_SAFE_CHARSET: &str =
    "_-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const SESSION_ID_LEN: usize = 32;

/// Human-readable id. With the 45 character alphabet and 17 characters a
/// collision is not expected within any realistic id volume.
pub fn readable(len: usize) -> String {
    generate(len, READABLE_CHARSET)
}

pub fn session_id() -> String {
    generate(SESSION_ID_LEN, URL_SAFE_CHARSET)
}

pub fn generate(len: usize, charset: &str) -> String {
    let alphabet = charset.as_bytes();
    debug_assert!(!alphabet.is_empty() && alphabet.len() <= 256);
    let mask = mask_for(alphabet.len());

    let mut out = String::with_capacity(len);
    // Rejection sampling may skip bytes, so over-provision the buffer.
    let mut buf = vec![0u8; len.max(1) * 2];
    while out.len() < len {
        OsRng.fill_bytes(&mut buf);
        for byte in &buf {
            let idx = (*byte as usize) & mask;
            if let Some(c) = alphabet.get(idx) {
                out.push(*c as char);
                if out.len() == len {
                    break;
                }
            }
        }
    }
    out
}

fn mask_for(alphabet_len: usize) -> usize {
    let highest = ((alphabet_len - 1) | 1) as u32;
    (2usize << (31 - highest.leading_zeros())) - 1
}
