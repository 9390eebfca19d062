//! Short key generation.
//!
//! Keys are the base-62 digits of a sequence number, most significant digit first. The digit
//! alphabet is `a-z`, `A-Z`, `0-9`, so every key is safe to use as a URL path segment without
//! escaping.

/// the digits used by [`gen_key`], `KEY_CHARS[0]` is the zero digit
const KEY_CHARS: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// longest possible key, base-62 digits needed for `u64::MAX`
const MAX_KEY_LEN: usize = 11;

/// Trait for deriving a short key from a sequence number.
///
/// Implementations must be pure and injective over the sequence numbers they are given, and
/// must only emit characters that are valid in a URL path segment.
pub trait KeyGenerator: Send + Sync + 'static {
    /// derive the key for `seq`
    fn generate(&self, seq: u64) -> String;
}

/// The default [`KeyGenerator`], see [`gen_key`].
#[derive(Debug, Default, Copy, Clone)]
pub struct Base62;

impl KeyGenerator for Base62 {
    fn generate(&self, seq: u64) -> String {
        gen_key(seq)
    }
}

/// encodes `n` as a base-62 key.
///
/// ```rust
/// use urlstore::gen_key;
/// assert_eq!(gen_key(0), "a");
/// assert_eq!(gen_key(62), "ba");
/// ```
pub fn gen_key(mut n: u64) -> String {
    let base = KEY_CHARS.len() as u64;
    let mut digits = [0_u8; MAX_KEY_LEN];
    let mut i = MAX_KEY_LEN;
    loop {
        i -= 1;
        digits[i] = KEY_CHARS[(n % base) as usize];
        n /= base;
        if n == 0 {
            break;
        }
    }
    // every byte comes from KEY_CHARS, which is ascii
    digits[i..].iter().map(|&b| b as char).collect()
}
