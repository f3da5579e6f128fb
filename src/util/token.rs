//! Experiment access tokens and canonical URLs.
use crate::errors::ScaffoldError;

pub const TOKEN_ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const DEFAULT_TOKEN_LEN: usize = 16;

// Largest multiple of 36 that fits in a byte; bytes at or above it are discarded.
const ACCEPT_BELOW: u8 = 252;

/// Generate a token of `len` symbols from [a-z0-9], each drawn uniformly from the OS CSPRNG.
pub fn make_token(len: usize) -> Result<String, ScaffoldError> {
    let mut out = String::with_capacity(len);
    let mut buf = [0u8; 32];
    while out.len() < len {
        getrandom::getrandom(&mut buf).map_err(|e| ScaffoldError::Random(e.to_string()))?;
        for b in buf {
            if b >= ACCEPT_BELOW {
                continue;
            }
            out.push(TOKEN_ALPHABET[(b % 36) as usize] as char);
            if out.len() == len {
                break;
            }
        }
    }
    Ok(out)
}

pub fn make_default_token() -> Result<String, ScaffoldError> {
    make_token(DEFAULT_TOKEN_LEN)
}

/// `<base>/experiments/<name>-<token>`; trailing slashes on the base are dropped.
pub fn build_url(base_url: &str, name: &str, token: &str) -> String {
    format!(
        "{}/experiments/{}-{}",
        base_url.trim_end_matches('/'),
        name,
        token
    )
}
