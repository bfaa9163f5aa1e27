//! Random value generation for key rotation
//!
//! Values are drawn uniformly from a fixed alphabet using the thread-local
//! RNG, which is seeded from the operating system and reseeds periodically.

use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Upper bound on generated value length
pub const MAX_LENGTH: usize = 4096;

/// Default generated value length
pub const DEFAULT_LENGTH: usize = 32;

/// Character sets for generated values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    /// a-zA-Z0-9 (default)
    #[default]
    Alphanumeric,
    /// 0-9a-f
    Hex,
    /// a-zA-Z0-9-_ (URL safe)
    Base64Url,
}

impl Charset {
    /// Get the character set as bytes
    pub const fn chars(&self) -> &'static [u8] {
        match self {
            Self::Alphanumeric => b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
            Self::Hex => b"0123456789abcdef",
            Self::Base64Url => b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-_",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Alphanumeric => "alphanumeric",
            Self::Hex => "hex",
            Self::Base64Url => "base64url",
        }
    }
}

impl FromStr for Charset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "alphanumeric" => Ok(Self::Alphanumeric),
            "hex" => Ok(Self::Hex),
            "base64url" => Ok(Self::Base64Url),
            _ => Err(CoreError::UnknownCharset {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Generate a random string of `length` characters drawn from `charset`
pub fn random_value(length: usize, charset: Charset) -> Result<String> {
    if length == 0 {
        return Err(CoreError::format("length must be positive"));
    }
    if length > MAX_LENGTH {
        return Err(CoreError::InvalidLength {
            length,
            max: MAX_LENGTH,
        });
    }

    let chars = charset.chars();
    let mut rng = rand::rng();
    Ok((0..length)
        .map(|_| chars[rng.random_range(0..chars.len())] as char)
        .collect())
}
