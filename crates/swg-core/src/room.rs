//! Room codes: the rendezvous identifier two peers share out of band.
//!
//! A code doubles as the transport-level target id; how the channel is
//! actually established from it is the transport's business.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A six-character room code.
///
/// The alphabet skips the ambiguous characters (I, O, 0, 1) so codes
/// survive being read aloud or retyped from a screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomCode(String);

impl RoomCode {
    /// Characters a generated code may contain.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

    /// Length of a generated code.
    pub const LEN: usize = 6;

    /// Shortest input `parse` accepts; joiners sometimes type partial codes.
    const MIN_LEN: usize = 4;

    /// Generate a fresh random code.
    pub fn generate() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let code = (0..Self::LEN)
            .map(|_| Self::ALPHABET[rng.gen_range(0..Self::ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Parse user input into a code.
    ///
    /// Accepts a bare code, a share link carrying a `?room=` parameter,
    /// or any URL whose last path segment is the code. Everything
    /// non-alphanumeric is stripped and the rest uppercased.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let raw = if let Some((_, rest)) = input.split_once("?room=") {
            rest.split('&').next().unwrap_or(rest)
        } else if input.contains("http") {
            input.rsplit('/').next().unwrap_or(input)
        } else {
            input
        };

        let code: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if code.len() < Self::MIN_LEN {
            return Err(CoreError::CodeTooShort {
                min: Self::MIN_LEN,
                got: code.len(),
            });
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_shape() {
        for _ in 0..50 {
            let code = RoomCode::generate();
            assert_eq!(code.as_str().len(), RoomCode::LEN);
            assert!(code
                .as_str()
                .bytes()
                .all(|b| RoomCode::ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_parse_bare_code() {
        let code = RoomCode::parse("ab2c9x").unwrap();
        assert_eq!(code.as_str(), "AB2C9X");
    }

    #[test]
    fn test_parse_share_link() {
        let code = RoomCode::parse("https://example.com/play?room=QZXW42&utm=x").unwrap();
        assert_eq!(code.as_str(), "QZXW42");
    }

    #[test]
    fn test_parse_plain_url() {
        let code = RoomCode::parse("https://example.com/rooms/QZXW42").unwrap();
        assert_eq!(code.as_str(), "QZXW42");
    }

    #[test]
    fn test_parse_strips_noise() {
        let code = RoomCode::parse(" qz-xw 42 ").unwrap();
        assert_eq!(code.as_str(), "QZXW42");
    }

    #[test]
    fn test_parse_rejects_short() {
        assert!(matches!(
            RoomCode::parse("ab"),
            Err(CoreError::CodeTooShort { min: 4, got: 2 })
        ));
    }
}
