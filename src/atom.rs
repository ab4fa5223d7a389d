// src/atom.rs
//! Symbolic actor names ("atoms").
//!
//! A name is at most ten characters drawn from `[0-9A-Za-z_]`, packed into a
//! single `u64`: a `0xF` marker followed by one 6-bit code per character.
//! Names therefore hash and compare as plain integers and can cross a
//! transport boundary as one word.

use std::fmt;
use std::str::FromStr;

use crate::error::{IrisError, Result};

/// Maximum number of characters in an [`ActorName`].
pub const MAX_NAME_LEN: usize = 10;

const MARKER: u64 = 0xF;
const CODE_BITS: u32 = 6;
const CODE_MASK: u64 = 0x3F;

/// Index is the 6-bit code; code 0 is padding and never produced by `new`.
const DECODING_TABLE: &[u8; 64] =
    b" 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

fn encode_char(ch: char) -> Option<u64> {
    let code = match ch {
        '0'..='9' => ch as u64 - '0' as u64 + 1,
        'A'..='Z' => ch as u64 - 'A' as u64 + 11,
        '_' => 37,
        'a'..='z' => ch as u64 - 'a' as u64 + 38,
        _ => return None,
    };
    Some(code)
}

/// Well-known actor name, the second key domain of the registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorName(u64);

impl ActorName {
    /// Encode `name`, rejecting anything longer than [`MAX_NAME_LEN`] or
    /// outside the name alphabet.
    pub fn new(name: &str) -> Result<Self> {
        if name.chars().count() > MAX_NAME_LEN {
            return Err(IrisError::NameTooLong {
                name: name.to_string(),
                max: MAX_NAME_LEN,
            });
        }
        let mut packed = MARKER;
        for ch in name.chars() {
            let code = encode_char(ch).ok_or_else(|| IrisError::InvalidNameChar {
                name: name.to_string(),
                ch,
            })?;
            packed = (packed << CODE_BITS) | code;
        }
        Ok(Self(packed))
    }

    /// Rebuild a name from its packed form, e.g. after reading it off the wire.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Decoded text of this name.
    pub fn as_string(&self) -> String {
        let mut out = String::with_capacity(MAX_NAME_LEN);
        // The full ten-character form keeps its marker in the top nibble.
        let mut reading = self.0 >> 60 == MARKER;
        for group in (0..MAX_NAME_LEN as u32).rev() {
            let code = (self.0 >> (group * CODE_BITS)) & CODE_MASK;
            if reading {
                out.push(DECODING_TABLE[code as usize] as char);
            } else if code == MARKER {
                reading = true;
            }
        }
        out
    }
}

impl FromStr for ActorName {
    type Err = IrisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ActorName {
    type Error = IrisError;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for ActorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl fmt::Debug for ActorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorName({:?})", self.as_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_encodings() {
        assert_eq!(ActorName::new("").unwrap().as_raw(), 0xF);
        // 'a' is code 38
        assert_eq!(ActorName::new("a").unwrap().as_raw(), (0xF << 6) | 38);
        assert_eq!(ActorName::new("a").unwrap().as_string(), "a");
    }

    #[test]
    fn full_length_name_uses_top_nibble_marker() {
        let name = ActorName::new("abcdefghij").unwrap();
        assert_eq!(name.as_raw() >> 60, 0xF);
        assert_eq!(name.to_string(), "abcdefghij");
    }

    #[test]
    fn marker_lookalike_characters_decode() {
        // 'E' shares its code with the marker; it must still decode.
        for s in ["E", "EE", "xEx", "EEEEEEEEEE"] {
            assert_eq!(ActorName::new(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn rejects_long_and_invalid_names() {
        assert!(matches!(
            ActorName::new("abcdefghijk"),
            Err(IrisError::NameTooLong { max: 10, .. })
        ));
        assert!(matches!(
            ActorName::new("a-b"),
            Err(IrisError::InvalidNameChar { ch: '-', .. })
        ));
        assert!(ActorName::new("spa ce").is_err());
    }

    #[test]
    fn distinct_names_distinct_values() {
        let a = ActorName::new("server").unwrap();
        let b = ActorName::new("Server").unwrap();
        assert_ne!(a, b);
        assert_eq!(a, "server".parse().unwrap());
        assert_eq!(ActorName::from_raw(a.as_raw()), a);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(s in "[0-9A-Za-z_]{0,10}") {
            let name = ActorName::new(&s).unwrap();
            prop_assert_eq!(name.as_string(), s);
        }
    }
}
