use std::{fmt, str};

/// Represents a Universally Unique IDentifier stored as an unsigned 128-bit integer.
///
/// The integer interpretation is the one that matters here: two `Uuid`s compare
/// exactly as their big-endian 128-bit values do, which is what the generator's
/// ordering guarantee is stated in terms of.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Uuid(u128);

const VERSION: u128 = 0b0111;
const VARIANT: u128 = 0b10;

impl Uuid {
    /// Nil UUID (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self(0);

    /// Max UUID (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self(u128::MAX);

    /// Returns the underlying unsigned 128-bit integer.
    pub const fn as_u128(&self) -> u128 {
        self.0
    }

    /// Returns the 16-byte big-endian array representation.
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Assembles a UUIDv7 value from its three variable fields, filling in the
    /// constant version and variant bits.
    ///
    /// # Panics
    ///
    /// Panics if a field exceeds its width (48-bit `unix_ts_ms`, 12-bit `rand_a`,
    /// 62-bit `rand_b`).
    pub const fn from_fields_v7(unix_ts_ms: u64, rand_a: u16, rand_b: u64) -> Self {
        if unix_ts_ms >= 1 << 48 || rand_a >= 1 << 12 || rand_b >= 1 << 62 {
            panic!("invalid field value");
        }

        Self(
            ((unix_ts_ms as u128) << 80)
                | (VERSION << 76)
                | ((rand_a as u128) << 64)
                | (VARIANT << 62)
                | rand_b as u128,
        )
    }

    /// Returns the 48-bit `unix_ts_ms` field: milliseconds since the Unix epoch.
    pub const fn unix_ts_ms(&self) -> u64 {
        (self.0 >> 80) as u64
    }

    /// Returns the 12-bit `rand_a` field carrying the sub-millisecond precision.
    pub const fn rand_a(&self) -> u16 {
        (self.0 >> 64 & 0xfff) as u16
    }

    /// Returns the 62-bit `rand_b` field.
    pub const fn rand_b(&self) -> u64 {
        (self.0 as u64) & ((1 << 62) - 1)
    }

    /// Returns the 4-bit version field (`7` for every value this crate generates).
    pub const fn version(&self) -> u8 {
        (self.0 >> 76 & 0xf) as u8
    }

    /// Returns the 2-bit variant field (`0b10` for every value this crate generates).
    pub const fn variant(&self) -> u8 {
        (self.0 >> 62 & 0b11) as u8
    }
}

impl fmt::Display for Uuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        let bytes = self.0.to_be_bytes();
        let mut buffer = [0u8; 36];
        let mut buffer_iter = buffer.iter_mut();
        for i in 0..16 {
            let e = bytes[i] as usize;
            *buffer_iter.next().unwrap() = DIGITS[e >> 4];
            *buffer_iter.next().unwrap() = DIGITS[e & 15];
            if i == 3 || i == 5 || i == 7 || i == 9 {
                *buffer_iter.next().unwrap() = b'-';
            }
        }
        debug_assert!(buffer.is_ascii());
        f.write_str(unsafe { str::from_utf8_unchecked(&buffer) })
    }
}

impl str::FromStr for Uuid {
    type Err = ParseError;

    /// Creates an object from the 8-4-4-4-12 hexadecimal string representation.
    /// Accepts uppercase and lowercase digits; rejects anything else, including
    /// surrounding whitespace, braces, and missing or misplaced hyphens.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        const ERR: ParseError = ParseError {};
        if src.len() != 36 {
            return Err(ERR);
        }
        let mut value = 0u128;
        for (i, c) in src.chars().enumerate() {
            if i == 8 || i == 13 || i == 18 || i == 23 {
                if c != '-' {
                    return Err(ERR);
                }
            } else {
                let digit = c.to_digit(16).ok_or(ERR)?;
                value = value << 4 | digit as u128;
            }
        }
        Ok(Self(value))
    }
}

impl From<Uuid> for u128 {
    fn from(src: Uuid) -> Self {
        src.0
    }
}

impl From<u128> for Uuid {
    fn from(src: u128) -> Self {
        Self(src)
    }
}

impl From<Uuid> for [u8; 16] {
    fn from(src: Uuid) -> Self {
        src.to_bytes()
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(src: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(src))
    }
}

impl From<Uuid> for String {
    fn from(src: Uuid) -> Self {
        src.to_string()
    }
}

impl TryFrom<String> for Uuid {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        src.parse()
    }
}

/// Error parsing an invalid string representation of UUID.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid string representation")
    }
}

impl std::error::Error for ParseError {}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Uuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Uuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.to_string())
            } else {
                serializer.serialize_bytes(&self.to_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Uuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl<'de> de::Visitor<'de> for VisitorImpl {
        type Value = Uuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a UUID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            <[u8; 16]>::try_from(value)
                .map(Self::Value::from)
                .map_err(de::Error::custom)
        }
    }

}
