use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use crate::serializer::{Reader, ReaderError, Serializer, Writer};

use super::{Hash, HashParseError, HASH_SIZE};

pub const ADDRESS_SIZE: usize = HASH_SIZE;

/// Account identifier, derived elsewhere by hashing.
/// The all-zero value is the distinguished null address and is rejected
/// wherever a real account is required.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    pub const fn null() -> Self {
        Address([0; ADDRESS_SIZE])
    }

    pub fn is_null(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn from_hash(hash: Hash) -> Self {
        Address(hash.into_bytes())
    }

    pub const fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<Hash> for Address {
    fn from(hash: Hash) -> Self {
        Address::from_hash(hash)
    }
}

impl FromStr for Address {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_SIZE * 2 {
            return Err(HashParseError::Length {
                expected: ADDRESS_SIZE * 2,
                got: s.len(),
            });
        }
        let mut bytes = [0u8; ADDRESS_SIZE];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| HashParseError::Encoding)?;
        Ok(Address(bytes))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serializer for Address {
    fn write(&self, writer: &mut Writer) {
        writer.write_bytes(&self.0);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Address::new(reader.read_bytes_32()?))
    }

    fn size(&self) -> usize {
        ADDRESS_SIZE
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(SerdeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash;

    #[test]
    fn test_null_address() {
        assert!(Address::null().is_null());
        assert!(!Address::from_hash(hash(b"account")).is_null());
    }

    #[test]
    fn test_hex_roundtrip() {
        let address = Address::from_hash(hash(b"alice"));
        let parsed: Address = address.to_hex().parse().unwrap();
        assert_eq!(address, parsed);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert_eq!(
            "ff".parse::<Address>().unwrap_err(),
            HashParseError::Length {
                expected: ADDRESS_SIZE * 2,
                got: 2
            }
        );
    }
}
