use std::fs;
use crate::rsa::keys::{deserialize_key, serialize_key, Key, KeyError, KeySet};

/// A keypair bound to a file path pair: private half at `path`, public
/// half at `path.pub`.
#[derive(Debug, PartialEq)]
pub struct KeyPair {
    pub public: Key,
    pub private: Key,
}

impl From<KeySet> for KeyPair {
    fn from(keys: KeySet) -> Self {
        Self { public: keys.public, private: keys.private }
    }
}

impl KeyPair {
    pub fn save(&self, path: &str) -> Result<(), KeyError> {
        write_key(&(path.to_string() + ".pub"), &self.public)?;
        write_key(path, &self.private)
    }

    pub fn load(path: &str) -> Result<Self, KeyError> {
        Ok(Self {
            public: read_key(&(path.to_string() + ".pub"))?,
            private: read_key(path)?,
        })
    }
}

pub fn read_key(path: &str) -> Result<Key, KeyError> {
    deserialize_key(&fs::read_to_string(path)?)
}

pub fn write_key(path: &str, key: &Key) -> Result<(), KeyError> {
    Ok(fs::write(path, serialize_key(key))?)
}

#[cfg(test)]
mod tests {
    use std::env;
    use num_bigint::ToBigInt;
    use crate::rsa::keys::{Key, KeyError};
    use super::*;

    #[test]
    fn save_load_round_trip() -> Result<(), KeyError> {
        let pair = KeyPair {
            public: Key { m: 3233.to_bigint().unwrap(), base: 17.to_bigint().unwrap() },
            private: Key { m: 3233.to_bigint().unwrap(), base: 413.to_bigint().unwrap() },
        };
        let path = env::temp_dir().join("rsa-text-pair-test");
        let path = path.to_str().unwrap();
        pair.save(path)?;
        assert_eq!(KeyPair::load(path)?, pair);
        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let r = read_key("/nonexistent/rsa-text-key");
        assert!(matches!(r, Err(KeyError::Io(_))));
    }
}
