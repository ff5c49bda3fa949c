use crate::rsa::codec::{decrypt_message, encrypt_message, CodecError};
use crate::rsa::keys::{read_key, Key, KeyError, KeySet};

/// Holds the key halves for one encrypt/decrypt context. Several
/// sessions with independent keypairs can coexist; an operation whose
/// key half was never loaded fails fast instead of touching defaults.
#[derive(Debug, Default)]
pub struct Session {
    public: Option<Key>,
    private: Option<Key>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_key_set(keys: KeySet) -> Self {
        Self { public: Some(keys.public), private: Some(keys.private) }
    }

    pub fn set_public(&mut self, key: Key) {
        self.public = Some(key);
    }

    pub fn set_private(&mut self, key: Key) {
        self.private = Some(key);
    }

    pub fn load_public(&mut self, path: &str) -> Result<(), KeyError> {
        self.public = Some(read_key(path)?);
        Ok(())
    }

    pub fn load_private(&mut self, path: &str) -> Result<(), KeyError> {
        self.private = Some(read_key(path)?);
        Ok(())
    }

    pub fn encrypt(&self, message: &str) -> Result<String, CodecError> {
        let key = self.public.as_ref().ok_or(CodecError::Key(KeyError::NotLoaded))?;
        encrypt_message(message, key)
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CodecError> {
        let key = self.private.as_ref().ok_or(CodecError::Key(KeyError::NotLoaded))?;
        decrypt_message(ciphertext, key)
    }
}
