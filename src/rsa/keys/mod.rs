pub mod key_codec;
pub mod key_pair;

pub use key_codec::*;
pub use key_pair::*;

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::io;
use num_bigint::BigInt;
use num_traits::Zero;

/// One key half: the shared modulus `m` and the exponent `base` applied
/// under it. Public and private halves are structurally identical.
#[derive(Debug, Clone)]
pub struct Key {
    pub base: BigInt,
    pub m: BigInt,
}

impl Default for Key {
    fn default() -> Self {
        Self { base: BigInt::zero(), m: BigInt::zero() }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.m == other.m && self.base == other.base
    }
}

#[derive(Debug, PartialEq)]
pub struct KeySet {
    pub public: Key,
    pub private: Key,
}

pub enum KeyError {
    ParseError(String),
    FormatError(usize),
    Io(io::Error),
    NotLoaded,
}

impl KeyError {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyError::ParseError(token) => write!(f, "Key token is not a number: {:?}", token),
            KeyError::FormatError(count) => write!(f, "Expected 2 key tokens, got {}", count),
            KeyError::Io(e) => write!(f, "Key file error: {}", e),
            KeyError::NotLoaded => write!(f, "Key not loaded"),
        }
    }
}

impl Display for KeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Debug for KeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Error for KeyError {}

impl From<io::Error> for KeyError {
    fn from(e: io::Error) -> Self {
        KeyError::Io(e)
    }
}
