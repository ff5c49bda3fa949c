use num_bigint::BigInt;
use crate::rsa::keys::{Key, KeyError};

/// Textual key form: `(modulus,exponent)` with plain decimal integers and
/// no whitespace. Public and private halves use the same format.
pub fn serialize_key(key: &Key) -> String {
    format!("({},{})", key.m, key.base)
}

/// Inverse of [`serialize_key`]: parentheses are stripped wherever they
/// appear, the rest splits on the comma into exactly two decimal tokens.
pub fn deserialize_key(text: &str) -> Result<Key, KeyError> {
    let stripped: String = text.chars().filter(|c| *c != '(' && *c != ')').collect();
    let tokens = stripped.trim().split(',').collect::<Vec<_>>();
    if tokens.len() != 2 {
        return Err(KeyError::FormatError(tokens.len()));
    }
    let parse = |token: &str| {
        token
            .trim()
            .parse::<BigInt>()
            .map_err(|_| KeyError::ParseError(token.to_string()))
    };
    Ok(Key { m: parse(tokens[0])?, base: parse(tokens[1])? })
}

#[cfg(test)]
mod tests {
    use num_bigint::ToBigInt;
    use crate::rsa::keys::Key;
    use super::*;

    fn key(m: i64, base: i64) -> Key {
        Key { m: m.to_bigint().unwrap(), base: base.to_bigint().unwrap() }
    }

    #[test]
    fn serialize_format() {
        assert_eq!(serialize_key(&key(3233, 17)), "(3233,17)");
    }

    #[test]
    fn round_trip() {
        for (m, base) in [(3233, 17), (3233, 413), (1, 0), (0, 0)] {
            let k = key(m, base);
            assert_eq!(deserialize_key(&serialize_key(&k)).unwrap(), k);
        }
    }

    #[test]
    fn tolerates_trailing_newline() {
        assert_eq!(deserialize_key("(3233,17)\n").unwrap(), key(3233, 17));
    }

    #[test]
    fn rejects_wrong_token_count() {
        assert!(matches!(deserialize_key("(3233)"), Err(KeyError::FormatError(1))));
        assert!(matches!(deserialize_key("(1,2,3)"), Err(KeyError::FormatError(3))));
    }

    #[test]
    fn rejects_non_numeric_token() {
        assert!(matches!(deserialize_key("(3233,abc)"), Err(KeyError::ParseError(_))));
        assert!(matches!(deserialize_key("(,17)"), Err(KeyError::ParseError(_))));
    }
}
