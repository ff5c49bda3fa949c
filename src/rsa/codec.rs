use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::io::{Read, Write};
use std::thread;
use crossbeam_channel::{bounded, Receiver, Sender};
use indicatif::{ProgressBar, ProgressStyle};
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use crate::rsa::keys::{Key, KeyError};
use crate::rsa::math::{pow_mod, MathError};
use crate::RunMode;

pub enum CodecError {
    EmptyToken,
    BadToken(String),
    CharRange(BigInt),
    Math(MathError),
    Key(KeyError),
}

impl CodecError {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::EmptyToken => write!(f, "Empty ciphertext token"),
            CodecError::BadToken(token) => write!(f, "Ciphertext token is not a number: {:?}", token),
            CodecError::CharRange(value) => write!(f, "Decrypted value {} is not a character code", value),
            CodecError::Math(e) => write!(f, "{}", e),
            CodecError::Key(e) => write!(f, "{}", e),
        }
    }
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Debug for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Error for CodecError {}

impl From<MathError> for CodecError {
    fn from(e: MathError) -> Self {
        CodecError::Math(e)
    }
}

impl From<KeyError> for CodecError {
    fn from(e: KeyError) -> Self {
        CodecError::Key(e)
    }
}

/// Per-character textbook RSA: each code point becomes
/// `pow_mod(code, key.base, key.m)`, rendered in decimal and joined with
/// commas. Identical characters always map to identical values.
pub fn encrypt_message(message: &str, key: &Key) -> Result<String, CodecError> {
    let mut out = Vec::with_capacity(message.len());
    for c in message.chars() {
        let value = pow_mod(&BigInt::from(c as u32), &key.base, &key.m)?;
        out.push(value.to_string());
    }
    Ok(out.join(","))
}

pub fn decrypt_message(ciphertext: &str, key: &Key) -> Result<String, CodecError> {
    let mut out = String::new();
    for value in parse_ciphertext(ciphertext)? {
        let code = pow_mod(&value, &key.base, &key.m)?;
        out.push(to_char(&code)?);
    }
    Ok(out)
}

/// An empty ciphertext decodes to zero units; anything else splits on
/// commas into decimal tokens, and an empty token is an error rather
/// than a skip.
pub fn parse_ciphertext(text: &str) -> Result<Vec<BigInt>, CodecError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(|token| {
            if token.is_empty() {
                return Err(CodecError::EmptyToken);
            }
            token.parse::<BigInt>().map_err(|_| CodecError::BadToken(token.to_string()))
        })
        .collect()
}

fn to_char(code: &BigInt) -> Result<char, CodecError> {
    code.to_u32()
        .and_then(char::from_u32)
        .ok_or_else(|| CodecError::CharRange(code.clone()))
}

/// Stream the per-unit `pow_mod` work across a map/reduce worker pool,
/// restoring unit order by index before writing. Output is identical to
/// the sequential functions above.
pub fn process(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    mode: RunMode,
    key: Key,
    threads: usize,
    silent: bool,
) -> Result<(), Box<dyn Error>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let units: Vec<BigInt> = match mode {
        RunMode::Encrypt => text.chars().map(|c| BigInt::from(c as u32)).collect(),
        _ => parse_ciphertext(text.trim_end())?,
    };
    if units.is_empty() {
        writer.flush()?;
        return Ok(());
    }
    if key.m.sign() != Sign::Plus {
        return Err(Box::new(CodecError::Math(MathError::NonPositiveModulus)));
    }
    let chunks = units.len();
    if !silent {
        println!("source units: {}", chunks);
    }
    let (map_tx, map_rx): (Sender<(usize, BigInt)>, Receiver<(usize, BigInt)>) = bounded(threads);
    let (reduce_tx, reduce_rx) = bounded(threads);
    let pb = match silent {
        true => None,
        false => Some(ProgressBar::new(chunks as u64)),
    };
    if let Some(pb) = &pb {
        pb.set_style(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"));
    }
    let handles = (0..threads)
        .map(|_| {
            let r = map_rx.clone();
            let s = reduce_tx.clone();
            let key = key.clone();
            thread::spawn(move || loop {
                match r.recv() {
                    Ok((index, unit)) => {
                        let res = pow_mod(&unit, &key.base, &key.m);
                        s.send((index, res)).unwrap();
                    }
                    _ => break,
                }
            })
        })
        .collect::<Vec<_>>();
    drop(reduce_tx);
    let mut res_collect = Vec::with_capacity(chunks);
    for (i, unit) in units.into_iter().enumerate() {
        while let Ok(r) = reduce_rx.try_recv() {
            res_collect.push(r);
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
        map_tx.send((i, unit)).unwrap();
    }
    drop(map_tx);
    while res_collect.len() < chunks {
        let r = reduce_rx.recv().unwrap();
        res_collect.push(r);
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }
    if let Some(pb) = &pb {
        pb.finish_with_message("Done");
    }
    for handle in handles {
        handle.join().unwrap();
    }
    res_collect.sort_by_key(|r| r.0);
    let mut values = Vec::with_capacity(chunks);
    for (_, res) in res_collect {
        values.push(res.map_err(CodecError::Math)?);
    }
    match mode {
        RunMode::Encrypt => {
            let out = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",");
            writer.write_all(out.as_bytes())?;
        }
        _ => {
            let mut out = String::with_capacity(chunks);
            for value in &values {
                out.push(to_char(value)?);
            }
            writer.write_all(out.as_bytes())?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use num_bigint::ToBigInt;
    use crate::rsa::keys::Key;
    use crate::RunMode;
    use super::*;

    // p = 61, q = 53, n = 3233, phi = 3120, e = 17, d = 413
    fn public() -> Key {
        Key { m: 3233.to_bigint().unwrap(), base: 17.to_bigint().unwrap() }
    }

    fn private() -> Key {
        Key { m: 3233.to_bigint().unwrap(), base: 413.to_bigint().unwrap() }
    }

    #[test]
    fn known_character_value() {
        // 'A' = 65, 65^17 mod 3233 = 2790
        assert_eq!(encrypt_message("A", &public()).unwrap(), "2790");
        assert_eq!(decrypt_message("2790", &private()).unwrap(), "A");
    }

    #[test]
    fn round_trip() {
        let message = "Hello World";
        let encrypted = encrypt_message(message, &public()).unwrap();
        assert_eq!(decrypt_message(&encrypted, &private()).unwrap(), message);
    }

    #[test]
    fn round_trip_roles_swapped() {
        let message = "signed";
        let encrypted = encrypt_message(message, &private()).unwrap();
        assert_eq!(decrypt_message(&encrypted, &public()).unwrap(), message);
    }

    #[test]
    fn empty_message() {
        assert_eq!(encrypt_message("", &public()).unwrap(), "");
        assert_eq!(decrypt_message("", &private()).unwrap(), "");
    }

    #[test]
    fn identical_characters_identical_values() {
        let encrypted = encrypt_message("aa", &public()).unwrap();
        let tokens = encrypted.split(',').collect::<Vec<_>>();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], tokens[1]);
        assert_eq!(encrypt_message("a", &public()).unwrap(), tokens[0]);
    }

    #[test]
    fn rejects_empty_token() {
        assert!(matches!(decrypt_message("12,,34", &private()), Err(CodecError::EmptyToken)));
    }

    #[test]
    fn rejects_bad_token() {
        assert!(matches!(decrypt_message("12,x4", &private()), Err(CodecError::BadToken(_))));
    }

    #[test]
    fn rejects_out_of_range_character() {
        // base 1 leaves values unchanged; 0xD800 is a surrogate, not a char
        let identity = Key { m: BigInt::from(3_000_000_000u32), base: 1.to_bigint().unwrap() };
        assert!(matches!(decrypt_message("55296", &identity), Err(CodecError::CharRange(_))));
        assert!(matches!(decrypt_message("2000000000", &identity), Err(CodecError::CharRange(_))));
    }

    #[test]
    fn process_matches_sequential() {
        let message = "The quick brown fox";
        let mut encrypted = Vec::new();
        process(&mut Cursor::new(message), &mut encrypted, RunMode::Encrypt, public(), 4, true).unwrap();
        let encrypted = String::from_utf8(encrypted).unwrap();
        assert_eq!(encrypted, encrypt_message(message, &public()).unwrap());
        let mut decrypted = Vec::new();
        process(&mut Cursor::new(encrypted), &mut decrypted, RunMode::Decrypt, private(), 4, true).unwrap();
        assert_eq!(String::from_utf8(decrypted).unwrap(), message);
    }

    #[test]
    fn process_empty_input() {
        let mut out = Vec::new();
        process(&mut Cursor::new(""), &mut out, RunMode::Encrypt, public(), 2, true).unwrap();
        assert!(out.is_empty());
    }
}
