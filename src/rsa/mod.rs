use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::fs::File;
use std::io;
use std::io::{Read, Write};
use clap::Parser;
use num_bigint::{BigInt, RandBigInt, ToBigInt};
use num_traits::One;

pub mod codec;
pub mod config;
pub mod keys;
pub mod math;
pub mod prime_gen;
pub mod session;

use config::*;
use keys::*;
use prime_gen::PrimeError;
use session::Session;

#[derive(Debug, Clone)]
pub enum RunMode {
    Generate,
    Encrypt,
    Decrypt,
    Test,
}

pub enum KeyGenError {
    Prime(PrimeError),
    RetryExhausted(u32),
}

impl KeyGenError {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyGenError::Prime(e) => write!(f, "{}", e),
            KeyGenError::RetryExhausted(tries) => {
                write!(f, "No usable public exponent in {} tries", tries)
            }
        }
    }
}

impl Display for KeyGenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Debug for KeyGenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Error for KeyGenError {}

impl From<PrimeError> for KeyGenError {
    fn from(e: PrimeError) -> Self {
        KeyGenError::Prime(e)
    }
}

#[macro_export]
macro_rules! rsa_opts {
    ($CONFIG: expr, $NAME: ident) => {
#[derive(Debug, Parser)]
pub struct $NAME {
    #[clap(short, long, value_parser, default_value = $CONFIG.mode.as_str(), help = "Run mode: generate, encrypt, decrypt, test")]
    pub mode: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.key.as_str(), help = "Key path, reads/writes `path' and `path.pub'")]
    pub key: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.input.as_str(), help = "Input filename, or `stdin'")]
    pub input: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.output.as_str(), help = "Output filename, or `stdout'")]
    pub output: String,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.bits, help = "Prime size in bits")]
    pub bits: u32,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.rounds, help = "Miller Rabin calculate rounds")]
    pub rounds: u32,
    #[clap(long, value_parser, default_value_t = $CONFIG.time_max, help = "Max time in milliseconds that trying to generate a prime")]
    pub time_max: i64,
    #[clap(long, value_parser, default_value_t = $CONFIG.e_retries, help = "Max public exponent candidates before giving up")]
    pub e_retries: u32,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.silent, help = "Disable log output")]
    pub silent: bool,
    #[clap(long, value_parser, default_value_t = $CONFIG.retry, help = "Retry when failed to generate primes")]
    pub retry: bool,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.threads, help = "Calculate in <THREADS> threads")]
    pub threads: usize,
}
    };
}

rsa_opts!(CONFIG_DEF, RSA);

impl RSA {
    pub fn get(&self) -> &RSA {
        self
    }

    pub fn copy(&self) -> RSA {
        RSA {
            mode: self.mode.clone(),
            key: self.key.clone(),
            input: self.input.clone(),
            output: self.output.clone(),
            bits: self.bits,
            rounds: self.rounds,
            time_max: self.time_max,
            e_retries: self.e_retries,
            silent: self.silent,
            retry: self.retry,
            threads: self.threads,
        }
    }

    pub fn reader(&self) -> io::Result<Box<dyn Read>> {
        Ok(match self.input.as_str() {
            "stdin" => Box::new(io::stdin()),
            f => Box::new(File::open(f)?),
        })
    }

    pub fn writer(&mut self) -> io::Result<Box<dyn Write>> {
        Ok(match self.output.as_str() {
            "stdout" => {
                self.silent = true;
                Box::new(io::stdout())
            }
            f => Box::new(File::create(f)?),
        })
    }

    fn run_mode(&self) -> Result<RunMode, Box<dyn Error>> {
        match self.mode.as_str() {
            "generate" => Ok(RunMode::Generate),
            "encrypt" => Ok(RunMode::Encrypt),
            "decrypt" => Ok(RunMode::Decrypt),
            "test" => Ok(RunMode::Test),
            _ => Err("Unknown run mode! available: generate(default), encrypt, decrypt, test".into()),
        }
    }

    /// Conventional exponent first, then random candidates of `self.bits`
    /// bits until one is coprime with `phi`, up to `self.e_retries` tries.
    fn select_public_exponent(&self, phi: &BigInt) -> Result<BigInt, KeyGenError> {
        let mut rng = rand::thread_rng();
        let mut e = 65537.to_bigint().unwrap();
        for _ in 0..self.e_retries {
            if math::extended_euclid(phi, &e).gcd.is_one() {
                return Ok(e);
            }
            e = rng.gen_biguint(self.bits as u64).to_bigint().unwrap();
        }
        Err(KeyGenError::RetryExhausted(self.e_retries))
    }

    /// Build the keypair from two primes: `n = p * q`,
    /// `d = extended_euclid(phi, e).y mod phi` normalized into `[0, phi)`.
    pub fn derive_key_set(&self, p: &BigInt, q: &BigInt) -> Result<KeySet, KeyGenError> {
        let n = p * q;
        let f = math::euler(p, q);
        let e = self.select_public_exponent(&f)?;
        let d = (math::extended_euclid(&f, &e).y % &f + &f) % &f;
        self.check_key_set(&d, &e, &f);
        Ok(KeySet {
            public: Key { m: n.clone(), base: e },
            private: Key { m: n, base: d },
        })
    }

    pub fn generate_key(&self) -> Result<KeySet, KeyGenError> {
        let (p, q) = (self.generate_prime(self.bits)?, self.generate_prime(self.bits)?);
        self.derive_key_set(&p, &q)
    }

    pub fn check_key_set(&self, d: &BigInt, e: &BigInt, f: &BigInt) {
        let res = (d * e) % f;
        if !self.silent {
            println!("(d * e) % f = {} % {} = {}", d * e, f, res);
        }
        assert!(res.is_one());
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        match self.run_mode()? {
            RunMode::Generate => {
                let key_set = self.generate_key()?;
                if !self.silent {
                    println!("get keys: {:?}", key_set);
                }
                KeyPair::from(key_set).save(&self.key)?;
                if !self.silent {
                    println!("Generated key files: {}, {}", self.key, self.key.clone() + ".pub");
                }
            }
            RunMode::Test => {
                let key_set = self.generate_key()?;
                let session = Session::from_key_set(key_set);
                let message = "Hello World";
                let encrypted = session.encrypt(message)?;
                let decrypted = session.decrypt(&encrypted)?;
                assert_eq!(message, decrypted);
                if !self.silent {
                    println!("{:?} => {} => {:?}", message, encrypted, decrypted);
                    println!("Test pass");
                }
            }
            mode @ (RunMode::Encrypt | RunMode::Decrypt) => {
                let path = match mode {
                    RunMode::Decrypt => self.key.clone(),
                    _ => self.key.clone() + ".pub",
                };
                let key = keys::read_key(&path)?;
                let mut reader = self.reader()?;
                let mut writer = self.writer()?;
                codec::process(&mut reader, &mut writer, mode, key, self.threads, self.silent)?;
                if !self.silent {
                    println!("Done");
                }
            }
        }
        Ok(())
    }
}
