use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::mpsc;
use std::thread;
use chrono::Local;
use lazy_static::lazy_static;
use num_bigint::{BigInt, BigUint, RandBigInt, ToBigInt};
use num_traits::One;
use mut_static::MutStatic;
use crate::rsa::config::is_silent;
use crate::rsa::math::{pow_mod, MathError};
use crate::rsa::prime_gen::PrimeError::Timeout;
use crate::RSA;

pub enum PrimeError {
    Timeout(i64),
    Math(MathError),
}

impl PrimeError {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeout(time) => write!(f, "Generation timeout after {} ms", time),
            PrimeError::Math(e) => write!(f, "Primality test failed: {}", e),
        }
    }
}

impl Display for PrimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Debug for PrimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Error for PrimeError {}

impl From<MathError> for PrimeError {
    fn from(e: MathError) -> Self {
        PrimeError::Math(e)
    }
}

lazy_static! {
    // Surplus primes found by losing worker threads, served to later calls.
    pub static ref PRIMES_CACHE: MutStatic<Vec<BigInt>> = MutStatic::from(Vec::new());
}

impl RSA {
    /// Miller-Rabin probabilistic primality test with `rounds` random
    /// witnesses from `[2, n-1)`.
    pub fn miller_rabin(n: &BigInt, rounds: u32) -> Result<bool, MathError> {
        let two = 2.to_bigint().unwrap();
        if n < &two {
            return Ok(false);
        }
        if *n == two || *n == 3.to_bigint().unwrap() {
            return Ok(true);
        }
        if !n.bit(0) {
            return Ok(false);
        }
        let n_minus_one = n - 1.to_bigint().unwrap();
        let mut d = n_minus_one.clone();
        let mut s = 0u64;
        while !d.bit(0) {
            d >>= 1;
            s += 1;
        }
        let mut rng = rand::thread_rng();
        for _ in 0..rounds {
            let witness = rng.gen_bigint_range(&two, &n_minus_one);
            let mut m = pow_mod(&witness, &d, n)?;
            if m.is_one() || m == n_minus_one {
                continue;
            }
            let mut pass = false;
            for _ in 1..s {
                m = (&m * &m) % n;
                if m == n_minus_one {
                    pass = true;
                    break;
                }
            }
            if !pass {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Draw a probable prime of exactly `bits` bits, racing `self.threads`
    /// workers against the `self.time_max` wall-clock budget.
    pub fn generate_prime(&self, bits: u32) -> Result<BigInt, PrimeError> {
        {
            let mut cache = PRIMES_CACHE.write().unwrap();
            while let Some(prime) = cache.pop() {
                if prime.bits() == bits as u64 {
                    if !is_silent() {
                        println!("Use cached prime: {}", prime);
                    }
                    return Ok(prime);
                }
            }
        }
        let t: usize = self.threads;
        let (tx, rx) = mpsc::channel();
        let handles = (0..t)
            .map(|_| {
                let tx = tx.clone();
                let (rounds, time_max) = (self.rounds, self.time_max);
                thread::spawn(move || {
                    tx.send(RSA::generate_one_prime(bits, rounds, time_max)).unwrap();
                })
            })
            .collect::<Vec<_>>();
        for _ in 0..t {
            if let Ok(prime) = rx.recv().unwrap() {
                PRIMES_CACHE.write().unwrap().push(prime);
            }
        }
        for handle in handles {
            handle.join().unwrap();
        }
        let found = PRIMES_CACHE.write().unwrap().pop();
        match found {
            Some(prime) => Ok(prime),
            None => {
                if self.retry {
                    self.generate_prime(bits)
                } else {
                    Err(Timeout(self.time_max))
                }
            }
        }
    }

    pub fn generate_one_prime(bits: u32, rounds: u32, time_max: i64) -> Result<BigInt, PrimeError> {
        let low = BigUint::one() << (bits - 1);
        let high = BigUint::one() << bits;
        let mut rng = rand::thread_rng();
        let epoch = 0xf;
        let start = Local::now().timestamp_millis();
        let mut try_times = 0;
        loop {
            try_times += epoch;
            for _ in 0..epoch {
                let test = rng.gen_biguint_range(&low, &high).to_bigint().unwrap();
                if RSA::miller_rabin(&test, rounds)? {
                    let time = Local::now().timestamp_millis() - start;
                    if !is_silent() {
                        println!("Done generation in {} tries after {} ms", try_times, time);
                    }
                    return Ok(test);
                }
            }
            let time = Local::now().timestamp_millis() - start;
            if time > time_max {
                if !is_silent() {
                    println!("Failed generation in {} tries after {} ms", try_times, time);
                }
                return Err(Timeout(time));
            }
        }
    }
}
