use lazy_static::lazy_static;
use mut_static::MutStatic;
use num_cpus;
use crate::RSA;

lazy_static! {
    pub static ref CONFIG_DEF: RSA = RSA {
        mode: String::from("generate"),
        key: String::from("key"),
        input: String::from("stdin"),
        output: String::from("stdout"),
        bits: 256,
        rounds: 10,
        time_max: 1000,
        e_retries: 100,
        silent: false,
        threads: num_cpus::get(),
        retry: true,
    };
    pub static ref SILENT: MutStatic<bool> = MutStatic::new();
}

/// Global silent flag, false until `main` sets it.
pub fn is_silent() -> bool {
    SILENT.read().map(|s| *s).unwrap_or(false)
}
