mod rsa;

pub use crate::rsa::*;
pub use crate::rsa::config::SILENT;

use std::error::Error;
use clap::Parser;

fn main() -> Result<(), Box<dyn Error>> {
    let mut rsa = RSA::parse();
    if rsa.output == "stdout" && (rsa.mode == "encrypt" || rsa.mode == "decrypt") {
        rsa.silent = true;
    }
    if !SILENT.is_set().unwrap() {
        SILENT.set(rsa.silent).unwrap();
    }
    if !rsa.silent {
        println!("Run args: {:?}", rsa);
    }
    rsa.run()?;
    Ok(())
}
