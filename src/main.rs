use padding_oracle::{
    decrypt_ciphertext, describe_block, spawn_server, HttpOracle, OracleServer, PaddingMode,
    Strategy,
};

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine};
use clap::Parser;

use std::{sync::Arc, time::Duration};

/// Encrypts a line of text with a padding-oracle service and recovers it
/// again using only the oracle's padding verdicts.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Oracle delay in milliseconds for each padding request
    #[arg(short, long, env = "ORACLE_DELAY_MS", default_value_t = 0)]
    delay: u64,

    /// Padding scheme used by the oracle (pkcs7, ansix923, iso10126, zeros, none)
    #[arg(short, long, default_value = "pkcs7")]
    padding: PaddingMode,

    /// Text to encrypt; read from stdin when omitted
    #[arg(long)]
    plaintext: Option<String>,

    /// Query the oracle over HTTP on a loopback port
    #[arg(long)]
    remote: bool,

    /// Decrypt distinct blocks concurrently
    #[arg(long)]
    parallel: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("~~ Padding Oracle Attack Demo ~~");
    let server = OracleServer::with_random_key(args.padding)
        .with_delay(Duration::from_millis(args.delay));
    println!("Oracle response delay set to {} ms.", server.delay().as_millis());

    let plaintext = match args.plaintext {
        Some(p) => p,
        None => {
            println!("\nEnter plaintext:");
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("could not read plaintext")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let ciphertext = server
        .encrypt(plaintext.as_bytes())
        .context("could not encrypt plaintext")?;
    println!("\nCiphertext blocks (base64):");
    for block in ciphertext.chunks(server.block_size()) {
        println!("{}", STANDARD.encode(block));
    }

    let strategy = if args.parallel {
        Strategy::Parallel
    } else {
        Strategy::Sequential
    };
    let block_size = server.block_size();
    let report = if args.remote {
        let runtime = tokio::runtime::Runtime::new()?;
        let addr = runtime.block_on(spawn_server("127.0.0.1:0", Arc::new(server)))?;
        let oracle = HttpOracle::connect(&addr).context("could not reach oracle server")?;
        decrypt_ciphertext(&oracle, &ciphertext, block_size, strategy)
    } else {
        decrypt_ciphertext(&server, &ciphertext, block_size, strategy)
    }
    .context("padding oracle attack failed")?;

    println!("\nPadding oracle attack results:");
    println!("(first block cannot be decrypted)");
    for block in &report.blocks {
        println!("{}", describe_block(block));
    }

    println!("\nDecoded {} blocks.", report.blocks.len());
    if let Some(average) = report.average_per_block() {
        println!(
            "Time elapsed: {:?}, avg {:.3} s per block, {} oracle queries",
            report.elapsed,
            average.as_secs_f64(),
            report.queries
        );
    }
    Ok(())
}
