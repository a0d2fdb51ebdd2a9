// Decrypts a whole `IV || ciphertext` message one block at a time. The first
// block is the IV and is never decrypted.
use crate::{blocks::slice_into_blocks, BlockDecryptor, CountingOracle, PaddingOracle, Result};

use log::{debug, info};
use rayon::prelude::*;

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    Sequential,
    /// Decrypt distinct blocks concurrently. Each block is still recovered
    /// byte by byte.
    Parallel,
}

#[derive(Debug, Clone)]
pub struct AttackReport {
    /// Plaintext of ciphertext blocks `1..n`, padding included.
    pub blocks: Vec<Vec<u8>>,
    pub queries: usize,
    pub elapsed: Duration,
}

impl AttackReport {
    pub fn plaintext(&self) -> Vec<u8> {
        self.blocks.concat()
    }

    pub fn average_per_block(&self) -> Option<Duration> {
        if self.blocks.is_empty() {
            return None;
        }
        Some(self.elapsed / self.blocks.len() as u32)
    }
}

pub fn decrypt_ciphertext<O>(
    oracle: &O,
    ciphertext: &[u8],
    block_len: usize,
    strategy: Strategy,
) -> Result<AttackReport>
where
    O: PaddingOracle + Sync + ?Sized,
{
    let counting = CountingOracle::new(oracle);
    let decryptor = BlockDecryptor::new(&counting)?;
    let blocks = slice_into_blocks(ciphertext, block_len)?;
    let pairs: Vec<(usize, &[u8], &[u8])> = blocks
        .windows(2)
        .enumerate()
        .map(|(i, pair)| (i + 1, pair[1], pair[0]))
        .collect();
    info!(
        "decrypting {} blocks ({:?}, {} padding)",
        pairs.len(),
        strategy,
        decryptor.padding_mode()
    );

    let decrypt = |&(idx, block, previous): &(usize, &[u8], &[u8])| {
        debug!("decrypting block {idx}");
        decryptor.decrypt_block(block, previous)
    };
    let start = Instant::now();
    let decrypted: Result<Vec<Vec<u8>>> = match strategy {
        Strategy::Sequential => pairs.iter().map(decrypt).collect(),
        Strategy::Parallel => pairs.par_iter().map(decrypt).collect(),
    };
    let elapsed = start.elapsed();

    let report = AttackReport {
        blocks: decrypted?,
        queries: counting.queries(),
        elapsed,
    };
    info!(
        "decrypted {} blocks with {} queries in {:?}",
        report.blocks.len(),
        report.queries,
        report.elapsed
    );
    Ok(report)
}

/// Renders a decrypted block for display.
pub fn describe_block(block: &[u8]) -> String {
    if !block.is_empty() && block.iter().all(|&b| b as usize == block.len()) {
        return "(padding-only block)".to_string();
    }
    String::from_utf8_lossy(block)
        .chars()
        .map(|c| if c.is_control() { '.' } else { c })
        .collect()
}
