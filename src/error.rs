use crate::PaddingMode;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The oracle declared a padding scheme the attack cannot model.
    #[error("unsupported padding mode: {0}")]
    Configuration(PaddingMode),
    /// No candidate byte produced valid padding. This is also what an oracle
    /// whose real padding differs from the one it declares looks like.
    #[error("decryption not possible: no candidate accepted at byte {position}")]
    DecryptionImpossible { position: usize },
    #[error("block lengths must match and be within 1..=255 (block {block}, previous {previous})")]
    BlockLength { block: usize, previous: usize },
    #[error("{len} bytes cannot be sliced into blocks of {block_len}")]
    Misaligned { len: usize, block_len: usize },
    #[error("invalid {0} padding")]
    InvalidPadding(PaddingMode),
    #[error("unknown padding mode '{0}'")]
    UnknownPaddingMode(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
