pub mod attack;
pub mod blocks;
pub mod cbc;
mod decryptor;
mod error;
pub mod http;
mod oracle;
pub mod padding;
pub mod server;

pub use attack::{decrypt_ciphertext, describe_block, AttackReport, Strategy};
pub use decryptor::BlockDecryptor;
pub use error::{Error, Result};
pub use http::{spawn_server, HttpOracle};
pub use oracle::{CountingOracle, PaddingOracle};
pub use padding::{PaddingMode, PaddingValueProvider};
pub use server::{random_bytes, random_bytes_with_seed, OracleServer};
