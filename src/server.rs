// The service under attack. It holds the key, encrypts messages for the
// attacker to look at, and answers padding queries, optionally slowly.
use crate::{
    blocks::concatenate,
    cbc::{self, BLOCK_SIZE},
    padding, PaddingMode, PaddingOracle, Result,
};

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use std::time::Duration;

pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill(&mut bytes[..]);
    bytes
}

pub fn random_bytes_with_seed<const N: usize>(seed: u64) -> [u8; N] {
    let mut bytes = [0u8; N];
    StdRng::seed_from_u64(seed).fill(&mut bytes[..]);
    bytes
}

#[derive(Debug, Clone)]
pub struct OracleServer {
    key: [u8; 16],
    padding_mode: PaddingMode,
    delay: Duration,
}

impl OracleServer {
    pub fn new(key: [u8; 16], padding_mode: PaddingMode) -> Self {
        Self {
            key,
            padding_mode,
            delay: Duration::ZERO,
        }
    }

    pub fn with_random_key(padding_mode: PaddingMode) -> Self {
        Self::new(random_bytes::<16>(), padding_mode)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    /// Pads and encrypts `plaintext` under a fresh random IV. The IV is
    /// returned as the first block of the ciphertext.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_with_iv(plaintext, &random_bytes::<BLOCK_SIZE>())
    }

    pub fn encrypt_with_iv(&self, plaintext: &[u8], iv: &[u8; BLOCK_SIZE]) -> Result<Vec<u8>> {
        let padded = padding::pad(plaintext, BLOCK_SIZE, self.padding_mode)?;
        let ciphertext = cbc::encrypt(&padded, &self.key, iv)?;
        Ok(concatenate(iv, &ciphertext))
    }

    /// Decrypts an `IV || ciphertext` message and strips its padding.
    pub fn decrypt(&self, message: &[u8]) -> Result<Vec<u8>> {
        let (iv, ciphertext) = split_iv(message)?;
        let plaintext = cbc::decrypt(ciphertext, &self.key, &iv)?;
        Ok(padding::unpad(&plaintext, BLOCK_SIZE, self.padding_mode)?.to_vec())
    }
}

impl PaddingOracle for OracleServer {
    fn padding_mode(&self) -> PaddingMode {
        self.padding_mode
    }

    fn is_padding_correct(&self, candidate: &[u8]) -> bool {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if candidate.len() < 2 * BLOCK_SIZE {
            debug!("rejecting {} byte candidate", candidate.len());
            return false;
        }
        let (iv, ciphertext) = match split_iv(candidate) {
            Ok(parts) => parts,
            Err(_) => return false,
        };
        match cbc::decrypt(ciphertext, &self.key, &iv) {
            Ok(plaintext) => padding::is_padding_valid(&plaintext, BLOCK_SIZE, self.padding_mode),
            Err(e) => {
                debug!("rejecting candidate: {e}");
                false
            }
        }
    }
}

fn split_iv(message: &[u8]) -> Result<([u8; BLOCK_SIZE], &[u8])> {
    if message.len() < BLOCK_SIZE {
        return Err(crate::Error::Misaligned {
            len: message.len(),
            block_len: BLOCK_SIZE,
        });
    }
    let (iv, ciphertext) = message.split_at(BLOCK_SIZE);
    let mut iv_block = [0u8; BLOCK_SIZE];
    iv_block.copy_from_slice(iv);
    Ok((iv_block, ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use std::time::Instant;

    #[test]
    fn random_bytes_generates_different_bytes() {
        assert_ne!(random_bytes::<16>(), random_bytes::<16>());
    }

    #[test]
    fn random_bytes_with_seed_is_reproducible() {
        assert_eq!(
            random_bytes_with_seed::<16>(101),
            random_bytes_with_seed::<16>(101)
        );
    }

    #[test]
    fn encrypt_prepends_iv_and_pads_to_block_size() {
        let server = OracleServer::new(random_bytes_with_seed::<16>(101), PaddingMode::Pkcs7);
        let iv = [7u8; 16];

        let ciphertext = server.encrypt_with_iv(b"HELLO WORLD!!!!", &iv).unwrap();

        assert_eq!(ciphertext.len(), 32);
        assert_eq!(&ciphertext[..16], &iv);
    }

    #[rstest]
    #[case(PaddingMode::Pkcs7)]
    #[case(PaddingMode::AnsiX923)]
    #[case(PaddingMode::Iso10126)]
    fn decrypt_then_encrypt_returns_original_plaintext(#[case] mode: PaddingMode) {
        let server = OracleServer::with_random_key(mode);
        let plaintext = b"I'm back and I'm ringin' the bell";

        let ciphertext = server.encrypt(plaintext).unwrap();

        assert_eq!(server.decrypt(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn genuine_ciphertext_has_correct_padding() {
        let server = OracleServer::with_random_key(PaddingMode::Pkcs7);

        let ciphertext = server.encrypt(b"Play that funky music").unwrap();

        assert!(server.is_padding_correct(&ciphertext));
    }

    #[test]
    fn tampered_final_byte_breaks_padding() {
        let server = OracleServer::new(random_bytes_with_seed::<16>(7), PaddingMode::Pkcs7);
        let mut ciphertext = server
            .encrypt_with_iv(b"YELLOW SUBMARINE", &[0u8; 16])
            .unwrap();
        // The final block is a full block of 0x10 padding. Flipping the last
        // byte of the previous block turns its last byte into 0x11.
        let idx = ciphertext.len() - 17;
        ciphertext[idx] ^= 0x01;

        assert!(!server.is_padding_correct(&ciphertext));
    }

    #[rstest]
    #[case(0)]
    #[case(16)]
    #[case(31)]
    #[case(33)]
    fn candidate_with_bad_length_is_rejected(#[case] len: usize) {
        let server = OracleServer::with_random_key(PaddingMode::Pkcs7);

        assert!(!server.is_padding_correct(&vec![0u8; len]));
    }

    #[test]
    fn delay_is_kept() {
        let server = OracleServer::with_random_key(PaddingMode::Pkcs7)
            .with_delay(Duration::from_millis(3));

        assert_eq!(server.delay(), Duration::from_millis(3));
    }

    #[test]
    fn padding_check_waits_for_delay() {
        let server = OracleServer::with_random_key(PaddingMode::Pkcs7)
            .with_delay(Duration::from_millis(20));

        let start = Instant::now();
        server.is_padding_correct(&[0u8; 32]);

        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn padding_check_without_delay_does_not_sleep() {
        let server = OracleServer::with_random_key(PaddingMode::Pkcs7);

        let start = Instant::now();
        server.is_padding_correct(&[0u8; 32]);

        assert!(start.elapsed() < Duration::from_millis(20));
    }
}
