// AES-128 in CBC mode over block-aligned data. Padding is applied and checked
// by the caller.
//
//                  C_i = E(P_i ⊕ C_{i-1})
//                  P_i = D(C_i) ⊕ C_{i-1}
//
// with C_0 the IV.
use crate::{blocks::slice_into_blocks, Result};

use aes::{
    cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit},
    Aes128, Block,
};

pub const BLOCK_SIZE: usize = 16;

pub fn encrypt(plaintext: &[u8], key: &[u8; 16], iv: &[u8; BLOCK_SIZE]) -> Result<Vec<u8>> {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut ciphertext = Vec::with_capacity(plaintext.len());

    let mut last_block = *iv;
    for plaintext_block in slice_into_blocks(plaintext, BLOCK_SIZE)? {
        let mut block = Block::clone_from_slice(plaintext_block);
        block
            .iter_mut()
            .zip(last_block.iter())
            .for_each(|(b, prev)| *b ^= prev);
        cipher.encrypt_block(&mut block);
        ciphertext.extend_from_slice(&block);
        last_block.copy_from_slice(&block);
    }
    Ok(ciphertext)
}

pub fn decrypt(ciphertext: &[u8], key: &[u8; 16], iv: &[u8; BLOCK_SIZE]) -> Result<Vec<u8>> {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut plaintext = Vec::with_capacity(ciphertext.len());

    let mut last_block: &[u8] = iv;
    for ciphertext_block in slice_into_blocks(ciphertext, BLOCK_SIZE)? {
        let mut block = Block::clone_from_slice(ciphertext_block);
        cipher.decrypt_block(&mut block);
        plaintext.extend(block.iter().zip(last_block).map(|(b, prev)| b ^ prev));
        last_block = ciphertext_block;
    }
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;

    // NIST SP 800-38A, F.2.1 CBC-AES128.Encrypt (first two blocks).
    const KEY: [u8; 16] = [
        0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f,
        0x3c,
    ];
    const IV: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];
    const PLAINTEXT: &str = "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51";
    const CIPHERTEXT: &str = "7649abac8119b246cee98e9b12e9197d5086cb9b507219ee95db113a917678b2";

    #[test]
    fn encrypt_matches_nist_vector() {
        let plaintext = hex::decode(PLAINTEXT).unwrap();

        let ciphertext = encrypt(&plaintext, &KEY, &IV).unwrap();

        assert_eq!(hex::encode(ciphertext), CIPHERTEXT);
    }

    #[test]
    fn decrypt_matches_nist_vector() {
        let ciphertext = hex::decode(CIPHERTEXT).unwrap();

        let plaintext = decrypt(&ciphertext, &KEY, &IV).unwrap();

        assert_eq!(hex::encode(plaintext), PLAINTEXT);
    }

    #[test]
    fn encrypt_returns_err_given_unaligned_plaintext() {
        assert!(encrypt(b"YELLOW", &KEY, &IV).is_err());
    }
}
