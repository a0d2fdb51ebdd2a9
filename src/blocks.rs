// Byte-sequence helpers shared by the oracle service and the driver.
use crate::{Error, Result};

pub fn concatenate(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

pub fn slice_into_blocks(bytes: &[u8], block_len: usize) -> Result<Vec<&[u8]>> {
    if block_len == 0 || bytes.len() % block_len != 0 {
        return Err(Error::Misaligned {
            len: bytes.len(),
            block_len,
        });
    }
    Ok(bytes.chunks(block_len).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn concatenate_joins_in_order() {
        assert_eq!(concatenate(b"YELLOW ", b"SUBMARINE"), b"YELLOW SUBMARINE");
    }

    #[test]
    fn slice_into_blocks_returns_equal_sized_blocks() {
        let bytes: Vec<u8> = (0..48).collect();

        let blocks = slice_into_blocks(&bytes, 16).unwrap();

        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.len() == 16));
        assert_eq!(blocks[2][0], 32);
    }

    #[rstest]
    #[case(17, 16)]
    #[case(15, 16)]
    #[case(16, 0)]
    fn slice_into_blocks_returns_err_given_misaligned_input(
        #[case] len: usize,
        #[case] block_len: usize,
    ) {
        let bytes = vec![0u8; len];

        let blocks = slice_into_blocks(&bytes, block_len);

        assert!(matches!(blocks, Err(Error::Misaligned { .. })));
    }
}
