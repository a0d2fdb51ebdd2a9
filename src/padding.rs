// Block padding schemes.
//
// The oracle service pads and validates with any of the schemes below. The
// attack only needs to know which byte value a valid pad carries at a given
// position, which is what `PaddingValueProvider` answers. Schemes whose pad
// bytes are not a function of (position, length) cannot be attacked this way.
use crate::{Error, Result};

use rand::RngCore;

use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaddingMode {
    None,
    Pkcs7,
    Zeros,
    AnsiX923,
    Iso10126,
}

impl fmt::Display for PaddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaddingMode::None => "None",
            PaddingMode::Pkcs7 => "PKCS7",
            PaddingMode::Zeros => "Zeros",
            PaddingMode::AnsiX923 => "ANSIX923",
            PaddingMode::Iso10126 => "ISO10126",
        };
        f.write_str(name)
    }
}

impl FromStr for PaddingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalised: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalised.as_str() {
            "none" => Ok(PaddingMode::None),
            "pkcs7" => Ok(PaddingMode::Pkcs7),
            "zeros" => Ok(PaddingMode::Zeros),
            "ansix923" => Ok(PaddingMode::AnsiX923),
            "iso10126" => Ok(PaddingMode::Iso10126),
            _ => Err(Error::UnknownPaddingMode(s.to_string())),
        }
    }
}

/// Computes the byte a valid pad of `padding_length` bytes carries at
/// `position` of a block of `block_length` bytes.
pub type PaddingValueFn = fn(usize, usize, usize) -> u8;

#[derive(Debug, Clone, Copy)]
pub struct PaddingValueProvider {
    mode: PaddingMode,
    value: PaddingValueFn,
}

impl PaddingValueProvider {
    pub fn for_mode(mode: PaddingMode) -> Result<Self> {
        let value: PaddingValueFn = match mode {
            PaddingMode::Pkcs7 => pkcs7_padding_value,
            PaddingMode::AnsiX923 => ansi_x923_padding_value,
            PaddingMode::None | PaddingMode::Zeros | PaddingMode::Iso10126 => {
                return Err(Error::Configuration(mode))
            }
        };
        Ok(Self { mode, value })
    }

    pub fn mode(&self) -> PaddingMode {
        self.mode
    }

    pub fn expected_padding_byte(
        &self,
        position: usize,
        padding_length: usize,
        block_length: usize,
    ) -> u8 {
        (self.value)(position, padding_length, block_length)
    }
}

// Every pad byte equals the pad length.
fn pkcs7_padding_value(_position: usize, padding_length: usize, _block_length: usize) -> u8 {
    padding_length as u8
}

// Zeros, then the pad length in the final byte.
fn ansi_x923_padding_value(position: usize, padding_length: usize, block_length: usize) -> u8 {
    if position + 1 == block_length {
        padding_length as u8
    } else {
        0
    }
}

pub fn pad(bytes: &[u8], block_len: usize, mode: PaddingMode) -> Result<Vec<u8>> {
    if block_len == 0 || block_len > u8::MAX as usize {
        return Err(Error::Misaligned {
            len: bytes.len(),
            block_len,
        });
    }
    let remainder = bytes.len() % block_len;
    let n_pad = block_len - remainder;

    let mut out = Vec::with_capacity(bytes.len() + n_pad);
    out.extend_from_slice(bytes);
    match mode {
        PaddingMode::None => {
            if remainder != 0 {
                return Err(Error::Misaligned {
                    len: bytes.len(),
                    block_len,
                });
            }
        }
        PaddingMode::Zeros => {
            if remainder != 0 {
                out.resize(bytes.len() + n_pad, 0);
            }
        }
        PaddingMode::Pkcs7 => out.resize(bytes.len() + n_pad, n_pad as u8),
        PaddingMode::AnsiX923 => {
            out.resize(bytes.len() + n_pad - 1, 0);
            out.push(n_pad as u8);
        }
        PaddingMode::Iso10126 => {
            let mut filler = vec![0u8; n_pad - 1];
            rand::thread_rng().fill_bytes(&mut filler);
            out.extend_from_slice(&filler);
            out.push(n_pad as u8);
        }
    }
    Ok(out)
}

pub fn unpad(bytes: &[u8], block_len: usize, mode: PaddingMode) -> Result<&[u8]> {
    match mode {
        PaddingMode::None | PaddingMode::Zeros => Ok(bytes),
        _ => match padding_len(bytes, block_len, mode) {
            Some(n_pad) => Ok(&bytes[..bytes.len() - n_pad]),
            None => Err(Error::InvalidPadding(mode)),
        },
    }
}

pub fn is_padding_valid(bytes: &[u8], block_len: usize, mode: PaddingMode) -> bool {
    unpad(bytes, block_len, mode).is_ok()
}

fn padding_len(bytes: &[u8], block_len: usize, mode: PaddingMode) -> Option<usize> {
    let n_pad = *bytes.last()? as usize;
    if n_pad == 0 || n_pad > block_len || n_pad > bytes.len() {
        return None;
    }
    let (padded, last) = bytes[(bytes.len() - n_pad)..].split_at(n_pad - 1);
    let valid = match mode {
        PaddingMode::Pkcs7 => padded.iter().all(|&b| b == last[0]),
        PaddingMode::AnsiX923 => padded.iter().all(|&b| b == 0),
        _ => true,
    };
    valid.then_some(n_pad)
}
