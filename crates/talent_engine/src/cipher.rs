//! Password encryption mandated by the login endpoint.
//!
//! AES in ECB mode with PKCS#7 padding, keyed by the raw UTF-8 bytes of the
//! server-supplied key string, hex encoded. The key length selects AES-128,
//! AES-192 or AES-256.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockCipher, BlockEncryptMut, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use thiserror::Error;

use crate::HarvestError;

/// Indicator value the login metadata uses for SM4.
const SM4_INDICATOR: &str = "3";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("encryption key is empty")]
    EmptyKey,
    #[error("encryption key must be 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),
}

/// Encrypts `plaintext` under `key` and returns lowercase hex ciphertext.
pub fn encrypt_credential(plaintext: &str, key: &str) -> Result<String, CipherError> {
    if key.is_empty() {
        return Err(CipherError::EmptyKey);
    }
    let key = key.as_bytes();
    let data = plaintext.as_bytes();
    let ciphertext = match key.len() {
        16 => encrypt_with::<Aes128>(key, data),
        24 => encrypt_with::<Aes192>(key, data),
        32 => encrypt_with::<Aes256>(key, data),
        other => return Err(CipherError::InvalidKeyLength(other)),
    }?;
    Ok(hex::encode(ciphertext))
}

fn encrypt_with<C>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CipherError>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let encryptor = ecb::Encryptor::<C>::new_from_slice(key)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
    Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(data))
}

/// Rejects cipher families this client cannot produce.
///
/// Only the SM4 indicator is known to be incompatible; every other value
/// (including none) means AES.
pub fn ensure_supported_cipher(indicator: Option<&str>) -> Result<(), HarvestError> {
    match indicator.map(str::trim) {
        Some(SM4_INDICATOR) => Err(HarvestError::UnsupportedCipher {
            indicator: SM4_INDICATOR.to_string(),
        }),
        _ => Ok(()),
    }
}
