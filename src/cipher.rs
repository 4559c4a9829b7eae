//! AES block cipher modes used by the callback protocol.
//!
//! - [`CbcCipher`]: AES-256-CBC, IV fixed at construction. The wire format
//!   derives the IV from the first 16 bytes of the key; this is a convention
//!   of the protocol, not a free choice.
//! - [`EcbCipher`]: AES-256-ECB, block-independent. Used only by the refund
//!   notification channel.
//!
//! Neither mode applies padding. Callers align input with the 32-byte codec
//! in [`crate::pkcs7`] before encrypting and strip it after decrypting.

use aes::cipher::{
    block_padding::NoPadding, generic_array::GenericArray, BlockDecrypt, BlockDecryptMut,
    BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit,
};
use aes::Aes256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{CallbackError, Result};

/// AES block size in bytes. Distinct from the 32-byte padding block.
pub const AES_BLOCK_SIZE: usize = 16;

/// AES-256 key length in bytes.
pub const KEY_SIZE: usize = 32;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Uniform encrypt/decrypt over block-aligned byte strings.
///
/// Input length must be a multiple of [`AES_BLOCK_SIZE`]; both methods fail
/// with [`CallbackError::Misaligned`] otherwise.
pub trait Cipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

fn check_aligned(data: &[u8]) -> Result<()> {
    if data.len() % AES_BLOCK_SIZE != 0 {
        return Err(CallbackError::Misaligned(data.len()));
    }
    Ok(())
}

fn key_array(key: &[u8]) -> Result<[u8; KEY_SIZE]> {
    key.try_into()
        .map_err(|_| CallbackError::InvalidKey(key.len()))
}

/// AES-256-CBC. Each block's ciphertext depends on the previous block.
///
/// Key material is zeroized when the cipher is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CbcCipher {
    key: [u8; KEY_SIZE],
    iv: [u8; AES_BLOCK_SIZE],
}

impl CbcCipher {
    /// Create a CBC cipher with the protocol IV (first 16 bytes of the key).
    pub fn new(key: &[u8]) -> Result<Self> {
        let key = key_array(key)?;
        let mut iv = [0u8; AES_BLOCK_SIZE];
        iv.copy_from_slice(&key[..AES_BLOCK_SIZE]);
        Ok(Self { key, iv })
    }

    /// Create a CBC cipher with an explicit 16-byte IV.
    pub fn with_iv(key: &[u8], iv: &[u8]) -> Result<Self> {
        let key = key_array(key)?;
        let iv: [u8; AES_BLOCK_SIZE] = iv
            .try_into()
            .map_err(|_| CallbackError::InvalidKey(iv.len()))?;
        Ok(Self { key, iv })
    }
}

impl Cipher for CbcCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        check_aligned(plaintext)?;
        let enc = Aes256CbcEnc::new(&self.key.into(), &self.iv.into());
        Ok(enc.encrypt_padded_vec_mut::<NoPadding>(plaintext))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        check_aligned(ciphertext)?;
        let dec = Aes256CbcDec::new(&self.key.into(), &self.iv.into());
        dec.decrypt_padded_vec_mut::<NoPadding>(ciphertext)
            .map_err(|_| CallbackError::Misaligned(ciphertext.len()))
    }
}

/// AES-256-ECB. Blocks are encrypted independently.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EcbCipher {
    key: [u8; KEY_SIZE],
}

impl EcbCipher {
    pub fn new(key: &[u8]) -> Result<Self> {
        Ok(Self {
            key: key_array(key)?,
        })
    }
}

impl Cipher for EcbCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        check_aligned(plaintext)?;
        let aes = Aes256::new(&self.key.into());
        let mut out = Vec::with_capacity(plaintext.len());
        for chunk in plaintext.chunks(AES_BLOCK_SIZE) {
            let mut block = GenericArray::clone_from_slice(chunk);
            aes.encrypt_block(&mut block);
            out.extend_from_slice(&block);
        }
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        check_aligned(ciphertext)?;
        let aes = Aes256::new(&self.key.into());
        let mut out = Vec::with_capacity(ciphertext.len());
        for chunk in ciphertext.chunks(AES_BLOCK_SIZE) {
            let mut block = GenericArray::clone_from_slice(chunk);
            aes.decrypt_block(&mut block);
            out.extend_from_slice(&block);
        }
        Ok(out)
    }
}
