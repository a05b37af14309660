use std::io::Read;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use super::keys::KEY_LENGTH;
use super::CryptoError;

pub const IV_LENGTH: usize = 12;
/// AES-GCM appends a 16-byte authentication tag to every ciphertext.
pub const TAG_LENGTH: usize = 16;

/// Encrypted payload: IV + ciphertext (ciphertext includes the GCM tag).
///
/// Wire format is `[1-byte IV length][IV bytes][ciphertext ‖ tag]` — the
/// length prefix travels with the data so a reader never has to assume the
/// IV size.
#[derive(Debug, Clone)]
pub struct EncryptedData {
    pub iv: [u8; IV_LENGTH],
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Encrypt plaintext using AES-256-GCM with a fresh random IV.
    pub(crate) fn encrypt(
        key_bytes: &[u8; KEY_LENGTH],
        plaintext: &[u8],
    ) -> Result<Self, CryptoError> {
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        let cipher = Aes256Gcm::new(key);

        let mut iv = [0u8; IV_LENGTH];
        OsRng.fill_bytes(&mut iv);
        let nonce = Nonce::from_slice(&iv);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        Ok(Self { iv, ciphertext })
    }

    /// Decrypt and authenticate. Any tampering fails the GCM tag check.
    pub(crate) fn decrypt(&self, key_bytes: &[u8; KEY_LENGTH]) -> Result<Vec<u8>, CryptoError> {
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        let cipher = Aes256Gcm::new(key);
        let nonce = Nonce::from_slice(&self.iv);

        cipher
            .decrypt(nonce, self.ciphertext.as_ref())
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    /// Serialize to bytes: `[1-byte IV length][IV][ciphertext ‖ tag]`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + IV_LENGTH + self.ciphertext.len());
        bytes.push(IV_LENGTH as u8);
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Deserialize from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        Self::read_from(&mut std::io::Cursor::new(bytes))
    }

    /// Read from a stream. Uses `read_exact` throughout: short reads never
    /// produce a truncated IV.
    pub fn read_from(reader: &mut impl Read) -> Result<Self, CryptoError> {
        let mut len_byte = [0u8; 1];
        reader
            .read_exact(&mut len_byte)
            .map_err(|_| CryptoError::CorruptedObject("missing IV length".into()))?;

        if len_byte[0] as usize != IV_LENGTH {
            return Err(CryptoError::CorruptedObject(format!(
                "unexpected IV length {}",
                len_byte[0]
            )));
        }

        let mut iv = [0u8; IV_LENGTH];
        reader
            .read_exact(&mut iv)
            .map_err(|_| CryptoError::CorruptedObject("truncated IV".into()))?;

        let mut ciphertext = Vec::new();
        reader
            .read_to_end(&mut ciphertext)
            .map_err(|_| CryptoError::CorruptedObject("truncated ciphertext".into()))?;

        if ciphertext.len() < TAG_LENGTH {
            return Err(CryptoError::CorruptedObject("ciphertext shorter than tag".into()));
        }

        Ok(Self { iv, ciphertext })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::DocumentKey;

    fn test_key() -> DocumentKey {
        DocumentKey::generate()
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = test_key();
        let plaintext = b"Hello, DocVault!";
        let encrypted = key.seal(plaintext).unwrap();
        let decrypted = key.open(&encrypted).unwrap();
        assert_eq!(&decrypted, plaintext);
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let key1 = test_key();
        let key2 = test_key();
        let encrypted = key1.seal(b"secret").unwrap();
        assert!(key2.open(&encrypted).is_err());
    }

    #[test]
    fn tampered_ciphertext_detected() {
        let key = test_key();
        let mut encrypted = key.seal(b"secret data").unwrap();
        encrypted.ciphertext[0] ^= 0xFF;
        assert!(key.open(&encrypted).is_err());
    }

    #[test]
    fn tampered_tag_detected() {
        let key = test_key();
        let mut encrypted = key.seal(b"secret data").unwrap();
        let last = encrypted.ciphertext.len() - 1;
        encrypted.ciphertext[last] ^= 0x01;
        assert!(key.open(&encrypted).is_err());
    }

    #[test]
    fn serialization_round_trip() {
        let key = test_key();
        let encrypted = key.seal(b"serialize me").unwrap();
        let bytes = encrypted.to_bytes();
        assert_eq!(bytes[0] as usize, IV_LENGTH);
        let restored = EncryptedData::from_bytes(&bytes).unwrap();
        let decrypted = key.open(&restored).unwrap();
        assert_eq!(&decrypted, b"serialize me");
    }

    #[test]
    fn from_bytes_rejects_too_short() {
        assert!(EncryptedData::from_bytes(&[]).is_err());
        assert!(EncryptedData::from_bytes(&[12u8; 5]).is_err());
        // Valid length byte + IV but no room for a tag
        let mut bytes = vec![IV_LENGTH as u8];
        bytes.extend_from_slice(&[0u8; IV_LENGTH]);
        bytes.extend_from_slice(&[0u8; TAG_LENGTH - 1]);
        assert!(EncryptedData::from_bytes(&bytes).is_err());
    }

    #[test]
    fn from_bytes_rejects_wrong_iv_length() {
        let mut bytes = vec![16u8];
        bytes.extend_from_slice(&[0u8; 64]);
        assert!(EncryptedData::from_bytes(&bytes).is_err());
    }

    #[test]
    fn different_encryptions_produce_different_ivs() {
        let key = test_key();
        let e1 = key.seal(b"same data").unwrap();
        let e2 = key.seal(b"same data").unwrap();
        assert_ne!(e1.iv, e2.iv);
    }

    #[test]
    fn empty_plaintext_round_trip() {
        let key = test_key();
        let encrypted = key.seal(b"").unwrap();
        let decrypted = key.open(&encrypted).unwrap();
        assert!(decrypted.is_empty());
    }
}
