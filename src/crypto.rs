use aes::{
    cipher::{BlockEncrypt, KeyInit},
    Aes256, Block,
};
use enum_iterator::IntoEnumIterator;
use std::fmt;

/// Keystream is grown in batches of this many bytes
const BATCH_SIZE: usize = 1024;

/// Each key byte is stored in the low byte of a 16 byte slot
const AES_USER_KEY: [u8; 128] = [
    0x13, 0x00, 0x00, 0x00, 0x52, 0x00, 0x00, 0x00, 0x2A, 0x00, 0x00, 0x00,
    0x5B, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
    0x10, 0x00, 0x00, 0x00, 0x60, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x00, 0x00, 0x43, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x00,
    0xB4, 0x00, 0x00, 0x00, 0x4B, 0x00, 0x00, 0x00, 0x35, 0x00, 0x00, 0x00,
    0x05, 0x00, 0x00, 0x00, 0x1B, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00,
    0x5F, 0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x00,
    0x50, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x1B, 0x00, 0x00, 0x00,
    0x33, 0x00, 0x00, 0x00, 0x55, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
    0x09, 0x00, 0x00, 0x00, 0x52, 0x00, 0x00, 0x00, 0xDE, 0x00, 0x00, 0x00,
    0xC7, 0x00, 0x00, 0x00, 0x1E, 0x00, 0x00, 0x00,
];

/// Known initialization vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoEnumIterator)]
pub enum IvPreset {
    Gms,
    Sea,
    Empty,
}

impl IvPreset {
    pub fn iv(&self) -> [u8; 4] {
        match self {
            Self::Gms => [0x4D, 0x23, 0xC7, 0x2B],
            Self::Sea => [0xB9, 0x7D, 0x63, 0xE9],
            Self::Empty => [0x00, 0x00, 0x00, 0x00],
        }
    }

    pub fn get_name(&self) -> &str {
        match self {
            Self::Gms => "gms",
            Self::Sea => "sea",
            Self::Empty => "empty",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::into_enum_iter().find(|preset| preset.get_name() == name)
    }
}

/// AES-256 in CBC mode over an all-zero plaintext, used purely as a
/// keystream generator.
struct KeystreamCipher {
    aes: Aes256,
    chain: Block,
}

impl KeystreamCipher {
    /// With a zero plaintext every ciphertext block is the encryption of
    /// the previous one.
    fn next_block(&mut self) -> Block {
        self.aes.encrypt_block(&mut self.chain);
        self.chain
    }
}

/// String cipher for one decode session.
///
/// The mask only ever grows and bytes already generated never change.
pub struct WzCrypto {
    cipher: Option<KeystreamCipher>,
    cipher_mask: Vec<u8>,
}

impl fmt::Debug for WzCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WzCrypto")
            .field("empty_iv", &self.cipher.is_none())
            .field("mask_len", &self.cipher_mask.len())
            .finish()
    }
}

impl WzCrypto {
    pub fn from_iv(iv: &[u8]) -> Self {
        if iv.iter().all(|&b| b == 0) {
            return Self {
                cipher: None,
                cipher_mask: Vec::new(),
            };
        }

        let mut key = [0u8; 32];
        for i in (0..AES_USER_KEY.len()).step_by(16) {
            key[i / 4] = AES_USER_KEY[i];
        }

        let mut chain = Block::default();
        chain
            .iter_mut()
            .zip(iv.iter().cycle())
            .for_each(|(b, iv)| *b = *iv);

        Self {
            cipher: Some(KeystreamCipher {
                aes: Aes256::new(&key.into()),
                chain,
            }),
            cipher_mask: Vec::new(),
        }
    }

    pub fn from_preset(preset: IvPreset) -> Self {
        Self::from_iv(&preset.iv())
    }

    /// Keystream bytes generated so far.
    pub fn mask(&self) -> &[u8] {
        &self.cipher_mask
    }

    pub fn ensure_size(&mut self, size: usize) {
        let cur_size = self.cipher_mask.len();
        if cur_size >= size {
            return;
        }
        let new_size = (size / BATCH_SIZE + 1) * BATCH_SIZE;
        log::trace!("Growing keystream: {} -> {}", cur_size, new_size);
        match &mut self.cipher {
            Some(cipher) => {
                self.cipher_mask.reserve(new_size - cur_size);
                while self.cipher_mask.len() < new_size {
                    let block = cipher.next_block();
                    self.cipher_mask.extend_from_slice(&block);
                }
            }
            None => self.cipher_mask.resize(new_size, 0),
        }
    }

    pub fn crypt_ascii(&mut self, data: &mut [u8]) {
        self.ensure_size(data.len());
        let mut mask = 0xAAu8;
        data.iter_mut()
            .zip(self.cipher_mask.iter())
            .for_each(|(b, key)| {
                *b ^= key ^ mask;
                mask = mask.wrapping_add(1);
            });
    }

    /// Any trailing odd byte is left untouched.
    pub fn crypt_unicode(&mut self, data: &mut [u8]) {
        self.ensure_size(data.len());
        let mut mask = 0xAAAAu16;
        data.chunks_exact_mut(2)
            .zip(self.cipher_mask.chunks_exact(2))
            .for_each(|(unit, key)| {
                let [lo, hi] = mask.to_le_bytes();
                unit[0] ^= key[0] ^ lo;
                unit[1] ^= key[1] ^ hi;
                mask = mask.wrapping_add(1);
            });
    }
}
