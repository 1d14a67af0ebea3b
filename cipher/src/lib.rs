use std::io::{Read, Write};

mod error;
pub use error::CipherError;

pub use rand::{Rand, SeededRand};

pub mod rsa;

pub trait Encrypt {
    // 写入ciphertext之前不清空
    fn encrypt(&self, plaintext: &[u8], ciphertext: &mut Vec<u8>) -> Result<(), CipherError>;
}

pub trait Decrypt {
    // 写入plaintext之前不清空
    fn decrypt(&self, ciphertext: &[u8], plaintext: &mut Vec<u8>) -> Result<(), CipherError>;
}

pub trait StreamEncrypt {
    /// 返回(读, 写)字节数
    fn stream_encrypt<R: Read, W: Write>(
        &self,
        in_data: &mut R,
        out_data: &mut W,
    ) -> Result<(usize, usize), CipherError>;
}

pub trait StreamDecrypt {
    /// 返回(读, 写)字节数
    fn stream_decrypt<R: Read, W: Write>(
        &self,
        in_data: &mut R,
        out_data: &mut W,
    ) -> Result<(usize, usize), CipherError>;
}
