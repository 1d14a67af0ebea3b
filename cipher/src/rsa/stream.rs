use crate::rsa::{PrivateKey, PublicKey};
use crate::{CipherError, Decrypt, Encrypt, StreamDecrypt, StreamEncrypt};
use log::trace;
use num_bigint::BigUint;
use std::io::{BufRead, BufReader, Read, Write};
use utils::Block;

/// 明文块的字节长度(含哨兵字节): `(bits(n) - 2) / 8`
pub fn block_size(modulus: &BigUint) -> usize {
    (modulus.bits() as usize).saturating_sub(2) >> 3
}

fn check_block_size(modulus: &BigUint) -> Result<usize, CipherError> {
    let bs = block_size(modulus);
    if bs < 2 {
        Err(CipherError::InvalidBlockSize { target: 2, real: bs })
    } else {
        Ok(bs)
    }
}

/// 按`0xFF || chunk`分块加密, 每个密文块写为一行小写十六进制
#[derive(Clone, Debug)]
pub struct RsaEncryptStream {
    key: PublicKey,
    block_size: usize,
}

#[derive(Clone, Debug)]
pub struct RsaDecryptStream {
    key: PrivateKey,
    block_size: usize,
}

impl RsaEncryptStream {
    pub fn new(key: PublicKey) -> Result<Self, CipherError> {
        key.is_valid()?;
        let block_size = check_block_size(key.modules())?;
        Ok(Self { key, block_size })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }
}

impl RsaDecryptStream {
    pub fn new(key: PrivateKey) -> Result<Self, CipherError> {
        key.is_valid()?;
        let block_size = check_block_size(key.modules())?;
        Ok(Self { key, block_size })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.key
    }
}

impl StreamEncrypt for RsaEncryptStream {
    fn stream_encrypt<R: Read, W: Write>(
        &self,
        in_data: &mut R,
        out_data: &mut W,
    ) -> Result<(usize, usize), CipherError> {
        let mut block = Block::with_payload_capacity(self.block_size - 1);
        let (mut rlen, mut wlen) = (0, 0);

        loop {
            let n = block.refill(in_data)?;
            if n == 0 {
                break;
            }
            rlen += n;

            // BigUint不支持zeroize, 只有字节缓冲区会被清零
            let m = BigUint::from_bytes_be(block.as_slice());
            block.clear();
            let c = self.key.rsaep(&m)?;

            let line = format!("{:x}\n", c);
            out_data.write_all(line.as_bytes())?;
            wlen += line.len();
            trace!("rsa: encrypt block of {n} bytes");

            if n < block.payload_capacity() {
                break;
            }
        }

        Ok((rlen, wlen))
    }
}

impl StreamDecrypt for RsaDecryptStream {
    fn stream_decrypt<R: Read, W: Write>(
        &self,
        in_data: &mut R,
        out_data: &mut W,
    ) -> Result<(usize, usize), CipherError> {
        let mut reader = BufReader::new(in_data);
        let (mut line, mut rlen, mut wlen) = (Vec::with_capacity(128), 0, 0);

        loop {
            line.clear();
            let n = reader.read_until(b'\n', &mut line)?;
            if n == 0 {
                break;
            }
            rlen += n;

            let hex = std::str::from_utf8(line.as_slice())
                .map(str::trim)
                .map_err(|e| CipherError::InvalidCiphertext(format!("rsa: {e}")))?;
            if hex.is_empty() {
                continue;
            }

            let c = BigUint::parse_bytes(hex.as_bytes(), 16).ok_or_else(|| {
                CipherError::InvalidCiphertext(format!("rsa: `{hex}` is not a hex number"))
            })?;

            let block = Block::from(self.key.rsadp(&c)?.to_bytes_be());
            let payload = block.payload().ok_or_else(|| {
                CipherError::InvalidCiphertext(
                    "rsa: decrypted block has no 0xff sentinel, the private key may not match"
                        .to_string(),
                )
            })?;

            out_data.write_all(payload)?;
            wlen += payload.len();
        }

        Ok((rlen, wlen))
    }
}

impl Encrypt for RsaEncryptStream {
    fn encrypt(&self, mut plaintext: &[u8], ciphertext: &mut Vec<u8>) -> Result<(), CipherError> {
        let _l = self.stream_encrypt(&mut plaintext, ciphertext)?;
        Ok(())
    }
}

impl Decrypt for RsaDecryptStream {
    fn decrypt(&self, mut ciphertext: &[u8], plaintext: &mut Vec<u8>) -> Result<(), CipherError> {
        let _l = self.stream_decrypt(&mut ciphertext, plaintext)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{block_size, RsaDecryptStream, RsaEncryptStream};
    use crate::rsa::{PrivateKey, PublicKey};
    use crate::{CipherError, Decrypt, Encrypt, Rand, SeededRand, StreamDecrypt, StreamEncrypt};
    use num_bigint::BigUint;
    use utils::io::ChunkRead;

    fn cipher_pair(bits: usize, seed: u64) -> (RsaEncryptStream, RsaDecryptStream) {
        let mut rng = SeededRand::new(seed);
        let (pk, sk) = PrivateKey::generate_key(bits, 20, &mut rng)
            .unwrap()
            .into_parts();
        (
            RsaEncryptStream::new(pk).unwrap(),
            RsaDecryptStream::new(sk).unwrap(),
        )
    }

    fn random_msg(len: usize, seed: u64) -> Vec<u8> {
        let mut msg = vec![0u8; len];
        SeededRand::new(seed).rand(msg.as_mut_slice());
        msg
    }

    #[test]
    fn block_size_of_modulus() {
        for (bits, bs) in [(16u64, 1usize), (17, 1), (18, 2), (256, 31), (257, 31), (258, 32)] {
            let n = BigUint::from(1u8) << (bits - 1);
            assert_eq!(block_size(&n), bs, "bits {bits}");
        }

        let mut rng = SeededRand::new(3);
        let pk = PrivateKey::generate_key(16, 20, &mut rng)
            .unwrap()
            .into_parts()
            .0;
        assert!(matches!(
            RsaEncryptStream::new(pk),
            Err(CipherError::InvalidBlockSize { target: 2, real: 1 })
        ));
    }

    #[test]
    fn roundtrip_lengths() {
        let (enc, dec) = cipher_pair(256, 17);
        let bs = enc.block_size();
        assert_eq!(bs, 31);

        for len in [0, 1, bs - 2, bs - 1, bs, 3 * bs, 1000] {
            let msg = random_msg(len, len as u64);
            let mut ciphertext = Vec::new();
            let (rlen, wlen) = enc
                .stream_encrypt(&mut msg.as_slice(), &mut ciphertext)
                .unwrap();
            assert_eq!(rlen, len);
            assert_eq!(wlen, ciphertext.len());

            let lines = ciphertext.iter().filter(|&&x| x == b'\n').count();
            assert_eq!(lines, (len + bs - 2) / (bs - 1), "blocks of length {len}");

            let mut plaintext = Vec::new();
            let (rlen, wlen) = dec
                .stream_decrypt(&mut ciphertext.as_slice(), &mut plaintext)
                .unwrap();
            assert_eq!(rlen, ciphertext.len());
            assert_eq!(wlen, len);
            assert_eq!(plaintext, msg, "roundtrip of length {len}");
        }
    }

    #[test]
    fn leading_zero_bytes() {
        let (enc, dec) = cipher_pair(128, 23);
        let msg = vec![0u8; 3 * enc.block_size()];

        let (mut ciphertext, mut plaintext) = (Vec::new(), Vec::new());
        enc.encrypt(msg.as_slice(), &mut ciphertext).unwrap();
        dec.decrypt(ciphertext.as_slice(), &mut plaintext).unwrap();
        assert_eq!(plaintext, msg);
    }

    #[test]
    fn short_reads_keep_block_boundaries() {
        let (enc, _dec) = cipher_pair(256, 29);
        let msg = random_msg(500, 1);

        let mut expect = Vec::new();
        enc.encrypt(msg.as_slice(), &mut expect).unwrap();

        for chunk in [1, 3, 7, 64] {
            let mut ciphertext = Vec::new();
            enc.stream_encrypt(&mut ChunkRead::new(msg.clone(), chunk), &mut ciphertext)
                .unwrap();
            assert_eq!(ciphertext, expect, "short reads of {chunk} bytes");
        }
    }

    #[test]
    fn ciphertext_format() {
        let (enc, dec) = cipher_pair(128, 37);
        let mut ciphertext = Vec::new();
        enc.encrypt(b"hello, rsa", &mut ciphertext).unwrap();

        let text = String::from_utf8(ciphertext.clone()).unwrap();
        for line in text.lines() {
            assert!(line
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }

        // CRLF and blank lines
        let crlf = text.replace('\n', "\r\n\n");
        let mut plaintext = Vec::new();
        dec.decrypt(crlf.as_bytes(), &mut plaintext).unwrap();
        assert_eq!(plaintext, b"hello, rsa");
    }

    #[test]
    fn rejects_malformed_ciphertext() {
        let (_enc, dec) = cipher_pair(128, 41);
        let mut plaintext = Vec::new();

        assert!(matches!(
            dec.decrypt(b"xyz\n", &mut plaintext),
            Err(CipherError::InvalidCiphertext(_))
        ));

        let too_large = format!("{:x}\n", dec.private_key().modules());
        assert!(matches!(
            dec.decrypt(too_large.as_bytes(), &mut plaintext),
            Err(CipherError::MessageTooLarge(_))
        ));

        // 0 decrypts to 0, which has no sentinel
        assert!(matches!(
            dec.decrypt(b"0\n", &mut plaintext),
            Err(CipherError::InvalidCiphertext(_))
        ));
    }

    #[test]
    fn wrong_key_is_detected() {
        let (enc, _dec) = cipher_pair(256, 43);
        let (_enc2, dec2) = cipher_pair(256, 47);

        let msg = random_msg(10 * enc.block_size(), 5);
        let mut ciphertext = Vec::new();
        enc.encrypt(msg.as_slice(), &mut ciphertext).unwrap();

        let mut plaintext = Vec::new();
        assert!(dec2.decrypt(ciphertext.as_slice(), &mut plaintext).is_err());
    }

    #[test]
    fn invalid_keys() {
        assert!(matches!(
            RsaEncryptStream::new(PublicKey::new_uncheck(BigUint::from(1u8), BigUint::from(3u8))),
            Err(CipherError::InvalidPublicKey(_))
        ));
        assert!(matches!(
            RsaDecryptStream::new(PrivateKey::new_uncheck(
                BigUint::from(143u8),
                BigUint::from(0u8)
            )),
            Err(CipherError::InvalidPrivateKey(_))
        ));
    }
}
