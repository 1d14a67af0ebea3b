//! RSA
//!
//! - 随机选择两个质数$p$和$q$($p\neq q$), 则模数$n=p*q$, 且$n$的比特长度恰为`nbits`;
//! - 随机选择一个`nbits`位的整数$e$作为公钥的指数部分, 其中$\gcd(e, (p-1)(q-1)) = 1$;
//! - 那么私钥的指数部分$d$满足: $d*e \equiv 1 \mod (p-1)(q-1)$;
//!
//! 加密: $y = x ^ e \mod n$;
//!
//! 解密: $y = x^d \mod n$;
//!
//! 签名: $s = m^d \mod n$, 验签: $s^e \mod n = m$;
//!
//! 原理: 欧拉定理$a^{\phi(n)} \equiv 1 \mod n$
//! - $x ^ {k(p-1)(q-1)+1} \equiv x \mod n$
//!
//! 分组格式: 明文块为`0xFF || chunk`, 其中`chunk`至多`block_size - 1`字节,
//! `block_size = (bits(n) - 2) / 8`; 每个密文块以小写十六进制写为一行.

mod key;
pub use key::{make_private_key, make_public_key, make_public_key_with};
pub use key::{KeyPair, PrimePair, PrivateKey, PublicKey};

mod stream;
pub use stream::{block_size, RsaDecryptStream, RsaEncryptStream};
