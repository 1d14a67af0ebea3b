use std::{error::Error, fmt::Display};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CipherError {
    /// 不合法分组大小
    InvalidBlockSize { target: usize, real: usize },

    /// 不合法的密钥长度
    InvalidKeySize { target: usize, real: usize },

    InvalidPublicKey(String),

    InvalidPrivateKey(String),

    /// 待处理的整数不小于模数
    MessageTooLarge(String),

    /// 密文无法解析, 或解密结果缺少哨兵字节(密钥不匹配)
    InvalidCiphertext(String),

    IOError(String),

    Other(String),
}

impl Display for CipherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBlockSize { target, real } => f.write_fmt(format_args!(
                "Invalid block data size `{real}` need at least `{target}`"
            )),
            CipherError::InvalidKeySize { target, real } => f.write_fmt(format_args!(
                "Invalid key size `{real}` need at least `{target}`"
            )),
            CipherError::InvalidPublicKey(s) => write!(f, "Invalid public key: {s}"),
            CipherError::InvalidPrivateKey(s) => write!(f, "Invalid private key: {s}"),
            CipherError::MessageTooLarge(s) => write!(f, "Message too large: {s}"),
            CipherError::InvalidCiphertext(s) => write!(f, "Invalid ciphertext: {s}"),
            CipherError::IOError(s) => write!(f, "IO error: {s}"),
            CipherError::Other(s) => f.write_str(s),
        }
    }
}

impl Error for CipherError {}

impl From<std::io::Error> for CipherError {
    fn from(value: std::io::Error) -> Self {
        Self::IOError(format!("{value}"))
    }
}

impl From<String> for CipherError {
    fn from(value: String) -> Self {
        Self::Other(value)
    }
}
