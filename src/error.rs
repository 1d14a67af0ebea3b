use cipher::CipherError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KitError {
    #[error("The path {0} not exist")]
    PathNotExist(String),

    #[error("Malformed key file `{path}`: {msg}")]
    KeyFileMalformed { path: String, msg: String },

    #[error("Invalid base62 char `{ch}` in the `{idx}`th position")]
    InvalidBase62 { idx: usize, ch: char },

    #[error("The signature of the owner `{0}` does not match the public key")]
    SignatureMismatch(String),

    #[error("Missing the owner identity")]
    MissingIdentity,

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
