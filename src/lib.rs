pub mod cmd;
pub mod encode;
pub mod error;
pub mod keyfile;
