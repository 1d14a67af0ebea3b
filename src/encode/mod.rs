mod base62;
pub use base62::Base62;
