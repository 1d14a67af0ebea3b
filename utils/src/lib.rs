mod biguint_ext;
pub use biguint_ext::{BigUintExt, WitnessRange};

mod bigint_ext;
pub use bigint_ext::BigIntExt;

mod block;
pub use block::Block;

pub mod io;
pub mod numtheory;
