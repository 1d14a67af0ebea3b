//! 数论函数的自由函数形式, 均转发到[`BigUintExt`].

use crate::{BigUintExt, WitnessRange};
use num_bigint::BigUint;
use num_traits::Zero;
use rand::Rand;

pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    BigUintExt(a).gcd(b)
}

/// 返回`a`模`n`的逆元; 不存在时返回0
pub fn mod_inverse(a: &BigUint, n: &BigUint) -> BigUint {
    BigUintExt(a).modinv(n).unwrap_or_else(BigUint::zero)
}

pub fn pow_mod(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    BigUintExt(base).pow_mod(exponent, modulus)
}

pub fn is_prime<R: Rand>(n: &BigUint, iters: usize, rng: &mut R) -> bool {
    BigUintExt(n).probably_prime_test(iters, rng)
}

pub fn is_prime_with<R: Rand>(
    n: &BigUint,
    iters: usize,
    range: WitnessRange,
    rng: &mut R,
) -> bool {
    BigUintExt(n).probably_prime_test_with(iters, range, rng)
}

pub fn make_prime<R: Rand>(bits: usize, iters: usize, rng: &mut R) -> Result<BigUint, String> {
    BigUintExt::<BigUint>::generate_prime(bits, iters, rng)
}

pub fn make_prime_with<R: Rand>(
    bits: usize,
    iters: usize,
    range: WitnessRange,
    rng: &mut R,
) -> Result<BigUint, String> {
    BigUintExt::<BigUint>::generate_prime_with(bits, iters, range, rng)
}
