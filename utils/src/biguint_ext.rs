use crate::BigIntExt;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rand;
use std::borrow::Borrow;
use std::ops::Deref;

pub struct BigUintExt<T: Borrow<BigUint>>(pub T);

impl<T: Borrow<BigUint>> Deref for BigUintExt<T> {
    type Target = BigUint;
    fn deref(&self) -> &Self::Target {
        self.0.borrow()
    }
}

/// Miller-Rabin见证数`a`的取值范围
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WitnessRange {
    /// $a \in [2, n-2]$
    #[default]
    Strict,
    /// $a \in [2, n]$, 当`a == n`时素数会被误判为合数
    Inclusive,
}

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// 欧几里得算法, gcd(a, 0) = a
    pub fn gcd(&self, other: &BigUint) -> BigUint {
        let (mut a, mut b) = (self.deref().clone(), other.clone());
        while !b.is_zero() {
            let r = &a % &b;
            a = std::mem::replace(&mut b, r);
        }
        a
    }

    /// self * inv = 1 \mod modulus
    pub fn modinv(&self, modulus: &BigUint) -> Option<BigUint> {
        let (a, n) = (
            BigInt::from(self.deref().clone()),
            BigInt::from(modulus.clone()),
        );
        BigIntExt(a).modinv(&n).and_then(|x| x.to_biguint())
    }

    /// $self^{exponent} \mod modulus$, 从低位到高位的平方-乘算法.
    ///
    /// `exponent`只读借用, 逐位检查而不移位, 调用方可以重复使用同一个指数.
    ///
    /// # Panics
    ///
    /// `modulus == 0`
    pub fn pow_mod(&self, exponent: &BigUint, modulus: &BigUint) -> BigUint {
        assert!(!modulus.is_zero(), "pow_mod: the modulus must be positive");

        let (mut v, mut p) = (BigUint::one() % modulus, self.deref() % modulus);
        for i in 0..exponent.bits() {
            if exponent.bit(i) {
                v *= &p;
                v %= modulus;
            }
            p = &p * &p;
            p %= modulus;
        }

        v
    }

    // 生成[0..self)之间的随机数
    pub fn gen_random<R: Rand>(&self, rng: &mut R) -> BigUint {
        assert!(!self.is_zero(), "gen_random: empty range");

        let bits = self.bits() as usize;
        let (mut n, b) = (vec![0u8; (bits + 7) >> 3], bits & 7);

        loop {
            rng.rand(n.as_mut_slice());
            if b != 0 {
                if let Some(x) = n.last_mut() {
                    *x &= (1u8 << b) - 1;
                }
            }

            let r = BigUint::from_bytes_le(n.as_slice());
            if self.deref() > &r {
                return r;
            }
        }
    }

    // 生成[self, hi]之间的随机数
    pub fn gen_range<R: Rand>(&self, hi: &BigUint, rng: &mut R) -> BigUint {
        let lo = self.deref();
        assert!(lo <= hi, "gen_range: empty range");
        let span = hi - lo + 1u32;
        lo + BigUintExt(span).gen_random(rng)
    }

    /// 生成比特长度恰为`bits_len`的均匀随机数(最高位固定为1)
    pub fn random_bits<R: Rand>(bits_len: usize, rng: &mut R) -> BigUint {
        if bits_len == 0 {
            return BigUint::zero();
        }

        let (mut p, b) = (
            vec![0u8; (bits_len + 7) >> 3],
            if (bits_len & 7) == 0 { 8 } else { bits_len & 7 },
        );
        rng.rand(p.as_mut_slice());

        // 清除大于bits_len的位, 并置最高位
        if let Some(x) = p.last_mut() {
            if b != 8 {
                *x &= (1u8 << b) - 1;
            }
            *x |= 1 << (b - 1);
        }

        BigUint::from_bytes_le(p.as_slice())
    }

    /// miller-rabin素数测试, 见证数取自`[2, n-2]`.
    ///
    /// 对于任意奇数n>2和正整数t, 出错的概率至多为$4^{-t}$
    pub fn probably_prime_test<Rng: Rand>(&self, test_rounds: usize, rng: &mut Rng) -> bool {
        self.probably_prime_test_with(test_rounds, WitnessRange::Strict, rng)
    }

    pub fn probably_prime_test_with<Rng: Rand>(
        &self,
        test_rounds: usize,
        range: WitnessRange,
        rng: &mut Rng,
    ) -> bool {
        let n = self.deref();
        let (two, three) = (BigUint::from(2u8), BigUint::from(3u8));

        if n == &two || n == &three {
            return true;
        } else if n < &two || n.is_even() {
            return false;
        }

        // n - 1 = r * 2^s
        let n_m1 = n - 1u32;
        let s = n_m1.trailing_zeros().unwrap_or(0);
        let r = &n_m1 >> s;

        let hi = match range {
            WitnessRange::Strict => n - 2u32,
            WitnessRange::Inclusive => n.clone(),
        };

        for _ in 0..test_rounds {
            let a = BigUintExt(&two).gen_range(&hi, rng);
            if self.miller_rabin_witness(s, &r, &n_m1, &a) {
                return false;
            }
        }

        true
    }

    /// 判断`a`是否能证明`n`是合数, n - 1 = 2^s * r
    fn miller_rabin_witness(&self, s: u64, r: &BigUint, n_m1: &BigUint, a: &BigUint) -> bool {
        let n = self.deref();
        let mut y = BigUintExt(a).pow_mod(r, n);
        if y.is_one() || &y == n_m1 {
            return false;
        }

        let mut j = 1;
        while j < s && &y != n_m1 {
            y = &y * &y;
            y %= n;
            if y.is_one() {
                return true;
            }
            j += 1;
        }

        &y != n_m1
    }

    /// generate a number p with the bits length of `bits_len`, such that p is prime
    /// with high probability that is related to the number of `test_round_num`;
    pub fn generate_prime<Rng: Rand>(
        bits_len: usize,
        test_round_num: usize,
        rng: &mut Rng,
    ) -> Result<BigUint, String> {
        Self::generate_prime_with(bits_len, test_round_num, WitnessRange::Strict, rng)
    }

    pub fn generate_prime_with<Rng: Rand>(
        bits_len: usize,
        test_round_num: usize,
        range: WitnessRange,
        rng: &mut Rng,
    ) -> Result<BigUint, String> {
        if bits_len < 2 {
            return Err("prime size must at least 2-bits".to_string());
        }

        loop {
            let n = BigUintExt(Self::random_bits(bits_len, rng));
            if n.probably_prime_test_with(test_round_num, range, rng) {
                return Ok(n.0);
            }
        }
    }
}
