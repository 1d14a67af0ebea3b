use num_bigint::BigInt;
use num_traits::{Euclid, One, Signed, Zero};
use std::borrow::Borrow;
use std::ops::Deref;

pub struct BigIntExt<T: Borrow<BigInt>>(pub T);

impl<T: Borrow<BigInt>> Deref for BigIntExt<T> {
    type Target = BigInt;
    fn deref(&self) -> &Self::Target {
        self.0.borrow()
    }
}

impl<T: Borrow<BigInt>> BigIntExt<T> {
    /// <<算法导论>> 扩展欧几里得算法求模逆元.
    ///
    /// 维护不变式 `r ≡ t * self (mod n)`, `r' ≡ t' * self (mod n)`, 每轮以商`q = r / r'`
    /// 同时约减`(r, r')`与`(t, t')`. 循环结束时`r = gcd(self, n)`, 若其为1则`t`即为逆元.
    ///
    /// self * inv = 1 \mod modulus.abs(), 结果位于`[0, |modulus|)`; `modulus == 0`或不互质时返回None
    pub fn modinv(&self, modulus: &BigInt) -> Option<BigInt> {
        let n = modulus.abs();
        if n.is_zero() {
            return None;
        }

        let (mut r, mut r1) = (n.clone(), self.rem_euclid(&n));
        let (mut t, mut t1) = (BigInt::zero(), BigInt::one());

        while !r1.is_zero() {
            let q = &r / &r1;

            let r2 = &r - &q * &r1;
            r = std::mem::replace(&mut r1, r2);

            let t2 = &t - &q * &t1;
            t = std::mem::replace(&mut t1, t2);
        }

        if !r.is_one() {
            return None;
        }

        if t.is_negative() {
            t += &n;
        }

        Some(t)
    }
}
