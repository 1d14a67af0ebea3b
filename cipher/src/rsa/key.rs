use crate::{CipherError, Rand};
use log::{debug, trace};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt::{Display, Formatter};
use utils::{numtheory, BigUintExt, WitnessRange};

/// 支持的最小模数比特长度
const MIN_KEY_BITS: usize = 16;

#[derive(Clone, Debug, PartialOrd, PartialEq, Ord, Eq)]
pub struct PublicKey {
    // n = p * q
    n: BigUint,
    // public exponent, gcd(e, (p-1)(q-1)) = 1
    e: BigUint,
}

/// 生成密钥时使用的两个素因子, 不会写入密钥文件
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimePair {
    p: BigUint,
    q: BigUint,
}

#[derive(Clone, Debug)]
pub struct PrivateKey {
    n: BigUint,
    // d * e = 1 % (p-1)(q-1)
    d: BigUint,
    // 仅在刚生成密钥时存在
    e: Option<BigUint>,
    factor: Option<PrimePair>,
}

#[derive(Clone, Debug)]
pub struct KeyPair {
    pk: PublicKey,
    sk: PrivateKey,
}

impl PublicKey {
    /// n: RSA modules
    /// e: public key exponent
    /// note: not to check the `n` and `exp` are right RSA parameters
    pub fn new_uncheck(n: BigUint, exp: BigUint) -> Self {
        Self { e: exp, n }
    }

    /// n
    pub fn modules(&self) -> &BigUint {
        &self.n
    }

    /// e
    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    pub fn bits_len(&self) -> usize {
        self.n.bits() as usize
    }

    /// $m^e \mod n, m \lt n$
    fn rsaep_uncheck(&self, m: &BigUint) -> BigUint {
        numtheory::pow_mod(m, &self.e, &self.n)
    }

    /// RSAEP: RSA Encrypt primitive
    pub fn rsaep(&self, m: &BigUint) -> Result<BigUint, CipherError> {
        if m < &self.n {
            Ok(self.rsaep_uncheck(m))
        } else {
            Err(CipherError::MessageTooLarge(format!(
                "rsaep: invalid message that need less than {:#x}",
                self.n
            )))
        }
    }

    /// 当且仅当$s^e \mod n = m$时返回true
    pub fn verify(&self, m: &BigUint, s: &BigUint) -> bool {
        self.n > BigUint::one() && &self.rsaep_uncheck(s) == m
    }

    pub fn is_valid(&self) -> Result<(), CipherError> {
        if self.n <= BigUint::one() {
            Err(CipherError::InvalidPublicKey(format!(
                "rsa: modulus {:#x} is too small",
                self.n
            )))
        } else if self.e <= BigUint::one() {
            Err(CipherError::InvalidPublicKey(format!(
                "rsa: public exponent {:#x} is too small",
                self.e
            )))
        } else {
            Ok(())
        }
    }
}

impl PrimePair {
    pub fn new(p: BigUint, q: BigUint) -> Self {
        Self { p, q }
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// (p-1)(q-1), 要求p, q均不小于1
    pub fn totient(&self) -> BigUint {
        (&self.p - 1u32) * (&self.q - 1u32)
    }
}

impl PrivateKey {
    pub fn new_uncheck(modulus: BigUint, private_exp: BigUint) -> Self {
        Self {
            n: modulus,
            d: private_exp,
            e: None,
            factor: None,
        }
    }

    /// n
    pub fn modules(&self) -> &BigUint {
        &self.n
    }

    /// d
    pub fn exponent(&self) -> &BigUint {
        &self.d
    }

    pub fn public_exponent(&self) -> Option<&BigUint> {
        self.e.as_ref()
    }

    pub fn factor(&self) -> Option<&PrimePair> {
        self.factor.as_ref()
    }

    pub fn bits_len(&self) -> usize {
        self.n.bits() as usize
    }

    fn rsadp_uncheck(&self, c: &BigUint) -> BigUint {
        numtheory::pow_mod(c, &self.d, &self.n)
    }

    /// RSADP: RSA Decrypt primitive
    pub fn rsadp(&self, c: &BigUint) -> Result<BigUint, CipherError> {
        if c < &self.n {
            Ok(self.rsadp_uncheck(c))
        } else {
            Err(CipherError::MessageTooLarge(format!(
                "rsadp: invalid cipher message {:#x} that need less than {:#x}",
                c, self.n
            )))
        }
    }

    /// $s = m^d \mod n$
    pub fn sign(&self, m: &BigUint) -> Result<BigUint, CipherError> {
        if m < &self.n {
            Ok(self.rsadp_uncheck(m))
        } else {
            Err(CipherError::MessageTooLarge(format!(
                "rsa sign: invalid message that need less than {:#x}",
                self.n
            )))
        }
    }

    pub fn is_valid(&self) -> Result<(), CipherError> {
        if self.n <= BigUint::one() {
            return Err(CipherError::InvalidPrivateKey(
                "rsa: invalid modulus".to_string(),
            ));
        }

        if self.d.is_zero() {
            return Err(CipherError::InvalidPrivateKey(
                "rsa: invalid exponent".to_string(),
            ));
        }

        let (Some(factor), Some(e)) = (self.factor.as_ref(), self.e.as_ref()) else {
            return Ok(());
        };

        for prime in [&factor.p, &factor.q] {
            if prime.is_zero() || prime.is_one() {
                return Err(CipherError::InvalidPrivateKey(
                    "rsa: invalid prime value".to_string(),
                ));
            }
        }

        if &factor.p * &factor.q != self.n {
            return Err(CipherError::InvalidPrivateKey(
                "rsa: invalid modulus".to_string(),
            ));
        }

        // d*e
        let de = &self.d * e;
        for prime in [&factor.p, &factor.q] {
            let pm1 = prime - 1u32;
            if &de % &pm1 != BigUint::one() % &pm1 {
                return Err(CipherError::InvalidPrivateKey(
                    "rsa: invalid exponent".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// 生成`bits_len`位模数的密钥对.
    ///
    /// `prime_test_rounds`为Miller-Rabin测试轮数, 对任意大于2的奇数, 误判概率至多为$4^{-n}$.
    pub fn generate_key<R: Rand>(
        bits_len: usize,
        prime_test_rounds: usize,
        rd: &mut R,
    ) -> Result<KeyPair, CipherError> {
        Self::generate_key_with(bits_len, prime_test_rounds, WitnessRange::default(), rd)
    }

    pub fn generate_key_with<R: Rand>(
        bits_len: usize,
        prime_test_rounds: usize,
        range: WitnessRange,
        rd: &mut R,
    ) -> Result<KeyPair, CipherError> {
        let (primes, pk) = make_public_key_with(bits_len, prime_test_rounds, range, rd)?;
        let sk = make_private_key(pk.exponent(), &primes)?;
        sk.is_valid()?;

        Ok(KeyPair { pk, sk })
    }
}

/// 生成素因子`p`, `q`以及公钥`(n, e)`, 见证数取自`[2, n-2]`
pub fn make_public_key<R: Rand>(
    bits_len: usize,
    prime_test_rounds: usize,
    rd: &mut R,
) -> Result<(PrimePair, PublicKey), CipherError> {
    make_public_key_with(bits_len, prime_test_rounds, WitnessRange::default(), rd)
}

pub fn make_public_key_with<R: Rand>(
    bits_len: usize,
    prime_test_rounds: usize,
    range: WitnessRange,
    rd: &mut R,
) -> Result<(PrimePair, PublicKey), CipherError> {
    if bits_len < MIN_KEY_BITS {
        return Err(CipherError::InvalidKeySize {
            target: MIN_KEY_BITS,
            real: bits_len,
        });
    }

    if prime_test_rounds == 0 {
        return Err(CipherError::Other(
            "rsa: the number of prime test rounds must be positive".to_string(),
        ));
    }

    // p_bits in [nbits/4, 3*nbits/4]
    let (lo, hi) = (
        BigUint::from(bits_len / 4),
        BigUint::from(3 * bits_len / 4),
    );
    let p_bits = BigUintExt(&lo).gen_range(&hi, rd);
    let p_bits = u64::try_from(&p_bits)
        .map_err(|e| CipherError::Other(format!("rsa: {e}")))? as usize;
    let q_bits = bits_len - p_bits;
    debug!("rsa: generate {bits_len}-bits modulus with p_bits={p_bits}, q_bits={q_bits}");

    let mut attempts = 0usize;
    let (p, q, n) = 'next_set_of_primes: loop {
        attempts += 1;
        let p = numtheory::make_prime_with(p_bits, prime_test_rounds, range, rd)?;
        let q = numtheory::make_prime_with(q_bits, prime_test_rounds, range, rd)?;

        if p == q {
            trace!("rsa: attempt {attempts} got p == q");
            continue 'next_set_of_primes;
        }

        let n = &p * &q;
        if n.bits() as usize != bits_len {
            trace!("rsa: attempt {attempts} got {}-bits modulus", n.bits());
            continue 'next_set_of_primes;
        }

        break (p, q, n);
    };
    debug!("rsa: found primes after {attempts} attempts");

    let primes = PrimePair { p, q };
    let totient = primes.totient();
    let e = loop {
        let e = BigUintExt::<BigUint>::random_bits(bits_len, rd);
        if e > BigUint::one() && numtheory::gcd(&e, &totient).is_one() {
            break e;
        }
    };

    Ok((primes, PublicKey::new_uncheck(n, e)))
}

/// $d = e^{-1} \mod (p-1)(q-1)$
pub fn make_private_key(e: &BigUint, primes: &PrimePair) -> Result<PrivateKey, CipherError> {
    let two = BigUint::from(2u8);
    if primes.p < two || primes.q < two {
        return Err(CipherError::InvalidPrivateKey(format!(
            "rsa: prime factors {:#x} and {:#x} must be at least 2",
            primes.p, primes.q
        )));
    }

    let d = numtheory::mod_inverse(e, &primes.totient());
    if d.is_zero() {
        return Err(CipherError::InvalidPublicKey(format!(
            "rsa: public exponent {:#x} is not invertible",
            e
        )));
    }

    Ok(PrivateKey {
        n: &primes.p * &primes.q,
        d,
        e: Some(e.clone()),
        factor: Some(primes.clone()),
    })
}

impl KeyPair {
    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.sk
    }

    pub fn into_parts(self) -> (PublicKey, PrivateKey) {
        (self.pk, self.sk)
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{n={:#x}, e={:#x}}}", self.n, self.e)
    }
}

impl Display for PrimePair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{p:{:#x}, q:{:#x}}}", self.p, self.q)
    }
}

impl Display for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.factor.as_ref() {
            Some(factor) => {
                write!(f, "{{n: {:#x}, d: {:#x}, factor: {}}}", self.n, self.d, factor)
            }
            None => {
                write!(f, "{{n: {:#x}, d: {:#x}, factor: []}}", self.n, self.d)
            }
        }
    }
}
