use crate::error::KitError;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

/// 身份字符串与大整数之间的62进制转换, 数字表为`0-9A-Za-z`
#[derive(Default)]
pub struct Base62;

impl Base62 {
    const BASE62_STD: [u8; 62] = *b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

    const MAP_BASE62: [i8; 256] = Self::map_table();

    const fn map_table() -> [i8; 256] {
        let (mut map, mut i) = ([-1i8; 256], 0);
        while i < Self::BASE62_STD.len() {
            map[Self::BASE62_STD[i] as usize] = i as i8;
            i += 1;
        }
        map
    }

    pub fn new() -> Self {
        Base62
    }

    /// 大端序, 最高位在前
    pub fn decode(&self, s: &str) -> Result<BigUint, KitError> {
        if s.is_empty() {
            return Err(KitError::MissingIdentity);
        }

        let mut n = BigUint::zero();
        for (idx, ch) in s.chars().enumerate() {
            let d = u8::try_from(ch)
                .map(|b| Self::MAP_BASE62[b as usize])
                .unwrap_or(-1);
            if d < 0 {
                return Err(KitError::InvalidBase62 { idx, ch });
            }

            n *= 62u32;
            n += d as u32;
        }

        Ok(n)
    }

    pub fn encode(&self, n: &BigUint) -> String {
        if n.is_zero() {
            return "0".to_string();
        }

        let (mut digits, mut n, base) = (Vec::new(), n.clone(), BigUint::from(62u32));
        while !n.is_zero() {
            let (q, r) = n.div_rem(&base);
            let r = r.to_usize().unwrap_or_default();
            digits.push(Self::BASE62_STD[r]);
            n = q;
        }

        digits.iter().rev().map(|&d| char::from(d)).collect()
    }
}
