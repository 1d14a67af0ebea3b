use crate::io::fill_read;
use std::io::Read;
use std::ops::Deref;
#[cfg(feature = "sec-zeroize")]
use zeroize::Zeroize;

/// 明文块: `SENTINEL || payload`.
///
/// 首字节固定为`0xFF`, 使得前导零字节在转换为大整数后不会丢失, 解密时也可借此校验密钥是否匹配.
#[derive(Default, Clone, Debug)]
pub struct Block {
    data: Vec<u8>,
    payload_cap: usize,
}

impl Block {
    pub const SENTINEL: u8 = 0xFF;

    /// 每块最多容纳`payload_cap`个字节的载荷
    pub fn with_payload_capacity(payload_cap: usize) -> Self {
        let mut data = Vec::with_capacity(payload_cap + 1);
        data.push(Self::SENTINEL);
        Self { data, payload_cap }
    }

    pub fn payload_capacity(&self) -> usize {
        self.payload_cap
    }

    /// 从`reader`读取下一块载荷, 返回读取的字节数. 0表示已无数据.
    pub fn refill<R: Read + ?Sized>(&mut self, reader: &mut R) -> std::io::Result<usize> {
        self.data.clear();
        self.data.push(Self::SENTINEL);
        self.data.resize(self.payload_cap + 1, 0);

        let n = fill_read(reader, &mut self.data[1..])?;
        self.data.truncate(n + 1);
        Ok(n)
    }

    /// 去掉哨兵字节后的载荷; 首字节不是哨兵时返回None
    pub fn payload(&self) -> Option<&[u8]> {
        match self.data.split_first() {
            Some((&Self::SENTINEL, payload)) => Some(payload),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        #[cfg(feature = "sec-zeroize")]
        self.data.zeroize();
        self.data.clear();
    }

    pub fn as_slice(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        self.data.as_slice()
    }
}

impl Deref for Block {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.data.as_slice()
    }
}

#[cfg(feature = "sec-zeroize")]
impl Zeroize for Block {
    fn zeroize(&mut self) {
        self.data.zeroize();
    }
}

#[cfg(feature = "sec-zeroize-drop")]
impl Drop for Block {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl From<Vec<u8>> for Block {
    fn from(data: Vec<u8>) -> Self {
        let payload_cap = data.len().saturating_sub(1);
        Self { data, payload_cap }
    }
}

impl From<&[u8]> for Block {
    fn from(value: &[u8]) -> Self {
        Self::from(value.to_vec())
    }
}
