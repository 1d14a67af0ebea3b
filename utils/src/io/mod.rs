use std::io::{ErrorKind, Read};

/// 尽可能读满`buf`, 直到EOF. 返回实际读取的字节数, 小于`buf.len()`表示已到达EOF.
///
/// 与`Read::read_exact`不同, 到达EOF不视为错误; 短读会被继续读满, 因此分块边界只取决于数据本身.
pub fn fill_read<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}

/// 每次`read`至多返回`chunk`个字节的读取器, 用于模拟管道等场景下的短读.
#[cfg(any(test, feature = "test-util"))]
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct ChunkRead {
    data: Vec<u8>,
    idx: usize,
    chunk: usize,
}

#[cfg(any(test, feature = "test-util"))]
impl ChunkRead {
    pub fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self {
            data,
            idx: 0,
            chunk: chunk.max(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.idx == self.data.len()
    }

    pub fn len(&self) -> usize {
        self.data.len() - self.idx
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Read for ChunkRead {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.chunk).min(self.len());
        buf[..n].copy_from_slice(&self.data[self.idx..(self.idx + n)]);
        self.idx += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::{fill_read, ChunkRead};

    #[test]
    fn fill_across_short_reads() {
        let data = (0u8..=99).collect::<Vec<_>>();
        let mut r = ChunkRead::new(data.clone(), 3);

        let mut buf = [0u8; 32];
        assert_eq!(fill_read(&mut r, &mut buf).unwrap(), 32);
        assert_eq!(&buf[..], &data[..32]);

        let mut rest = Vec::new();
        loop {
            let n = fill_read(&mut r, &mut buf).unwrap();
            rest.extend_from_slice(&buf[..n]);
            if n < buf.len() {
                break;
            }
        }
        assert_eq!(rest, &data[32..]);
        assert!(r.is_empty());
    }

    #[test]
    fn fill_empty_source() {
        let mut r = ChunkRead::new(Vec::new(), 8);
        let mut buf = [0u8; 4];
        assert_eq!(fill_read(&mut r, &mut buf).unwrap(), 0);
        assert_eq!(fill_read(&mut r, &mut []).unwrap(), 0);
    }
}
