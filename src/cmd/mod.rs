mod config;
pub use config::RsaConfig;

mod keygen;
pub use keygen::KeygenArgs;

mod encrypt;
pub use encrypt::EncryptArgs;

mod decrypt;
pub use decrypt::DecryptArgs;

use num_bigint::BigUint;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, StdoutLock, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::KitError;

/// verbose输出: `name (bits) = value`
fn print_stat<W: Write>(w: &mut W, name: &str, val: &BigUint) -> std::io::Result<()> {
    writeln!(w, "{name} ({} bits) = {}", val.bits(), val)
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>, KitError> {
    match path {
        Some(p) => {
            if !p.is_file() {
                return Err(KitError::PathNotExist(p.display().to_string()));
            }
            Ok(Box::new(BufReader::new(File::open(p)?)))
        }
        None => Ok(Box::new(std::io::stdin().lock())),
    }
}

/// 输出到标准输出, 或先写入同目录的临时文件, `commit`成功后才替换目标文件.
///
/// 未`commit`即被丢弃时临时文件随之删除, 出错中断不会留下不完整的输出文件.
enum Output {
    Stdout(BufWriter<StdoutLock<'static>>),
    File {
        w: BufWriter<NamedTempFile>,
        path: PathBuf,
    },
}

impl Output {
    fn create(path: Option<&Path>) -> Result<Self, KitError> {
        match path {
            Some(p) => {
                let dir = match p.parent() {
                    Some(d) if !d.as_os_str().is_empty() => d,
                    _ => Path::new("."),
                };
                let tmp = NamedTempFile::new_in(dir)?;
                Ok(Self::File {
                    w: BufWriter::new(tmp),
                    path: p.to_path_buf(),
                })
            }
            None => Ok(Self::Stdout(BufWriter::new(std::io::stdout().lock()))),
        }
    }

    fn commit(self) -> Result<(), KitError> {
        match self {
            Self::Stdout(mut w) => w.flush()?,
            Self::File { w, path } => {
                let tmp = w.into_inner().map_err(|e| e.into_error())?;
                tmp.persist(&path).map_err(std::io::Error::from)?;
            }
        }

        Ok(())
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::File { w, .. } => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File { w, .. } => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{print_stat, Output};
    use num_bigint::BigUint;
    use std::io::Write;

    #[test]
    fn stat_line() {
        let mut buf = Vec::new();
        print_stat(&mut buf, "n", &BigUint::from(143u32)).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "n (8 bits) = 143\n");
    }

    #[test]
    fn output_is_replaced_only_on_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        std::fs::write(&path, b"old").unwrap();

        let mut out = Output::create(Some(&path)).unwrap();
        out.write_all(b"partial").unwrap();
        drop(out);
        assert_eq!(std::fs::read(&path).unwrap(), b"old");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        let mut out = Output::create(Some(&path)).unwrap();
        out.write_all(b"new").unwrap();
        out.commit().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        let fresh = dir.path().join("fresh");
        drop(Output::create(Some(&fresh)).unwrap());
        assert!(!fresh.exists());
    }
}
