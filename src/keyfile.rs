//! 密钥文件格式
//!
//! - 公钥文件: 4行, 依次为`n`, `e`, 签名`s`(均为小写十六进制)以及所有者身份字符串;
//! - 私钥文件: 2行, 依次为`n`, `d`(小写十六进制), unix下权限为`0600`;

use crate::encode::Base62;
use crate::error::KitError;
use cipher::rsa::{PrivateKey, PublicKey};
use num_bigint::BigUint;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
#[cfg(feature = "sec-zeroize")]
use zeroize::Zeroize;

/// 带有所有者签名的公钥
#[derive(Clone, Debug)]
pub struct PublicKeyFile {
    key: PublicKey,
    signature: BigUint,
    owner: String,
}

impl PublicKeyFile {
    pub fn new(key: PublicKey, signature: BigUint, owner: String) -> Self {
        Self {
            key,
            signature,
            owner,
        }
    }

    /// 以私钥对`owner`的62进制整数签名
    pub fn sign(key: PublicKey, sk: &PrivateKey, owner: &str) -> Result<Self, KitError> {
        let m = Base62::new().decode(owner)?;
        let signature = sk.sign(&m)?;
        Ok(Self::new(key, signature, owner.to_string()))
    }

    pub fn verify(&self) -> Result<(), KitError> {
        let m = Base62::new().decode(&self.owner)?;
        if self.key.verify(&m, &self.signature) {
            Ok(())
        } else {
            Err(KitError::SignatureMismatch(self.owner.clone()))
        }
    }

    pub fn key(&self) -> &PublicKey {
        &self.key
    }

    pub fn signature(&self) -> &BigUint {
        &self.signature
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn into_key(self) -> PublicKey {
        self.key
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), KitError> {
        writeln!(w, "{:x}", self.key.modules())?;
        writeln!(w, "{:x}", self.key.exponent())?;
        writeln!(w, "{:x}", self.signature)?;
        writeln!(w, "{}", self.owner)?;
        Ok(())
    }

    /// `name`仅用于错误信息
    pub fn read_from<R: BufRead>(r: &mut R, name: &str) -> Result<Self, KitError> {
        let mut lines = KeyLines::new(r, name);
        let n = lines.next_hex("modulus n")?;
        let e = lines.next_hex("exponent e")?;
        let signature = lines.next_hex("signature s")?;

        let owner = lines
            .next_line()?
            .map(str::to_string)
            .ok_or(KitError::MissingIdentity)?;
        if owner.is_empty() {
            return Err(KitError::MissingIdentity);
        }
        if owner.chars().any(char::is_whitespace) {
            return Err(lines.malformed("the owner identity contains whitespace"));
        }

        Ok(Self::new(PublicKey::new_uncheck(n, e), signature, owner))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), KitError> {
        let f = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut w = BufWriter::new(f);
        self.write_to(&mut w)?;
        w.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, KitError> {
        let path = path.as_ref();
        let mut r = BufReader::new(open_exist(path)?);
        Self::read_from(&mut r, &path.display().to_string())
    }
}

pub fn write_private_key<W: Write>(sk: &PrivateKey, w: &mut W) -> Result<(), KitError> {
    writeln!(w, "{:x}", sk.modules())?;
    writeln!(w, "{:x}", sk.exponent())?;
    Ok(())
}

pub fn read_private_key<R: BufRead>(r: &mut R, name: &str) -> Result<PrivateKey, KitError> {
    let mut lines = KeyLines::new(r, name);
    let n = lines.next_hex("modulus n")?;
    let d = lines.next_hex("exponent d")?;
    Ok(PrivateKey::new_uncheck(n, d))
}

/// 以`0600`权限写入私钥文件, 文件已存在时重新设置权限
pub fn save_private_key<P: AsRef<Path>>(sk: &PrivateKey, path: P) -> Result<(), KitError> {
    let f = create_private(path.as_ref())?;
    let mut w = BufWriter::new(f);
    write_private_key(sk, &mut w)?;
    w.flush()?;
    Ok(())
}

pub fn load_private_key<P: AsRef<Path>>(path: P) -> Result<PrivateKey, KitError> {
    let path = path.as_ref();
    let mut r = BufReader::new(open_exist(path)?);
    read_private_key(&mut r, &path.display().to_string())
}

fn open_exist(path: &Path) -> Result<File, KitError> {
    if !path.is_file() {
        return Err(KitError::PathNotExist(path.display().to_string()));
    }

    Ok(File::open(path)?)
}

fn create_private(path: &Path) -> std::io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }

    let f = opts.open(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        f.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(f)
}

struct KeyLines<'a, R> {
    r: &'a mut R,
    name: &'a str,
    buf: String,
}

impl<'a, R: BufRead> KeyLines<'a, R> {
    fn new(r: &'a mut R, name: &'a str) -> Self {
        Self {
            r,
            name,
            buf: String::with_capacity(128),
        }
    }

    fn malformed(&self, msg: &str) -> KitError {
        KitError::KeyFileMalformed {
            path: self.name.to_string(),
            msg: msg.to_string(),
        }
    }

    /// 返回的行借用自内部缓冲区, 不产生副本, 下次读取前清零
    fn next_line(&mut self) -> Result<Option<&str>, KitError> {
        #[cfg(feature = "sec-zeroize")]
        self.buf.zeroize();
        self.buf.clear();

        if self.r.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }

        Ok(Some(self.buf.trim()))
    }

    fn next_hex(&mut self, field: &str) -> Result<BigUint, KitError> {
        let val = self
            .next_line()?
            .map(|line| BigUint::parse_bytes(line.as_bytes(), 16));

        match val {
            Some(Some(x)) => Ok(x),
            Some(None) => Err(self.malformed(&format!("the {field} is not a hex number"))),
            None => Err(self.malformed(&format!("missing the {field}"))),
        }
    }
}

#[cfg(feature = "sec-zeroize")]
impl<R> Drop for KeyLines<'_, R> {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipher::SeededRand;

    fn key_pair() -> (PublicKey, PrivateKey) {
        let mut rng = SeededRand::new(404);
        PrivateKey::generate_key(128, 20, &mut rng)
            .unwrap()
            .into_parts()
    }

    #[test]
    fn public_key_file_roundtrip() {
        let (pk, sk) = key_pair();
        let pbfile = PublicKeyFile::sign(pk.clone(), &sk, "alice").unwrap();
        pbfile.verify().unwrap();

        let mut buf = Vec::new();
        pbfile.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], format!("{:x}", pk.modules()));
        assert_eq!(lines[3], "alice");

        let loaded = PublicKeyFile::read_from(&mut buf.as_slice(), "rsa.pub").unwrap();
        assert_eq!(loaded.key(), &pk);
        assert_eq!(loaded.signature(), pbfile.signature());
        assert_eq!(loaded.owner(), "alice");
        loaded.verify().unwrap();
    }

    #[test]
    fn tampered_owner_fails_verify() {
        let (pk, sk) = key_pair();
        let pbfile = PublicKeyFile::sign(pk.clone(), &sk, "alice").unwrap();
        let forged = PublicKeyFile::new(pk, pbfile.signature().clone(), "mallory".to_string());
        assert!(matches!(
            forged.verify(),
            Err(KitError::SignatureMismatch(_))
        ));
    }

    #[test]
    fn private_key_roundtrip() {
        let (_pk, sk) = key_pair();
        let mut buf = Vec::new();
        write_private_key(&sk, &mut buf).unwrap();
        assert_eq!(String::from_utf8_lossy(&buf).lines().count(), 2);

        let loaded = read_private_key(&mut buf.as_slice(), "rsa.priv").unwrap();
        assert_eq!(loaded.modules(), sk.modules());
        assert_eq!(loaded.exponent(), sk.exponent());
        assert!(loaded.factor().is_none());
    }

    #[test]
    fn malformed_files() {
        let cases: [&[u8]; 4] = [b"", b"abc\n", b"abc\nzz\n1\nalice\n", b"abc\n3\n1\n"];
        for (i, case) in cases.into_iter().enumerate() {
            let mut r = case;
            let e = PublicKeyFile::read_from(&mut r, "case").unwrap_err();
            match i {
                3 => assert!(matches!(e, KitError::MissingIdentity), "case {i}: {e}"),
                _ => assert!(
                    matches!(e, KitError::KeyFileMalformed { .. }),
                    "case {i}: {e}"
                ),
            }
        }

        let mut r: &[u8] = b"abc\n3\n1\nbad user\n";
        assert!(matches!(
            PublicKeyFile::read_from(&mut r, "case"),
            Err(KitError::KeyFileMalformed { .. })
        ));

        let mut r: &[u8] = b"abc\n";
        assert!(matches!(
            read_private_key(&mut r, "case"),
            Err(KitError::KeyFileMalformed { .. })
        ));

        // 私钥行的内容不出现在错误信息中
        let mut r: &[u8] = b"abc\n12secret34\n";
        let e = read_private_key(&mut r, "case").unwrap_err();
        assert!(matches!(e, KitError::KeyFileMalformed { .. }));
        assert!(!e.to_string().contains("12secret34"), "{e}");
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let (pbpath, pvpath) = (dir.path().join("rsa.pub"), dir.path().join("rsa.priv"));
        let (pk, sk) = key_pair();

        PublicKeyFile::sign(pk.clone(), &sk, "bob")
            .unwrap()
            .save(&pbpath)
            .unwrap();
        save_private_key(&sk, &pvpath).unwrap();

        let pbfile = PublicKeyFile::load(&pbpath).unwrap();
        pbfile.verify().unwrap();
        assert_eq!(pbfile.key(), &pk);
        assert_eq!(load_private_key(&pvpath).unwrap().exponent(), sk.exponent());

        assert!(matches!(
            load_private_key(dir.path().join("missing")),
            Err(KitError::PathNotExist(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn private_key_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let pvpath = dir.path().join("rsa.priv");
        std::fs::write(&pvpath, b"old").unwrap();
        std::fs::set_permissions(&pvpath, std::fs::Permissions::from_mode(0o644)).unwrap();

        let (_pk, sk) = key_pair();
        save_private_key(&sk, &pvpath).unwrap();
        let mode = std::fs::metadata(&pvpath).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
