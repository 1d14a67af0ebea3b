use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use cipher::rsa::RsaEncryptStream;
use cipher::StreamEncrypt;
use clap::Parser;
use log::debug;

use crate::cmd::{open_input, print_stat, Output, RsaConfig};
use crate::keyfile::PublicKeyFile;

#[derive(Parser, Clone, Debug)]
#[command(name = "encrypt", version = env!("RSAKIT_VERSION_INFO"))]
#[command(about = "Encrypts data using RSA encryption, the result is decrypted by the decrypt program")]
pub struct EncryptArgs {
    #[arg(short, long, help = "input file of data to encrypt [default: stdin]")]
    pub infile: Option<PathBuf>,

    #[arg(short, long, help = "output file for encrypted data [default: stdout]")]
    pub outfile: Option<PathBuf>,

    #[arg(short = 'n', long, help = "public key file [default: rsa.pub]")]
    pub pbfile: Option<PathBuf>,

    #[arg(short, long, help = "display verbose program output")]
    pub verbose: bool,

    #[arg(short, long, help = "json config file")]
    pub config: Option<PathBuf>,
}

impl EncryptArgs {
    pub fn exe(self) -> anyhow::Result<()> {
        let cfg = RsaConfig::config_with_file(self.config.as_deref())?;
        let pbfile = self.pbfile.unwrap_or_else(|| cfg.pub_file.clone());

        let pbkey = PublicKeyFile::load(&pbfile)
            .with_context(|| format!("read public key `{}` failed", pbfile.display()))?;

        if self.verbose {
            let mut w = std::io::stderr().lock();
            writeln!(w, "user = {}", pbkey.owner())?;
            print_stat(&mut w, "s", pbkey.signature())?;
            print_stat(&mut w, "n", pbkey.key().modules())?;
            print_stat(&mut w, "e", pbkey.key().exponent())?;
        }

        pbkey.verify()?;

        let enc = RsaEncryptStream::new(pbkey.into_key())?;
        let mut input = open_input(self.infile.as_deref())?;
        let mut output = Output::create(self.outfile.as_deref())?;

        let (rlen, wlen) = enc.stream_encrypt(&mut input, &mut output)?;
        output.commit()?;
        debug!("encrypt: read {rlen} bytes, write {wlen} bytes");

        Ok(())
    }
}
