use std::path::PathBuf;

use anyhow::Context;
use cipher::rsa::RsaDecryptStream;
use cipher::StreamDecrypt;
use clap::Parser;
use log::debug;

use crate::cmd::{open_input, print_stat, Output, RsaConfig};
use crate::keyfile::load_private_key;

#[derive(Parser, Clone, Debug)]
#[command(name = "decrypt", version = env!("RSAKIT_VERSION_INFO"))]
#[command(about = "Decrypts data using RSA decryption, the input is produced by the encrypt program")]
pub struct DecryptArgs {
    #[arg(short, long, help = "input file of data to decrypt [default: stdin]")]
    pub infile: Option<PathBuf>,

    #[arg(short, long, help = "output file for decrypted data [default: stdout]")]
    pub outfile: Option<PathBuf>,

    #[arg(short = 'n', long, help = "private key file [default: rsa.priv]")]
    pub pvfile: Option<PathBuf>,

    #[arg(short, long, help = "display verbose program output")]
    pub verbose: bool,

    #[arg(short, long, help = "json config file")]
    pub config: Option<PathBuf>,
}

impl DecryptArgs {
    pub fn exe(self) -> anyhow::Result<()> {
        let cfg = RsaConfig::config_with_file(self.config.as_deref())?;
        let pvfile = self.pvfile.unwrap_or_else(|| cfg.priv_file.clone());

        let sk = load_private_key(&pvfile)
            .with_context(|| format!("read private key `{}` failed", pvfile.display()))?;

        if self.verbose {
            let mut w = std::io::stderr().lock();
            print_stat(&mut w, "n", sk.modules())?;
            print_stat(&mut w, "d", sk.exponent())?;
        }

        let dec = RsaDecryptStream::new(sk)?;
        let mut input = open_input(self.infile.as_deref())?;
        let mut output = Output::create(self.outfile.as_deref())?;

        let (rlen, wlen) = dec.stream_decrypt(&mut input, &mut output)?;
        output.commit()?;
        debug!("decrypt: read {rlen} bytes, write {wlen} bytes");

        Ok(())
    }
}
