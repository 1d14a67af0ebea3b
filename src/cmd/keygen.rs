use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use cipher::rsa::PrivateKey;
use cipher::SeededRand;
use clap::{value_parser, Parser};
use log::{debug, info};
use utils::WitnessRange;

use crate::cmd::{print_stat, RsaConfig};
use crate::error::KitError;
use crate::keyfile::{save_private_key, PublicKeyFile};

#[derive(Parser, Clone, Debug)]
#[command(name = "keygen", version = env!("RSAKIT_VERSION_INFO"))]
#[command(about = "Generates an RSA public/private key pair")]
pub struct KeygenArgs {
    #[arg(short, long, value_parser = value_parser!(u64).range(16..))]
    #[arg(help = "minimum bits needed for the public modulus n [default: 256]")]
    pub bits: Option<u64>,

    #[arg(short, long, value_parser = value_parser!(u64).range(1..))]
    #[arg(help = "Miller-Rabin iterations for testing primes [default: 50]")]
    pub iters: Option<u64>,

    #[arg(short = 'n', long)]
    #[arg(help = "public key file [default: rsa.pub]")]
    pub pbfile: Option<PathBuf>,

    #[arg(short = 'd', long)]
    #[arg(help = "private key file [default: rsa.priv]")]
    pub pvfile: Option<PathBuf>,

    #[arg(short, long, help = "random seed [default: seconds since the UNIX epoch]")]
    pub seed: Option<u64>,

    #[arg(short, long, help = "owner identity to sign [default: $USER]")]
    pub user: Option<String>,

    #[arg(short, long, help = "display verbose program output")]
    pub verbose: bool,

    #[arg(long, help = "draw Miller-Rabin witnesses from [2, n] instead of [2, n-2]")]
    pub inclusive_witness: bool,

    #[arg(short, long, help = "json config file")]
    pub config: Option<PathBuf>,
}

impl KeygenArgs {
    pub fn exe(self) -> anyhow::Result<()> {
        let cfg = RsaConfig::config_with_file(self.config.as_deref())?;

        let bits = self.bits.map(|x| x as usize).unwrap_or(cfg.bits);
        let iters = self.iters.map(|x| x as usize).unwrap_or(cfg.iters);
        let range = if self.inclusive_witness {
            WitnessRange::Inclusive
        } else {
            cfg.witness_range()
        };
        let pbfile = self.pbfile.unwrap_or_else(|| cfg.pub_file.clone());
        let pvfile = self.pvfile.unwrap_or_else(|| cfg.priv_file.clone());

        let user = match self.user {
            Some(u) => u,
            None => std::env::var("USER").map_err(|_| KitError::MissingIdentity)?,
        };

        let mut rng = match self.seed {
            Some(seed) => SeededRand::new(seed),
            None => SeededRand::from_time(),
        };
        debug!(
            "keygen: bits={bits}, iters={iters}, witness={range:?}, seed={}",
            rng.seed()
        );

        let (pk, sk) = PrivateKey::generate_key_with(bits, iters, range, &mut rng)
            .with_context(|| format!("generate the {bits}-bits rsa key failed"))?
            .into_parts();

        let pbkey = PublicKeyFile::sign(pk, &sk, &user)
            .with_context(|| format!("sign the owner identity `{user}` failed"))?;

        pbkey
            .save(&pbfile)
            .with_context(|| format!("write public key to `{}` failed", pbfile.display()))?;
        save_private_key(&sk, &pvfile)
            .with_context(|| format!("write private key to `{}` failed", pvfile.display()))?;
        info!(
            "keygen: saved `{}` and `{}`",
            pbfile.display(),
            pvfile.display()
        );

        if self.verbose {
            let mut w = std::io::stderr().lock();
            writeln!(w, "user = {user}")?;
            print_stat(&mut w, "s", pbkey.signature())?;
            if let Some(factor) = sk.factor() {
                print_stat(&mut w, "p", factor.p())?;
                print_stat(&mut w, "q", factor.q())?;
            }
            print_stat(&mut w, "n", pbkey.key().modules())?;
            print_stat(&mut w, "e", pbkey.key().exponent())?;
            print_stat(&mut w, "d", sk.exponent())?;
        }

        Ok(())
    }
}
