use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use utils::WitnessRange;

/// 依次叠加: 默认值, 可选的json配置文件, 前缀为`RSAKIT`的环境变量(如`RSAKIT_BITS=512`).
///
/// keygen, encrypt, decrypt均可用`-c`指定json配置文件.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct RsaConfig {
    // public modulus bits
    pub bits: usize,

    // Miller-Rabin iterations
    pub iters: usize,

    pub pub_file: PathBuf,

    pub priv_file: PathBuf,

    // draw witnesses from [2, n] instead of [2, n-2]
    pub inclusive_witness: bool,
}

impl Default for RsaConfig {
    fn default() -> Self {
        Self {
            bits: 256,
            iters: 50,
            pub_file: PathBuf::from("rsa.pub"),
            priv_file: PathBuf::from("rsa.priv"),
            inclusive_witness: false,
        }
    }
}

impl RsaConfig {
    pub fn config() -> Result<&'static Self, ConfigError> {
        Self::config_with_file(None)
    }

    /// 首次调用时加载, 之后的调用忽略`f`
    pub fn config_with_file(f: Option<&Path>) -> Result<&'static Self, ConfigError> {
        static CONFIG: OnceLock<RsaConfig> = OnceLock::new();

        if let Some(c) = CONFIG.get() {
            return Ok(c);
        }

        let c = Self::load(f)?;
        Ok(CONFIG.get_or_init(|| c))
    }

    pub fn load(f: Option<&Path>) -> Result<Self, ConfigError> {
        let default_config = Config::try_from(&RsaConfig::default())?;

        let mut config = Config::builder().add_source(default_config);

        if let Some(f) = f {
            config = config.add_source(config::File::from(f).required(true));
        }

        let config = config
            .add_source(
                config::Environment::with_prefix("RSAKIT")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .separator("__"),
            )
            .build()?;

        let rsaconfig: RsaConfig = config.try_deserialize()?;
        log::trace!("{:?}", rsaconfig);

        Ok(rsaconfig)
    }

    pub fn witness_range(&self) -> WitnessRange {
        if self.inclusive_witness {
            WitnessRange::Inclusive
        } else {
            WitnessRange::Strict
        }
    }
}
