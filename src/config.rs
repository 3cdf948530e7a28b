use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expand::{DEFAULT_PRACTICE_MARKERS, Expander};
use crate::schedule::InputFormat;

pub const CONFIG_FILE: &str = "t2c.toml";
pub const ENV_PREFIX: &str = "T2C_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub bind_address: String,
    pub log_level: String,
    pub bom: bool,
    pub practice_markers: Vec<String>,
    pub input: InputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".into(),
            log_level: "info".into(),
            bom: true,
            practice_markers: DEFAULT_PRACTICE_MARKERS.map(String::from).to_vec(),
            input: InputFormat::default(),
        }
    }
}

impl Config {
    /// Defaults, then `t2c.toml`, then `T2C_` environment variables. Nested
    /// keys use a double underscore, e.g. `T2C_INPUT__COLUMNS__ROOM`.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }

    pub fn expander(&self) -> Expander {
        Expander::new(self.practice_markers.iter().cloned())
    }
}
