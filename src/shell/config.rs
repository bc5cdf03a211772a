use anyhow::Result;
use xdg::BaseDirectories;

use std::path::PathBuf;

pub const PROMPT: &str = ": ";
pub const MAX_LINE_LEN: usize = 2048;
pub const MAX_ARGS: usize = 512;
pub const NULL_DEVICE: &str = "/dev/null";

// Filter directive for diagnostics, e.g. `SMALLSH_LOG=debug`.
pub const LOG_ENV: &str = "SMALLSH_LOG";

pub struct Config {
    pub prompt: String,
    pub null_device: PathBuf,
    pub init_script: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Config> {
        let base_dirs = BaseDirectories::with_prefix("smallsh")?;

        Ok(Config {
            init_script: base_dirs.find_config_file("init"),
            ..Config::default()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: PROMPT.to_string(),
            null_device: PathBuf::from(NULL_DEVICE),
            init_script: None,
        }
    }
}
