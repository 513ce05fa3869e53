use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{fs, io, path::PathBuf};

#[derive(Deserialize, Serialize)]
pub struct Config {
    pub model: String,
    pub uri: String,
    pub system: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.1
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: "myllama".into(),
            uri: "http://localhost:11434".into(),
            system: None,
            temperature: default_temperature(),
        }
    }
}

fn config_dir() -> io::Result<PathBuf> {
    let base = BaseDirs::new()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Could not find home directory"))?;
    let dir = base.config_dir().join("hinter");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> io::Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Log file lives next to the config so nothing is ever written to the
/// raw-mode terminal.
pub fn log_path() -> io::Result<PathBuf> {
    Ok(config_dir()?.join("hinter.log"))
}

pub fn load_config() -> io::Result<Config> {
    let path = config_path()?;
    if path.exists() {
        let s = fs::read_to_string(&path)?;
        let cfg = toml::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(cfg)
    } else {
        let cfg = Config::default();
        let toml = toml::to_string_pretty(&cfg)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&path, toml)?;
        Ok(cfg)
    }
}
