use anyhow::{Context, bail};

use super::structure::{ChatBotConfigInner, ChatBotConfigTOML};
use std::{ops::Deref, path::PathBuf};

#[derive(Debug, Clone)]
pub struct ChatBotConfig {
    pub path: PathBuf,
    cached: ChatBotConfigTOML,
    created: bool,
}

impl ChatBotConfig {
    /// Reads the config file, writing out the defaults first if it doesn't exist yet.
    pub fn read(path: PathBuf) -> Result<Self, anyhow::Error> {
        let path = match path.is_dir() {
            true => path.join("config.toml"),
            false => path,
        };

        if !path.exists() {
            return Self::new(path);
        }

        if !path.is_file() {
            bail!(
                "Given path exists and is not a file... either change the path or delete the file."
            );
        }

        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let cached = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        Ok(Self {
            path,
            cached,
            created: false,
        })
    }

    fn new(path: PathBuf) -> Result<Self, anyhow::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let config = Self {
            path,
            cached: ChatBotConfigTOML::default(),
            created: true,
        };

        config.save()?;

        Ok(config)
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        std::fs::write(&self.path, toml::to_string(&self.cached)?)
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        Ok(())
    }

    /// Whether this read wrote the defaults out because no file existed.
    pub fn created(&self) -> bool {
        self.created
    }
}

impl Deref for ChatBotConfig {
    type Target = ChatBotConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.cached.config
    }
}

impl PartialEq for ChatBotConfig {
    fn eq(&self, other: &Self) -> bool {
        self.cached.config == other.cached.config
    }
}
