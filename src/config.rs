use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Runtime configuration for vetclinic
#[derive(Debug, Clone, Serialize)]
pub struct VetclinicConfig {
    /// Path to the directory holding vetclinic's database file
    pub data_dir: String,
}

/// File name of the clinic database inside the data directory
pub const DATABASE_FILE_NAME: &str = "vetclinic.sqlite3";

const EMPTY_CONFIG: &str = r#"### vetclinic configuration file

### directory for the clinic database file
# data_dir = "~/.vetclinic"
"#;

impl Default for VetclinicConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.vetclinic", home_dir),
        }
    }
}

impl VetclinicConfig {
    /// Create and initialize a new configuration
    ///
    /// Reads the TOML file at `path` if given, otherwise
    /// `$HOME/.vetclinic/vetclinic.toml` (created with a commented template
    /// when missing). Values can be overridden with `VETCLINIC_*` environment
    /// variables, e.g. `VETCLINIC_DATA_DIR=/tmp/clinic vetclinic`.
    pub fn new(path: &Option<String>) -> Result<VetclinicConfig> {
        let mut builder = Config::builder();

        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        let vetclinic_dir = format!("{}/.vetclinic", home_dir.as_str());

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(vetclinic_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create vetclinic directory: {}", e))?;
                let p = format!("{}/vetclinic.toml", vetclinic_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("VETCLINIC"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let data_dir = match config.get("data_dir") {
            Some(p) => p.to_string(),
            None => {
                std::fs::create_dir_all(vetclinic_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create data directory: {}", e))?;
                vetclinic_dir
            }
        };

        Ok(VetclinicConfig { data_dir })
    }

    /// Full path of the clinic database file inside the data directory
    pub fn database_path(&self) -> String {
        format!("{}/{}", self.data_dir.trim_end_matches('/'), DATABASE_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path() {
        let config = VetclinicConfig {
            data_dir: "/tmp/clinic/".to_string(),
        };
        assert_eq!(config.database_path(), "/tmp/clinic/vetclinic.sqlite3");

        let config = VetclinicConfig {
            data_dir: "/tmp/clinic".to_string(),
        };
        assert_eq!(config.database_path(), "/tmp/clinic/vetclinic.sqlite3");
    }

    #[test]
    fn test_default_points_under_home() {
        let config = VetclinicConfig::default();
        assert!(config.data_dir.ends_with(".vetclinic"));
    }
}
