//! Adapter user configuration
//!
//! Loaded from `salto.yaml`, one section per adapter:
//!
//! ```yaml
//! adapters:
//!   confluence:
//!     fetch:
//!       include_types: [space, page, template]
//!   netsuite:
//!     deploy:
//!       change_validators:
//!         restrictions: false
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Default name of the workspace configuration file
pub const CONFIG_FILE_NAME: &str = "salto.yaml";

/// Map from change validator name to whether it runs
pub type ValidatorsActivationConfig = HashMap<String, bool>;

/// Workspace configuration holding every adapter's user config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Per-adapter configuration
    #[serde(default)]
    pub adapters: HashMap<String, UserConfig>,
}

impl WorkspaceConfig {
    /// Load configuration from a directory or a `salto.yaml` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILE_NAME)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            return Err(Error::ConfigNotFound {
                path: config_path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Configuration of one adapter, defaults when absent
    pub fn adapter(&self, name: &str) -> UserConfig {
        self.adapters.get(name).cloned().unwrap_or_default()
    }
}

/// Configuration of a single adapter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Fetch settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Deploy settings
    #[serde(default)]
    pub deploy: DeployConfig,
}

/// Fetch settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Types to fetch; all types when unset
    #[serde(default)]
    pub include_types: Option<Vec<String>>,
}

impl FetchConfig {
    /// Whether instances of `type_name` are fetched
    pub fn is_type_included(&self, type_name: &str) -> bool {
        self.include_types
            .as_ref()
            .is_none_or(|types| types.iter().any(|t| t == type_name))
    }
}

/// Deploy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Whether the adapter deploys at all
    #[serde(default = "default_supported")]
    pub supported: bool,

    /// Validators to switch on or off by name
    #[serde(default)]
    pub change_validators: ValidatorsActivationConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            supported: default_supported(),
            change_validators: ValidatorsActivationConfig::new(),
        }
    }
}

fn default_supported() -> bool {
    true
}
