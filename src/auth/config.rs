use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Typed provider configuration document (§4.5, §6, §9): names the
/// registered provider `class` and a typed `kwargs` map of constructor
/// arguments read from YAML at the path named by the
/// `NIMBLETOOLS_AUTH_CONFIG` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub class: String,

    #[serde(default)]
    pub kwargs: BTreeMap<String, serde_json::Value>,
}

impl ProviderConfig {
    pub async fn from_path(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(Error::from)
            .map_err(|error| error.with_name("E_AUTH_CONFIG_READ"))?;
        serde_yml::from_str(&raw)
            .map_err(Error::from)
            .map_err(|error| error.with_name("E_AUTH_CONFIG_PARSE"))
    }
}
