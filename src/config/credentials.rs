use crate::config::toml_config::CredentialsConfig;
use crate::utils::error::{SyncError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Google service account 金鑰 JSON 中用得到的欄位
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str, source: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            SyncError::credentials(format!("{} does not hold a valid service account key: {}", source, e))
        })
    }
}

/// 先讀環境變數，再讀本機檔案；兩者皆無時回傳錯誤
pub fn resolve(config: &CredentialsConfig) -> Result<ServiceAccountKey> {
    resolve_from(std::env::var(&config.env_var).ok(), &config.env_var, &config.file)
}

fn resolve_from(env_value: Option<String>, env_var: &str, file: &str) -> Result<ServiceAccountKey> {
    if let Some(json) = env_value.filter(|v| !v.trim().is_empty()) {
        tracing::debug!("Using credentials from environment variable {}", env_var);
        return ServiceAccountKey::from_json(&json, &format!("environment variable {}", env_var));
    }

    let path = Path::new(file);
    if path.exists() {
        tracing::debug!("Using credentials from file {}", file);
        let json = std::fs::read_to_string(path)?;
        return ServiceAccountKey::from_json(&json, &format!("file {}", file));
    }

    Err(SyncError::credentials(format!(
        "neither environment variable {} nor file {} is available",
        env_var, file
    )))
}
