use crate::core::planner::SheetLayout;
use crate::domain::model::{column_index, CellRef, MAX_ROWS};
use crate::utils::error::{SyncError, Result};
use crate::utils::retry::RetryPolicy;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str = "https://giavang.org/trong-nuoc/mi-hong/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const DEFAULT_SHEETS_API: &str = "https://sheets.googleapis.com";
pub const DEFAULT_DRIVE_API: &str = "https://www.googleapis.com";
pub const DEFAULT_CREDENTIALS_ENV: &str = "GOOGLE_SHEETS_CREDENTIALS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SinkKind {
    #[default]
    Sheet,
    File,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub sink: SinkConfig,
    pub source: SourceConfig,
    pub sheet: SheetConfig,
    pub file: FileConfig,
    pub retry: RetryConfig,
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub user_agent: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: Some(30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// 有設定時直接使用，否則以 spreadsheet_name 透過 Drive 查詢
    pub spreadsheet_id: Option<String>,
    pub spreadsheet_name: String,
    pub worksheet: String,
    pub type_column: String,
    pub price_column: String,
    pub start_row: u32,
    pub max_row: u32,
    pub timestamp_cell: String,
    pub summary_anchor: String,
    pub batch_writes: bool,
    pub api_base_url: String,
    pub drive_base_url: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            spreadsheet_name: "TIỀN HỤI".to_string(),
            worksheet: "Trang tính1".to_string(),
            type_column: "G".to_string(),
            price_column: "H".to_string(),
            start_row: 36,
            max_row: 500,
            timestamp_cell: "H35".to_string(),
            summary_anchor: "J35".to_string(),
            batch_writes: true,
            api_base_url: DEFAULT_SHEETS_API.to_string(),
            drive_base_url: DEFAULT_DRIVE_API.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub path: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: "gold_prices.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub env_var: String,
    pub file: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_CREDENTIALS_ENV.to_string(),
            file: "credentials.json".to_string(),
        }
    }
}

impl SyncConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${SPREADSHEET_ID})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").unwrap_or_else(|e| panic!("invalid env pattern: {}", e))
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn layout(&self) -> Result<SheetLayout> {
        let column = |field: &str, letters: &str| {
            column_index(letters).ok_or_else(|| SyncError::InvalidConfigValueError {
                field: field.to_string(),
                value: letters.to_string(),
                reason: "Expected a column letter such as 'G'".to_string(),
            })
        };
        let cell = |field: &str, a1: &str| {
            CellRef::parse(a1).ok_or_else(|| SyncError::InvalidConfigValueError {
                field: field.to_string(),
                value: a1.to_string(),
                reason: "Expected an A1 cell reference such as 'H35'".to_string(),
            })
        };

        Ok(SheetLayout {
            type_column: column("sheet.type_column", &self.sheet.type_column)?,
            price_column: column("sheet.price_column", &self.sheet.price_column)?,
            start_row: self.sheet.start_row,
            max_row: self.sheet.max_row,
            timestamp_cell: cell("sheet.timestamp_cell", &self.sheet.timestamp_cell)?,
            summary_anchor: cell("sheet.summary_anchor", &self.sheet.summary_anchor)?,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.base_delay_ms),
        )
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.url", &self.source.url)?;
        validation::validate_non_empty_string("source.user_agent", &self.source.user_agent)?;
        validation::validate_range("retry.max_attempts", self.retry.max_attempts, 1, 10)?;

        match self.sink.kind {
            SinkKind::File => {
                validation::validate_path("file.path", &self.file.path)?;
            }
            SinkKind::Sheet => {
                let layout = self.layout()?;
                validation::validate_positive_number(
                    "sheet.start_row",
                    self.sheet.start_row as usize,
                    1,
                )?;
                validation::validate_range(
                    "sheet.max_row",
                    layout.max_row,
                    layout.start_row,
                    MAX_ROWS,
                )?;
                validation::validate_non_empty_string("sheet.worksheet", &self.sheet.worksheet)?;
                if self.sheet.spreadsheet_id.is_none() {
                    validation::validate_non_empty_string(
                        "sheet.spreadsheet_name",
                        &self.sheet.spreadsheet_name,
                    )?;
                }
                validation::validate_url("sheet.api_base_url", &self.sheet.api_base_url)?;
                validation::validate_url("sheet.drive_base_url", &self.sheet.drive_base_url)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_file() {
        let config = SyncConfig::from_toml_str("").unwrap();

        assert_eq!(config.sink.kind, SinkKind::Sheet);
        assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(config.sheet.worksheet, "Trang tính1");
        assert_eq!(config.layout().unwrap(), SheetLayout::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
[sink]
kind = "file"

[source]
url = "https://example.com/gold"

[file]
path = "./out/prices.txt"

[retry]
max_attempts = 3
base_delay_ms = 250
"#;

        let config = SyncConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.sink.kind, SinkKind::File);
        assert_eq!(config.source.url, "https://example.com/gold");
        assert_eq!(config.source.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.file.path, "./out/prices.txt");
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(3, Duration::from_millis(250))
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GOLD_SYNC_TEST_SPREADSHEET", "sheet-id-123");

        let toml_content = r#"
[sheet]
spreadsheet_id = "${GOLD_SYNC_TEST_SPREADSHEET}"
worksheet = "${GOLD_SYNC_TEST_UNSET_VAR}"
"#;

        let config = SyncConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.sheet.spreadsheet_id.as_deref(), Some("sheet-id-123"));
        assert_eq!(config.sheet.worksheet, "${GOLD_SYNC_TEST_UNSET_VAR}");

        std::env::remove_var("GOLD_SYNC_TEST_SPREADSHEET");
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let toml_content = r#"
[sheet]
type_column = "7"
"#;
        let config = SyncConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[sheet]
start_row = 100
max_row = 50
"#;
        let config = SyncConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_cells_rejected() {
        let config =
            SyncConfig::from_toml_str("[sheet]\nsummary_anchor = \"J4294967295\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(SyncError::InvalidConfigValueError { ref field, .. }) if field == "sheet.summary_anchor"
        ));

        let config = SyncConfig::from_toml_str("[sheet]\nmax_row = 20000000\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let config = SyncConfig::from_toml_str("[source]\nurl = \"ftp://example.com\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[sheet]\nspreadsheet_name = \"Gold\"\nmax_row = 200\n")
            .unwrap();

        let config = SyncConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.sheet.spreadsheet_name, "Gold");
        assert_eq!(config.layout().unwrap().max_row, 200);
    }
}
