use crate::config::credentials::ServiceAccountKey;
use crate::core::{CellRef, CellValue, SheetCellWrite, SheetStore};
use crate::utils::error::{SyncError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::{Mutex, OnceCell};
use url::Url;

pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetRef {
    Id(String),
    Name(String),
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + ChronoDuration::seconds(60) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

// 以 service account 換取 access token，試算表可用 id 或名稱（經 Drive 查詢）指定
pub struct GoogleSheetsClient {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    api_base: Url,
    drive_base: Url,
    worksheet: String,
    spreadsheet: SpreadsheetRef,
    spreadsheet_id: OnceCell<String>,
    token: Mutex<Option<AccessToken>>,
}

impl GoogleSheetsClient {
    pub fn new(
        key: ServiceAccountKey,
        spreadsheet: SpreadsheetRef,
        worksheet: impl Into<String>,
        api_base: &str,
        drive_base: &str,
    ) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let parse_base = |field: &str, value: &str| {
            Url::parse(value).map_err(|e| SyncError::InvalidConfigValueError {
                field: field.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            })
        };

        Ok(Self {
            client: Client::new(),
            encoding_key,
            api_base: parse_base("sheet.api_base_url", api_base)?,
            drive_base: parse_base("sheet.drive_base_url", drive_base)?,
            worksheet: worksheet.into(),
            spreadsheet,
            spreadsheet_id: OnceCell::new(),
            token: Mutex::new(None),
            key,
        })
    }

    /// 工作表名稱加上引號，內含的單引號需重複
    pub fn qualified_range(&self, a1: &str) -> String {
        format!("'{}'!{}", self.worksheet.replace('\'', "''"), a1)
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + ChronoDuration::hours(1)).timestamp(),
        };

        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        tracing::debug!("Requesting access token for {}", self.key.client_email);
        let assertion = self.signed_assertion(now)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let token: TokenResponse = check(response).await?.json().await?;

        let value = token.access_token.clone();
        *cached = Some(AccessToken {
            value: token.access_token,
            expires_at: now + ChronoDuration::seconds(token.expires_in),
        });
        Ok(value)
    }

    async fn spreadsheet_id(&self) -> Result<&str> {
        let id = self
            .spreadsheet_id
            .get_or_try_init(|| async {
                match &self.spreadsheet {
                    SpreadsheetRef::Id(id) => Ok(id.clone()),
                    SpreadsheetRef::Name(name) => self.find_spreadsheet(name).await,
                }
            })
            .await?;
        Ok(id.as_str())
    }

    async fn find_spreadsheet(&self, name: &str) -> Result<String> {
        let token = self.access_token().await?;
        let query = format!(
            "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'")
        );

        let mut url = self.drive_base.clone();
        extend_path(&mut url, &["drive", "v3", "files"])?;
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("fields", "files(id,name)")
            .append_pair("supportsAllDrives", "true")
            .append_pair("includeItemsFromAllDrives", "true");

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let list: DriveFileList = check(response).await?.json().await?;

        let file = list.files.into_iter().next().ok_or_else(|| {
            SyncError::config(format!(
                "Spreadsheet '{}' not found or not shared with {}",
                name, self.key.client_email
            ))
        })?;
        tracing::info!("📄 Resolved spreadsheet '{}' to id {}", name, file.id);
        Ok(file.id)
    }

    async fn values_url(&self, last_segment: &str) -> Result<Url> {
        let id = self.spreadsheet_id().await?;
        let mut url = self.api_base.clone();
        extend_path(&mut url, &["v4", "spreadsheets", id, last_segment])?;
        Ok(url)
    }

    async fn values_range_url(&self, range: &str) -> Result<Url> {
        let id = self.spreadsheet_id().await?;
        let mut url = self.api_base.clone();
        extend_path(&mut url, &["v4", "spreadsheets", id, "values", range])?;
        Ok(url)
    }
}

fn extend_path(url: &mut Url, segments: &[&str]) -> Result<()> {
    let display = url.to_string();
    url.path_segments_mut()
        .map_err(|_| SyncError::config(format!("Base URL cannot carry a path: {}", display)))?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}

/// 非 2xx 回應轉為 SheetApiError，保留狀態碼供重試判斷
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(SyncError::SheetApiError {
        status: status.as_u16(),
        message,
    })
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn read_range(&self, from: CellRef, to: CellRef) -> Result<Vec<String>> {
        let range = self.qualified_range(&format!("{}:{}", from, to));
        let url = self.values_range_url(&range).await?;
        let token = self.access_token().await?;

        tracing::debug!("Reading range {}", range);
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let values: ValueRange = check(response).await?.json().await?;

        Ok(values
            .values
            .iter()
            .map(|row| row.first().map(cell_text).unwrap_or_default())
            .collect())
    }

    async fn write_cell(&self, cell: CellRef, value: &CellValue) -> Result<()> {
        let range = self.qualified_range(&cell.to_string());
        let mut url = self.values_range_url(&range).await?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);
        let token = self.access_token().await?;

        tracing::debug!("Writing {} = {}", range, value);
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [[value]],
        });
        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn write_batch(&self, writes: &[SheetCellWrite]) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        let url = self.values_url("values:batchUpdate").await?;
        let token = self.access_token().await?;
        let data: Vec<serde_json::Value> = writes
            .iter()
            .map(|w| {
                json!({
                    "range": self.qualified_range(&w.cell.to_string()),
                    "values": [[w.value]],
                })
            })
            .collect();

        tracing::debug!("Batch writing {} cells", data.len());
        let body = json!({
            "valueInputOption": VALUE_INPUT_OPTION,
            "data": data,
        });
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
