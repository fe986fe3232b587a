//! Remote endpoint client for push/pull batches.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{
    DailyDescription, EmployeeId, EmployeeProfile, MileageEntry, Receipt, SyncRecord,
};

/// A batch of locally-changed records, keyed by record type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushBatch {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub daily_descriptions: Vec<DailyDescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mileage_entries: Vec<MileageEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receipts: Vec<Receipt>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub employee_profiles: Vec<EmployeeProfile>,
}

impl PushBatch {
    /// Group a flat record list into a typed batch
    #[must_use]
    pub fn from_records(records: &[SyncRecord]) -> Self {
        let mut batch = Self::default();
        for record in records {
            match record.clone() {
                SyncRecord::DailyDescription(r) => batch.daily_descriptions.push(r),
                SyncRecord::MileageEntry(r) => batch.mileage_entries.push(r),
                SyncRecord::Receipt(r) => batch.receipts.push(r),
                SyncRecord::EmployeeProfile(r) => batch.employee_profiles.push(r),
            }
        }
        batch
    }

    /// Total record count across all types
    #[must_use]
    pub fn len(&self) -> usize {
        self.daily_descriptions.len()
            + self.mileage_entries.len()
            + self.receipts.len()
            + self.employee_profiles.len()
    }

    /// True when the batch carries no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Acknowledgement of a successfully transmitted batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushAck {
    /// Number of records the backend accepted
    pub accepted: usize,
}

/// Remote records newer than the client's last-known state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullResponse {
    /// Records to merge into the local store
    pub records: Vec<SyncRecord>,
    /// Server clock at response time (Unix ms), used as the next pull cursor
    pub server_time: i64,
}

/// Network seam between the sync coordinator and the backend.
///
/// Implementations must treat a batch as one unit: a failed push means no
/// record of the batch was committed remotely.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Push a batch of locally-changed records
    async fn push_batch(&self, batch: &PushBatch) -> Result<PushAck>;

    /// Pull records changed since the given cursor (all records when `None`)
    async fn pull_changes(
        &self,
        employee_id: EmployeeId,
        since: Option<i64>,
    ) -> Result<PullResponse>;
}

/// HTTP implementation of [`RemoteClient`]
#[derive(Clone)]
pub struct HttpRemoteClient {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpRemoteClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpRemoteClient")
            .field("base_url", &self.base_url)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish_non_exhaustive()
    }
}

impl HttpRemoteClient {
    /// Create a client for the given backend base URL
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            auth_token,
            client: reqwest::Client::builder()
                .build()
                .map_err(|error| Error::Remote(error.to_string()))?,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_error(response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Error::Remote(parse_api_error(status, &body))
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn push_batch(&self, batch: &PushBatch) -> Result<PushAck> {
        let url = format!("{}/v1/sync/push", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .json(batch)
            .send()
            .await
            .map_err(|error| Error::Remote(error.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let payload = response
            .json::<PushResponseBody>()
            .await
            .map_err(|error| Error::Remote(error.to_string()))?;

        if payload.success {
            Ok(PushAck {
                accepted: payload.accepted.unwrap_or(batch.len()),
            })
        } else {
            Err(Error::Remote(
                payload
                    .error
                    .unwrap_or_else(|| "backend rejected batch".to_string()),
            ))
        }
    }

    async fn pull_changes(
        &self,
        employee_id: EmployeeId,
        since: Option<i64>,
    ) -> Result<PullResponse> {
        let url = format!("{}/v1/sync/pull", self.base_url);
        let mut request = self
            .authorize(self.client.get(&url))
            .query(&[("employee", employee_id.as_str())]);
        if let Some(since) = since {
            request = request.query(&[("since", since.to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|error| Error::Remote(error.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        response
            .json::<PullResponse>()
            .await
            .map_err(|error| Error::Remote(error.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct PushResponseBody {
    success: bool,
    error: Option<String>,
    accepted: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(Error::InvalidInput(
            "Remote base URL must not be empty".to_string(),
        ));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "Remote base URL must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url(String::new()).is_err());
        assert!(normalize_base_url("api.example.com".to_string()).is_err());
        assert_eq!(
            normalize_base_url("https://api.example.com/".to_string()).unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn parse_api_error_prefers_json_message() {
        let message = parse_api_error(
            StatusCode::BAD_GATEWAY,
            r#"{"message": "upstream unavailable"}"#,
        );
        assert_eq!(message, "upstream unavailable (502)");

        let fallback = parse_api_error(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(fallback, "HTTP 500");
    }

    #[test]
    fn http_client_debug_redacts_token() {
        let client =
            HttpRemoteClient::new("https://api.example.com", Some("secret".to_string())).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn push_batch_groups_by_type() {
        let employee = EmployeeId::new();
        let date = "2024-03-01".parse().unwrap();
        let records = vec![
            SyncRecord::DailyDescription(DailyDescription::new(employee, date, "work")),
            SyncRecord::Receipt(Receipt::new(employee, date, 500)),
            SyncRecord::Receipt(Receipt::new(employee, date, 700)),
        ];

        let batch = PushBatch::from_records(&records);
        assert_eq!(batch.daily_descriptions.len(), 1);
        assert_eq!(batch.receipts.len(), 2);
        assert_eq!(batch.len(), 3);
        assert!(!batch.is_empty());
    }

    #[test]
    fn push_batch_skips_empty_sections_in_json() {
        let employee = EmployeeId::new();
        let date = "2024-03-01".parse().unwrap();
        let mut description = DailyDescription::new(employee, date, "work");
        description.id = RecordId::new();

        let batch = PushBatch::from_records(&[SyncRecord::DailyDescription(description)]);
        let json = serde_json::to_string(&batch).unwrap();
        assert!(json.contains("daily_descriptions"));
        assert!(!json.contains("mileage_entries"));
    }
}
