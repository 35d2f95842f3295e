use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, header};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use domain::error::{DomainError, Result};
use domain::manager::TagManagerClient;
use domain::sensor::TagRecord;

/// JSON client for the wireless tag manager cloud service.
///
/// Every operation is a single POST to an `ethClient.asmx` method; the
/// service wraps each result in a `{"d": ...}` envelope. One attempt per
/// call - failures are surfaced, never retried here.
pub struct WirelessTagClient {
    client: Client,
    base_url: String,
    /// Tag manager MAC, required by the light commands
    mac: String,
}

impl WirelessTagClient {
    pub fn new(
        base_url: impl Into<String>,
        token: &str,
        mac: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let bearer = format!("Bearer {token}");
        let mut headers = header::HeaderMap::new();
        let value = header::HeaderValue::from_str(&bearer)
            .map_err(|e| DomainError::CommandFailed(format!("Invalid access token: {e}")))?;
        headers.insert(header::AUTHORIZATION, value);

        let client = ClientBuilder::new()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| DomainError::CommandFailed(format!("Failed to build HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            mac: mac.into(),
        })
    }

    async fn call<B: Serialize>(&self, method: &str, body: &B) -> Result<Value> {
        let url = format!("{}/ethClient.asmx/{}", self.base_url, method);
        debug!(%url, "Tag manager request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::CommandFailed(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DomainError::CommandFailed(format!(
                "{method}: HTTP {status}: {text}"
            )));
        }

        let mut envelope: Value = response
            .json()
            .await
            .map_err(|e| DomainError::CommandFailed(format!("{method}: invalid JSON: {e}")))?;

        Ok(envelope.get_mut("d").map(Value::take).unwrap_or(envelope))
    }

    fn record_from(value: Value) -> Result<TagRecord> {
        serde_json::from_value(value).map_err(|e| DomainError::InvalidRecord(e.to_string()))
    }
}

#[async_trait]
impl TagManagerClient for WirelessTagClient {
    async fn tag_list(&self) -> Result<Vec<TagRecord>> {
        let value = self.call("GetTagList", &json!({})).await?;
        serde_json::from_value(value).map_err(|e| DomainError::InvalidRecord(e.to_string()))
    }

    async fn request_immediate_postback(&self, tag_id: u32) -> Result<TagRecord> {
        let value = self
            .call("RequestImmediatePostback", &json!({ "id": tag_id }))
            .await?;
        Self::record_from(value)
    }

    async fn light_on(&self, tag_id: u32, flash: bool) -> Result<TagRecord> {
        let value = self
            .call(
                "LightOn",
                &json!({ "mac": self.mac, "id": tag_id, "flash": flash }),
            )
            .await?;
        Self::record_from(value)
    }

    async fn light_off(&self, tag_id: u32) -> Result<TagRecord> {
        let value = self
            .call("LightOff", &json!({ "mac": self.mac, "id": tag_id }))
            .await?;
        Self::record_from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_trimmed() {
        let client = WirelessTagClient::new(
            "https://wirelesstag.example/",
            "token",
            "0123456789AB",
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://wirelesstag.example");
    }

    #[test]
    fn test_envelope_unwrap() {
        let record =
            WirelessTagClient::record_from(json!({ "slaveId": 3, "tagType": 13 })).unwrap();
        assert_eq!(record.slave_id, Some(3));
        assert_eq!(record.tag_type, Some(13));
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let result = WirelessTagClient::new(
            "https://wirelesstag.example",
            "bad\ntoken",
            "0123456789AB",
            Duration::from_secs(10),
        );
        assert!(result.is_err());
    }
}
