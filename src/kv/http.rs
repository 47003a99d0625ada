use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::error::KvError;

/// Remote KV reached over a bearer-authenticated HTTP API.
///
/// `GET {api_url}/{key}` answers `{"value": "..."}` (some deployments use
/// `data` instead), `PUT {api_url}/{key}` takes `{"value": "..."}`.
pub struct HttpKv {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl HttpKv {
    pub fn new(api_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn key_url(&self, key: &str) -> String {
        format!("{}/{}", self.api_url, urlencoding::encode(key))
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let response = self
            .client
            .get(self.key_url(key))
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: Value = response.json().await?;
                Ok(extract_value(&body))
            }
            status => Err(KvError::HttpStatus(status.as_u16())),
        }
    }

    pub async fn put(&self, key: &str, value: String) -> Result<(), KvError> {
        let response = self
            .client
            .put(self.key_url(key))
            .bearer_auth(&self.token)
            .json(&json!({ "value": value }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(KvError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Non-string values (numbers from some providers) are kept in their JSON text form.
fn extract_value(body: &Value) -> Option<String> {
    ["value", "data"]
        .iter()
        .filter_map(|field| body.get(field))
        .find_map(|v| match v {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_value_prefers_value_then_data() {
        assert_eq!(extract_value(&json!({"value": "a", "data": "b"})).as_deref(), Some("a"));
        assert_eq!(extract_value(&json!({"data": "b"})).as_deref(), Some("b"));
        assert_eq!(extract_value(&json!({"value": "", "data": "b"})).as_deref(), Some("b"));
        assert_eq!(extract_value(&json!({"other": 1})), None);
        assert_eq!(extract_value(&json!({"value": null, "data": "b"})).as_deref(), Some("b"));
    }

    #[test]
    fn extract_value_keeps_numeric_values() {
        assert_eq!(extract_value(&json!({"value": 1700000000000i64})).as_deref(), Some("1700000000000"));
        assert_eq!(extract_value(&json!({"data": 42})).as_deref(), Some("42"));
    }

    #[test]
    fn keys_are_percent_encoded() {
        let kv = HttpKv::new("https://kv.example.com/v1/", "t");
        assert_eq!(kv.key_url("app_data:links"), "https://kv.example.com/v1/app_data%3Alinks");
    }
}
