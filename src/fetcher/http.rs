use crate::config::ApiKey;
use crate::fetcher::traits::FixtureSource;
use crate::model::{DateQuery, FetchError};
use crate::provider::{decode_records, ProviderAdapter, RawMatch};

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Decoded body of a successful request, with the URL it came from.
#[derive(Debug)]
pub struct JsonResponse {
    pub url: String,
    pub body: Value,
}

/// Authenticated GET client for one provider.
pub struct HttpFetcher {
    client: Client,
    adapter: &'static dyn ProviderAdapter,
    base_url: String,
    api_key: ApiKey,
    competitions: Vec<String>,
}

impl HttpFetcher {
    pub fn new(
        adapter: &'static dyn ProviderAdapter,
        api_key: ApiKey,
        base_url: Option<&str>,
        competitions: Vec<String>,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            adapter,
            base_url: base_url.unwrap_or(adapter.default_base_url()).to_string(),
            api_key,
            competitions,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// One GET, no retries. Non-2xx, unreadable JSON and provider error
    /// payloads are all reported as errors.
    pub async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<JsonResponse, FetchError> {
        let endpoint = self.endpoint(path);
        let request = self
            .client
            .get(&endpoint)
            .query(params)
            .header(self.adapter.auth_header(), self.api_key.expose())
            .header(ACCEPT, "application/json")
            .build()
            .map_err(|source| FetchError::Network { url: endpoint.clone(), source })?;

        let url = request.url().to_string();
        info!("⤷ Requesting: {}", url);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| FetchError::Network { url: url.clone(), source })?;
        let status = response.status();
        info!("⤷ HTTP status: {}", status);

        let text = response
            .text()
            .await
            .map_err(|source| FetchError::Network { url: url.clone(), source })?;

        if !status.is_success() {
            return Err(FetchError::Transport { url, status: status.as_u16(), body: text });
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|source| FetchError::Decode { url: url.clone(), source })?;

        if let Some(payload) = provider_error(&body) {
            return Err(FetchError::Provider { url, payload });
        }

        Ok(JsonResponse { url, body })
    }
}

#[async_trait::async_trait]
impl FixtureSource for HttpFetcher {
    async fn fetch_matches(&self, query: &DateQuery) -> Result<Vec<RawMatch>, FetchError> {
        let params = self.adapter.query_params(query, &self.competitions);
        let JsonResponse { url, mut body } = self.get_json(self.adapter.matches_path(), &params).await?;

        let list_key = self.adapter.list_key();
        let items = match body.get_mut(list_key).map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => {
                debug!("No '{}' list in response from {}", list_key, url);
                Vec::new()
            }
            Some(other) => {
                warn!("'{}' in response from {} is not a list: {}", list_key, url, other);
                Vec::new()
            }
        };

        Ok(decode_records(self.adapter, items))
    }
}

/// Error payload carried by an otherwise successful response.
///
/// api-football always sends `"errors": []`, so empty containers do not count.
pub fn provider_error(body: &Value) -> Option<Value> {
    let fields = body.as_object()?;

    for key in ["errors", "error"] {
        if let Some(value) = fields.get(key) {
            if !is_empty_payload(value) {
                return Some(value.clone());
            }
        }
    }

    // football-data reports failures as { "message": ..., "errorCode": ... }
    if fields.contains_key("errorCode") {
        return Some(body.clone());
    }

    None
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_errors_are_not_failures() {
        assert_eq!(provider_error(&json!({ "errors": [], "response": [] })), None);
        assert_eq!(provider_error(&json!({ "errors": {}, "response": [] })), None);
        assert_eq!(provider_error(&json!({ "error": null, "matches": [] })), None);
        assert_eq!(provider_error(&json!([1, 2])), None);
    }

    #[test]
    fn detects_error_payloads() {
        let token = json!({ "errors": { "token": "Error/Missing application key." }, "response": [] });
        assert_eq!(
            provider_error(&token),
            Some(json!({ "token": "Error/Missing application key." }))
        );

        let limit = json!({ "message": "You reached your request limit.", "errorCode": 429 });
        assert_eq!(provider_error(&limit), Some(limit.clone()));

        assert_eq!(provider_error(&json!({ "error": "bad" })), Some(json!("bad")));
    }
}
