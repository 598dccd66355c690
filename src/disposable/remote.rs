use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::RemoteError;

pub const DEFAULT_ENDPOINT: &str = "https://disposable.debounce.io/";

/// Black-box disposable-address oracle queried with the full address.
#[async_trait]
pub trait RemoteClassifier: Send + Sync {
    async fn is_disposable(&self, email: &str) -> Result<bool, RemoteError>;
}

/// Client for debounce.io style APIs: `GET <endpoint>?email=<address>` answering
/// `{"disposable": "true"}`.
pub struct DebounceClient {
    client: reqwest::Client,
    endpoint: String,
}

impl DebounceClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mailverify/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| RemoteError::ClientInit { source })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteClassifier for DebounceClient {
    async fn is_disposable(&self, email: &str) -> Result<bool, RemoteError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|source| RemoteError::Request { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| RemoteError::Malformed(err.to_string()))?;
        let verdict = parse_verdict(&body)?;
        debug!(email, disposable = verdict, "classification API answered");
        Ok(verdict)
    }
}

/// Reads the `disposable` field, given either as a JSON boolean or as the
/// strings `"true"` / `"false"`.
pub(crate) fn parse_verdict(body: &Value) -> Result<bool, RemoteError> {
    match body.get("disposable") {
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(RemoteError::Malformed(format!(
                "unexpected disposable value '{other}'"
            ))),
        },
        Some(other) => Err(RemoteError::Malformed(format!(
            "unexpected disposable value {other}"
        ))),
        None => Err(RemoteError::Malformed("missing 'disposable' field".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn verdict_accepts_strings_and_booleans() {
        assert!(parse_verdict(&json!({"disposable": "true"})).unwrap());
        assert!(!parse_verdict(&json!({"disposable": "false"})).unwrap());
        assert!(parse_verdict(&json!({"disposable": true})).unwrap());
        assert!(parse_verdict(&json!({"disposable": "maybe"})).is_err());
        assert!(parse_verdict(&json!({"other": 1})).is_err());
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn client_sends_address_as_query() {
        let router = Router::new().route(
            "/",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let email = params.get("email").cloned().unwrap_or_default();
                let disposable = email.ends_with("@mailinator.com");
                Json(json!({ "disposable": disposable.to_string() }))
            }),
        );
        let endpoint = serve(router).await;
        let client = DebounceClient::new(endpoint, Duration::from_secs(2)).unwrap();

        assert!(client.is_disposable("someone+x@mailinator.com").await.unwrap());
        assert!(!client.is_disposable("someone@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn client_reports_error_status() {
        let router = Router::new().route("/", get(|| async { StatusCode::BAD_GATEWAY }));
        let endpoint = serve(router).await;
        let client = DebounceClient::new(endpoint, Duration::from_secs(2)).unwrap();

        let err = client.is_disposable("a@b.com").await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { status: 502 }));
    }

    #[tokio::test]
    async fn client_reports_malformed_body() {
        let router = Router::new().route("/", get(|| async { "not json" }));
        let endpoint = serve(router).await;
        let client = DebounceClient::new(endpoint, Duration::from_secs(2)).unwrap();

        let err = client.is_disposable("a@b.com").await.unwrap_err();
        assert!(matches!(err, RemoteError::Malformed(_)));
    }
}
