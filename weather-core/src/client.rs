use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::Credential,
    error::{FetchError, TransportError},
    model::Payload,
    query::ValidQuery,
};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherstack.com";

/// One outbound GET returning the decoded JSON body.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, TransportError>;
}

/// reqwest-backed transport. The provider reports failures in the body, so the
/// HTTP status is logged but does not decide the outcome.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, TransportError> {
        let url = format!("{}/{}", self.base_url, path);

        // reqwest errors embed the full URL, credential included.
        let res = self.http.get(&url).query(params).send().await.map_err(|e| e.without_url())?;
        let status = res.status();
        let body = res.text().await.map_err(|e| e.without_url())?;
        debug!(%url, %status, bytes = body.len(), "received response");

        Ok(serde_json::from_str(&body)?)
    }
}

/// Issues one request per call against the unit's endpoint, with the shared
/// credential attached.
#[derive(Debug)]
pub struct WeatherClient {
    credential: Credential,
    transport: Box<dyn Transport>,
}

impl WeatherClient {
    pub fn new(credential: Credential, transport: Box<dyn Transport>) -> Self {
        Self { credential, transport }
    }

    /// Client talking to the real provider at `base_url`.
    pub fn http(credential: Credential, base_url: &str) -> Self {
        Self::new(credential, Box::new(HttpTransport::new(base_url)))
    }

    pub async fn fetch(&self, query: &ValidQuery) -> Result<Payload, FetchError> {
        let path = query.kind.endpoint();

        let mut params: Vec<(&str, &str)> = Vec::with_capacity(query.params.len() + 1);
        params.push(("access_key", self.credential.expose()));
        params.extend(query.params.iter().map(|(k, v)| (*k, v.as_str())));

        // Never log `params`: it carries the credential.
        debug!(endpoint = path, params = ?query.params, "sending request");

        let body = self.transport.get_json(path, &params).await.inspect_err(|err| {
            warn!(endpoint = path, error = %err, "transport failure");
        })?;

        if let Some(error) = body.get("error").filter(|e| is_truthy(e)) {
            let detail = error
                .get("info")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(query.kind.fallback_message())
                .to_string();
            warn!(endpoint = path, code = ?error.get("code"), %detail, "provider reported an error");
            return Err(FetchError::Provider(detail));
        }

        Ok(body)
    }
}

/// Whether an `error` field signals failure. `null`, `false`, `0` and `""`
/// do not.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport used by the tests in this crate.

    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use tokio::sync::oneshot;

    use super::*;

    pub enum Reply {
        Json(Value),
        Fail(String),
        /// Wait for the sender before answering.
        Gated(oneshot::Receiver<Value>),
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Call {
        pub path: String,
        pub params: Vec<(String, String)>,
    }

    #[derive(Default)]
    pub struct FakeTransport {
        replies: Mutex<VecDeque<Reply>>,
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl Debug for FakeTransport {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("FakeTransport").finish_non_exhaustive()
        }
    }

    impl FakeTransport {
        pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
            Self { replies: Mutex::new(replies.into_iter().collect()), calls: Arc::default() }
        }

        /// Handle to the recorded calls, usable after the transport is boxed.
        pub fn calls(&self) -> Arc<Mutex<Vec<Call>>> {
            Arc::clone(&self.calls)
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get_json(
            &self,
            path: &str,
            params: &[(&str, &str)],
        ) -> Result<Value, TransportError> {
            self.calls.lock().unwrap().push(Call {
                path: path.to_string(),
                params: params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            });

            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(Reply::Json(body)) => Ok(body),
                Some(Reply::Fail(msg)) => Err(TransportError::Other(msg)),
                Some(Reply::Gated(rx)) => {
                    rx.await.map_err(|_| TransportError::Other("gate dropped".into()))
                }
                None => Err(TransportError::Other("no scripted reply".into())),
            }
        }
    }

    pub fn client_with(transport: FakeTransport) -> WeatherClient {
        WeatherClient::new(Credential::new("TEST_KEY"), Box::new(transport))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeTransport, Reply, client_with};
    use super::*;
    use crate::unit::UnitKind;
    use serde_json::json;

    fn marine_query() -> ValidQuery {
        ValidQuery {
            kind: UnitKind::Marine,
            params: vec![
                ("latitude", "45.00".into()),
                ("longitude", "-2.00".into()),
                ("tide", "yes".into()),
            ],
        }
    }

    #[tokio::test]
    async fn sends_credential_and_query_params_to_unit_endpoint() {
        let transport = FakeTransport::new([Reply::Json(json!({"forecast": []}))]);
        let calls = transport.calls();
        let client = client_with(transport);

        client.fetch(&marine_query()).await.expect("fetch should succeed");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "marine");
        assert_eq!(
            calls[0].params,
            vec![
                ("access_key".to_string(), "TEST_KEY".to_string()),
                ("latitude".to_string(), "45.00".to_string()),
                ("longitude".to_string(), "-2.00".to_string()),
                ("tide".to_string(), "yes".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn provider_error_uses_info_detail() {
        let body = json!({"success": false, "error": {"code": 615, "info": "Your API request failed."}});
        let client = client_with(FakeTransport::new([Reply::Json(body)]));

        let err = client.fetch(&marine_query()).await.unwrap_err();
        assert_eq!(err.user_message(), "Your API request failed.");
    }

    #[tokio::test]
    async fn provider_error_without_detail_uses_fallback() {
        let client = client_with(FakeTransport::new([Reply::Json(json!({"error": {"code": 101}}))]));

        let err = client.fetch(&marine_query()).await.unwrap_err();
        assert!(matches!(err, FetchError::Provider(_)));
        assert_eq!(err.user_message(), "Failed to fetch marine weather data");
    }

    #[tokio::test]
    async fn falsy_error_field_is_not_a_failure() {
        for flag in [json!(false), json!(0), json!(""), json!(null)] {
            let body = json!({"error": flag, "location": {"name": "Paris"}});
            let client = client_with(FakeTransport::new([Reply::Json(body.clone())]));

            let payload = client.fetch(&marine_query()).await.expect("falsy error means success");
            assert_eq!(payload, body);
        }
    }

    #[tokio::test]
    async fn truthy_error_field_is_a_failure() {
        for flag in [json!(true), json!("quota exceeded"), json!(1), json!([])] {
            let client = client_with(FakeTransport::new([Reply::Json(json!({"error": flag}))]));

            let err = client.fetch(&marine_query()).await.unwrap_err();
            assert_eq!(err.user_message(), "Failed to fetch marine weather data");
        }
    }

    #[tokio::test]
    async fn transport_failure_is_reported_as_network_error() {
        let client = client_with(FakeTransport::new([Reply::Fail("unreachable".into())]));

        let err = client.fetch(&marine_query()).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(err.user_message(), "Network error. Please try again.");
    }

    #[test]
    fn http_transport_strips_trailing_slash() {
        let transport = HttpTransport::new("http://localhost:8080/");
        assert_eq!(transport.base_url(), "http://localhost:8080");
        assert_eq!(HttpTransport::default().base_url(), DEFAULT_BASE_URL);
    }
}
