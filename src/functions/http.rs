//! HTTP API client functions
//!
//! A thin reqwest wrapper registered into the function pool so suites can
//! exercise a live service. The engine treats these like any other
//! registered function: possibly failing, possibly slow. Transport errors
//! surface as faults, not assertion failures.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::common::config::HttpConfig;
use crate::common::{Error, Result};
use crate::engine::registry::{FunctionProvider, StepFunction};

/// JSON-speaking HTTP client bound to a base URL
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Build a client from configuration; the bearer token, when set, is
    /// sent with every request
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::Config(format!("invalid bearer token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn request(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%method, %url, "sending request");

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(%status, bytes = text.len(), "response received");

        // Non-JSON bodies come back as plain strings
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    pub async fn get(&self, endpoint: &str) -> Result<Value> {
        self.request(Method::GET, endpoint, None).await
    }

    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value> {
        self.request(Method::DELETE, endpoint, None).await
    }

    /// Post a payload to the echo endpoint and return the reflected body
    pub async fn echo(&self, payload: &Value) -> Result<Value> {
        self.post("/api/echo", payload).await
    }

    pub async fn health_check(&self) -> Result<Value> {
        self.get("/api/health").await
    }
}

/// Registers the HTTP operations as step functions
pub struct HttpFunctions {
    client: Arc<ApiClient>,
}

impl HttpFunctions {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl FunctionProvider for HttpFunctions {
    fn functions(&self) -> Vec<(String, StepFunction)> {
        vec![
            ("http_get".to_string(), get_function(Arc::clone(&self.client))),
            ("http_post".to_string(), post_function(Arc::clone(&self.client))),
            ("echo".to_string(), echo_function(Arc::clone(&self.client))),
            (
                "health_check".to_string(),
                health_function(Arc::clone(&self.client)),
            ),
        ]
    }
}

fn endpoint_arg(args: &[Value], function: &str) -> Result<String> {
    args.first()
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::function_fault(function, "first argument must be an endpoint string"))
}

fn get_function(client: Arc<ApiClient>) -> StepFunction {
    Arc::new(move |args, _kwargs| {
        let client = Arc::clone(&client);
        Box::pin(async move {
            let endpoint = endpoint_arg(&args, "http_get")?;
            client.get(&endpoint).await
        })
    })
}

fn post_function(client: Arc<ApiClient>) -> StepFunction {
    Arc::new(move |args, kwargs| {
        let client = Arc::clone(&client);
        Box::pin(async move {
            let endpoint = endpoint_arg(&args, "http_post")?;
            let body = args.get(1).cloned().unwrap_or(Value::Object(kwargs));
            client.post(&endpoint, &body).await
        })
    })
}

/// First positional argument wins; otherwise the kwargs map is the payload
fn echo_function(client: Arc<ApiClient>) -> StepFunction {
    Arc::new(move |args, kwargs| {
        let client = Arc::clone(&client);
        Box::pin(async move {
            let payload = args.into_iter().next().unwrap_or(Value::Object(kwargs));
            client.echo(&payload).await
        })
    })
}

fn health_function(client: Arc<ApiClient>) -> StepFunction {
    Arc::new(move |_args, _kwargs| {
        let client = Arc::clone(&client);
        Box::pin(async move { client.health_check().await })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_from_defaults() {
        let client = ApiClient::new(&HttpConfig::default()).unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = HttpConfig {
            base_url: "http://svc:1234/".to_string(),
            ..HttpConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://svc:1234");
    }

    #[test]
    fn test_provider_exposes_expected_names() {
        let client = Arc::new(ApiClient::new(&HttpConfig::default()).unwrap());
        let provider = HttpFunctions::new(client);
        let names: Vec<String> = provider.functions().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["http_get", "http_post", "echo", "health_check"]);
    }
}
