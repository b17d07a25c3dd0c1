//! reqwest wrapper with default headers, account cookies, timeouts and
//! retrying with exponential backoff.

use crate::config::models::RequesterConfig;
use crate::config::paths::{DEFAULT_ACCEPT, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT};
use crate::utils::error::{Result, TaskerError};
use crate::utils::validation::{seconds_to_duration, MAX_SECONDS};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Request payloads a task can send.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Form(BTreeMap<String, String>),
}

pub fn build_client(config: &RequesterConfig, cookie_header: Option<&str>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE));

    if let Some(cookie) = cookie_header {
        let value =
            HeaderValue::from_str(cookie).map_err(|e| TaskerError::InvalidConfigValueError {
                field: "cookies".to_string(),
                value: "<redacted>".to_string(),
                reason: format!("not a valid Cookie header: {}", e),
            })?;
        headers.insert(COOKIE, value);
    }

    let user_agent = if config.user_agent.is_empty() {
        DEFAULT_USER_AGENT
    } else {
        config.user_agent.as_str()
    };

    let timeout = seconds_to_duration("global.requests.timeout", config.timeout, false)?;
    let client = Client::builder()
        .default_headers(headers)
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry_times: u32,
    retry_interval: Duration,
    request_interval: Duration,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(config: RequesterConfig, cookie_header: Option<&str>) -> Result<Self> {
        let client = build_client(&config, cookie_header)?;
        Ok(Self {
            client,
            retry_times: config.retry_times,
            retry_interval: seconds_to_duration(
                "global.requests.retry_interval",
                config.retry_interval,
                true,
            )?,
            request_interval: seconds_to_duration(
                "global.requests.request_interval",
                config.request_interval,
                true,
            )?,
            timeout: seconds_to_duration("global.requests.timeout", config.timeout, false)?,
        })
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        self.request(Method::GET, url, None).await
    }

    pub async fn post(&self, url: &str, body: Option<&Body>) -> Result<Response> {
        self.request(Method::POST, url, body).await
    }

    pub async fn put(&self, url: &str, body: Option<&Body>) -> Result<Response> {
        self.request(Method::PUT, url, body).await
    }

    pub async fn patch(&self, url: &str, body: Option<&Body>) -> Result<Response> {
        self.request(Method::PATCH, url, body).await
    }

    pub async fn delete(&self, url: &str) -> Result<Response> {
        self.request(Method::DELETE, url, None).await
    }

    /// Sends the request, retrying transport errors and non-2xx responses
    /// `retry_times` times before giving up.
    pub async fn request(&self, method: Method, url: &str, body: Option<&Body>) -> Result<Response> {
        let attempts = self.retry_times().saturating_add(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            tracing::debug!("[http] {} {} (attempt {}/{})", method, url, attempt + 1, attempts);

            let builder = self.with_body(self.client.request(method.clone(), url), body);
            match builder.send().await.and_then(Response::error_for_status) {
                Ok(response) => return Ok(response),
                Err(e) => {
                    last_error = e.to_string();
                    if attempt + 1 < attempts {
                        let backoff = self.backoff(attempt);
                        tracing::warn!(
                            "[http] {} {} failed: {}; retrying in {:?}",
                            method,
                            url,
                            last_error,
                            backoff
                        );
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        Err(TaskerError::RequestFailed {
            method: method.to_string(),
            url: url.to_string(),
            attempts,
            reason: last_error,
        })
    }

    fn with_body(&self, builder: RequestBuilder, body: Option<&Body>) -> RequestBuilder {
        match body {
            Some(Body::Json(value)) => builder.json(value),
            Some(Body::Form(fields)) => builder.form(fields),
            None => builder,
        }
    }

    /// Delay before retry number `attempt + 1`: `retry_interval * 2^attempt`,
    /// capped at [`MAX_SECONDS`].
    pub fn backoff(&self, attempt: u32) -> Duration {
        let cap = Duration::from_secs(MAX_SECONDS as u64);
        self.retry_interval
            .checked_mul(1u32 << attempt.min(16))
            .map_or(cap, |delay| delay.min(cap))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_times(&self) -> u32 {
        self.retry_times
    }

    pub fn request_interval(&self) -> Duration {
        self.request_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;

    fn fast_config(retry_times: u32) -> RequesterConfig {
        RequesterConfig {
            retry_times,
            retry_interval: 0.0,
            request_interval: 0.0,
            timeout: 5.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let client = HttpClient::new(
            RequesterConfig {
                retry_interval: 1.5,
                ..Default::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(client.backoff(0), Duration::from_secs_f64(1.5));
        assert_eq!(client.backoff(1), Duration::from_secs_f64(3.0));
        assert_eq!(client.backoff(3), Duration::from_secs_f64(12.0));
        assert_eq!(client.retry_times(), 3);
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_saturates_at_cap() {
        let client = HttpClient::new(
            RequesterConfig {
                retry_interval: MAX_SECONDS,
                retry_times: 10,
                ..Default::default()
            },
            None,
        )
        .unwrap();
        let cap = Duration::from_secs(MAX_SECONDS as u64);
        assert_eq!(client.backoff(9), cap);
        assert_eq!(client.backoff(u32::MAX), cap);
    }

    #[test]
    fn test_out_of_range_seconds_are_config_errors() {
        let cases = [
            (
                "global.requests.timeout",
                RequesterConfig {
                    timeout: 1e30,
                    ..fast_config(0)
                },
            ),
            (
                "global.requests.request_interval",
                RequesterConfig {
                    request_interval: 1e30,
                    ..fast_config(0)
                },
            ),
            (
                "global.requests.retry_interval",
                RequesterConfig {
                    retry_interval: 1e17,
                    ..fast_config(10)
                },
            ),
        ];
        for (expected, config) in cases {
            match HttpClient::new(config, None) {
                Err(TaskerError::InvalidConfigValueError { field, .. }) => {
                    assert_eq!(field, expected)
                }
                other => panic!("expected a config error for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_invalid_cookie_header_is_config_error() {
        let result = HttpClient::new(fast_config(0), Some("sid=\nbroken"));
        assert!(matches!(
            result,
            Err(TaskerError::InvalidConfigValueError { field, .. }) if field == "cookies"
        ));
    }

    #[tokio::test]
    async fn test_default_headers_and_cookies_are_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/profile")
                .header("cookie", "sid=abc")
                .header("user-agent", DEFAULT_USER_AGENT)
                .header("accept-language", DEFAULT_ACCEPT_LANGUAGE);
            then.status(200).body("ok");
        });

        let client = HttpClient::new(fast_config(0), Some("sid=abc")).unwrap();
        let response = client.get(&server.url("/profile")).await.unwrap();

        mock.assert();
        assert_eq!(response.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_custom_user_agent_overrides_default() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/").header("user-agent", "tasker-test/1.0");
            then.status(204);
        });

        let config = RequesterConfig {
            user_agent: "tasker-test/1.0".to_string(),
            ..fast_config(0)
        };
        let client = HttpClient::new(config, None).unwrap();
        client.get(&server.url("/")).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_retries_until_exhausted() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/checkin");
            then.status(503);
        });

        let client = HttpClient::new(fast_config(2), None).unwrap();
        let err = client
            .post(&server.url("/checkin"), Some(&Body::Json(serde_json::json!({"a": 1}))))
            .await
            .unwrap_err();

        mock.assert_hits(3);
        match err {
            TaskerError::RequestFailed { method, attempts, .. } => {
                assert_eq!(method, "POST");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected RequestFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_form_body_is_encoded() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/settings")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("a=1&b=two");
            then.status(200);
        });

        let mut fields = BTreeMap::new();
        fields.insert("a".to_string(), "1".to_string());
        fields.insert("b".to_string(), "two".to_string());

        let client = HttpClient::new(fast_config(0), None).unwrap();
        client
            .put(&server.url("/settings"), Some(&Body::Form(fields)))
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_patch_and_delete() {
        let server = MockServer::start();
        let patch = server.mock(|when, then| {
            when.method(PATCH)
                .path("/item/1")
                .json_body(serde_json::json!({"done": true}));
            then.status(200);
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/item/1");
            then.status(204);
        });

        let client = HttpClient::new(fast_config(0), None).unwrap();
        client
            .patch(
                &server.url("/item/1"),
                Some(&Body::Json(serde_json::json!({"done": true}))),
            )
            .await
            .unwrap();
        let response = client.delete(&server.url("/item/1")).await.unwrap();

        patch.assert();
        delete.assert();
        assert_eq!(response.status().as_u16(), 204);
    }
}
