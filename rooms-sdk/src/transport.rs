//! HTTP transport seam.
//!
//! `RoomsClient` describes every call as a plain `HttpRequest` and hands it
//! to an `HttpTransport`. The default transport is backed by `reqwest`;
//! tests plug in their own implementation and never touch the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};

use crate::errors::{Result, RoomsError};

/// An HTTP request described as plain data
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes HTTP requests on behalf of the client.
///
/// Implementations return non-2xx responses as data; only failures that
/// prevent a response from being obtained are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RoomsError::HttpError)?;

        Ok(Self { http_client })
    }

    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.http_client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(send_error)?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}

/// Failures to connect or to finish in time carry no response at all
fn send_error(error: reqwest::Error) -> RoomsError {
    if error.is_connect() || error.is_timeout() {
        RoomsError::TransportError(error.to_string())
    } else {
        RoomsError::HttpError(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let request = HttpRequest {
            method: Method::GET,
            url: "http://localhost/rooms".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: None,
        };
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("authorization"), None);
    }

    #[test]
    fn success_covers_the_2xx_range() {
        assert!(HttpResponse::new(201, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        // Bind then release a port so nothing listens on it
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let result = transport
            .execute(HttpRequest {
                method: Method::GET,
                url: format!("http://{addr}/rooms"),
                headers: Vec::new(),
                body: None,
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, RoomsError::TransportError(_)), "{err:?}");
        assert!(err.is_retriable());
    }
}
