use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Method, Reply, Session, Transport};
use crate::error::HttpError;

/// reqwest-backed transport rooted at one API base URL.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base: String,
}

impl HttpTransport {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpTransport {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Reply, HttpError> {
        let url = format!("{}{}", self.base, path);
        let mut request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
        }
        .header(CONTENT_TYPE, "application/json");

        if let Some(cookie) = session.cookie_header() {
            request = request.header(COOKIE, cookie);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(method = method.as_str(), path, error = %e, "request failed");
            HttpError::Transport(e.to_string())
        })?;

        let status = response.status();
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let text = response
            .text()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        debug!(method = method.as_str(), path, status = status.as_u16(), "response");

        if !status.is_success() {
            return Err(HttpError::from_response(status.as_u16(), &text));
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| HttpError::Decode(e.to_string()))?
        };

        Ok(Reply { body, set_cookies })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport(server: &mockito::ServerGuard) -> HttpTransport {
        HttpTransport::new(&server.url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_json_and_cookies() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/login")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("set-cookie", "access_token=abc; HttpOnly; Path=/")
            .with_body(r#"{"id":1,"email":"a@example.com"}"#)
            .create_async()
            .await;

        let reply = transport(&server)
            .send(
                &Session::default(),
                Method::Post,
                "/auth/login",
                Some(&json!({"email": "a@example.com", "password": "pw"})),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply.body["email"], json!("a@example.com"));
        assert_eq!(reply.set_cookies.len(), 1);
        assert!(reply.set_cookies[0].starts_with("access_token=abc"));
    }

    #[tokio::test]
    async fn test_cookie_header_is_attached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/auth/me")
            .match_header("cookie", "access_token=abc")
            .with_status(200)
            .with_body(r#"{"id":1,"email":"a@example.com"}"#)
            .create_async()
            .await;

        transport(&server)
            .send(
                &Session::from_cookie_header("access_token=abc"),
                Method::Get,
                "/auth/me",
                None,
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_detail_is_extracted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/login")
            .with_status(401)
            .with_body(r#"{"detail":"Invalid credentials"}"#)
            .create_async()
            .await;

        let err = transport(&server)
            .send(&Session::default(), Method::Post, "/auth/login", None)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            HttpError::Status {
                status: 401,
                message: "Invalid credentials".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_error_plain_text_and_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/orgs")
            .with_status(502)
            .with_body("upstream down")
            .create_async()
            .await;
        server
            .mock("GET", "/auth/me")
            .with_status(500)
            .create_async()
            .await;

        let transport = transport(&server);
        let session = Session::default();

        let err = transport
            .send(&session, Method::Get, "/orgs", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "upstream down");

        let err = transport
            .send(&session, Method::Get, "/auth/me", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[tokio::test]
    async fn test_non_json_success_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/orgs")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let err = transport(&server)
            .send(&Session::default(), Method::Get, "/orgs", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let transport = HttpTransport::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = transport
            .send(&Session::default(), Method::Get, "/auth/me", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Transport(_)));
    }
}
