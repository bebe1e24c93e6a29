//! HTTP and HTTPS client transport.
//!
//! The challenge carries `<VERB> <URI>`. The request always goes to the
//! endpoint; an absolute URI only contributes its path and the `Host`
//! header. Redirects are never followed, so the status the checker sees is
//! the one the endpoint sent. TLS certificates are not verified: the check
//! is about the endpoint speaking HTTPS, not about trusting it.

use crate::checks::{Challenge, HttpReply, ProtocolTag, Scheme};
use crate::error::{TransportError, TransportResult};
use crate::transport::{Captured, Transport, TransportOptions};
use crate::types::Endpoint;
use async_trait::async_trait;
use reqwest::header::HOST;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Url};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    scheme: Scheme,
    options: TransportOptions,
}

impl HttpTransport {
    pub fn new(scheme: Scheme, options: TransportOptions) -> Self {
        Self { scheme, options }
    }

    fn client(&self) -> TransportResult<Client> {
        Client::builder()
            .timeout(self.options.timeout)
            .connect_timeout(self.options.timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(true)
            .no_proxy()
            .user_agent(concat!("dirac/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Http(error_chain(&e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn protocol(&self) -> ProtocolTag {
        match self.scheme {
            Scheme::Http => ProtocolTag::HttpTcp,
            Scheme::Https => ProtocolTag::HttpsTcp,
        }
    }

    async fn exchange(
        &self,
        endpoint: &Endpoint,
        challenge: Option<&Challenge>,
    ) -> TransportResult<Captured> {
        let line = match challenge {
            Some(Challenge::Text(line)) => line.as_str(),
            _ => "GET /",
        };
        let target = RequestTarget::new(line, endpoint, self.scheme)?;
        debug!(%endpoint, method = %target.method, url = %target.url, "Sending request");

        let mut request = self.client()?.request(target.method, target.url);
        if let Some(host) = target.host {
            request = request.header(HOST, host);
        }
        let mut response = request
            .send()
            .await
            .map_err(|e| exchange_error(endpoint, &e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let mut body = Vec::new();
        while body.len() < self.options.max_response_bytes {
            match response.chunk().await.map_err(|e| exchange_error(endpoint, &e))? {
                Some(chunk) => body.extend_from_slice(&chunk),
                None => break,
            }
        }
        body.truncate(self.options.max_response_bytes);
        debug!(%endpoint, status, len = body.len(), "Received response");

        Ok(Captured::Http(HttpReply {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        }))
    }
}

/// Where a `<VERB> <URI>` request line goes for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub method: Method,
    /// URL pointing at the endpoint itself.
    pub url: Url,
    /// `Host` header taken from an absolute URI.
    pub host: Option<String>,
}

impl RequestTarget {
    pub fn new(line: &str, endpoint: &Endpoint, scheme: Scheme) -> TransportResult<Self> {
        let (verb, uri) = line
            .split_once(' ')
            .ok_or_else(|| TransportError::Http(format!("invalid request line '{}'", line)))?;
        let method = Method::from_bytes(verb.as_bytes())
            .map_err(|_| TransportError::Http(format!("invalid method '{}'", verb)))?;

        let (host, path) = match Scheme::of_uri(uri) {
            Some(found) if !found.eq_ignore_ascii_case(scheme.as_str()) => {
                return Err(TransportError::Http(format!(
                    "URI '{}' does not use the {} scheme",
                    uri, scheme
                )))
            }
            Some(_) => {
                let absolute = Url::parse(uri)
                    .map_err(|e| TransportError::Http(format!("invalid URI '{}': {}", uri, e)))?;
                let host = absolute.host_str().map(|host| match absolute.port() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host.to_string(),
                });
                let path = match absolute.query() {
                    Some(query) => format!("{}?{}", absolute.path(), query),
                    None => absolute.path().to_string(),
                };
                (host, path)
            }
            None => (None, uri.to_string()),
        };

        let raw = format!("{}://{}{}", scheme, endpoint.authority(), path);
        let url = Url::parse(&raw)
            .map_err(|e| TransportError::Http(format!("invalid URL '{}': {}", raw, e)))?;

        Ok(Self { method, url, host })
    }
}

fn exchange_error(endpoint: &Endpoint, error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::ConnectionFailed {
            target: endpoint.authority(),
            reason: error_chain(error),
        }
    } else {
        TransportError::Http(error_chain(error))
    }
}

/// `outer: inner: ...` for errors whose display hides the cause.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Port;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn options() -> TransportOptions {
        TransportOptions {
            timeout: Duration::from_millis(1000),
            max_response_bytes: 1024,
        }
    }

    /// Answer one connection with `reply` and hand back what the client sent.
    async fn http_server(reply: &'static [u8]) -> (Endpoint, oneshot::Receiver<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 2048];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let _ = tx.send(buf[..n].to_vec());
                let _ = socket.write_all(reply).await;
                let _ = socket.shutdown().await;
            }
        });
        (Endpoint::new("127.0.0.1", Port::new(port).unwrap()), rx)
    }

    #[test]
    fn test_target_absolute_uri() {
        let endpoint = Endpoint::new("10.0.0.1", Port::new(80).unwrap());
        let target =
            RequestTarget::new("GET http://server.local/index.html", &endpoint, Scheme::Http).unwrap();
        assert_eq!(target.method, Method::GET);
        assert_eq!(target.url.as_str(), "http://10.0.0.1/index.html");
        assert_eq!(target.host.as_deref(), Some("server.local"));
    }

    #[test]
    fn test_target_path() {
        let endpoint = Endpoint::new("10.0.0.1", Port::new(8443).unwrap());
        let target = RequestTarget::new("GET /status?full=1", &endpoint, Scheme::Https).unwrap();
        assert_eq!(target.url.as_str(), "https://10.0.0.1:8443/status?full=1");
        assert!(target.host.is_none());
    }

    #[test]
    fn test_target_rejects_scheme_mismatch() {
        let endpoint = Endpoint::new("10.0.0.1", Port::new(80).unwrap());
        assert!(RequestTarget::new("GET https://server.local/", &endpoint, Scheme::Http).is_err());
        assert!(RequestTarget::new("GET http://server.local/", &endpoint, Scheme::Https).is_err());
        assert!(RequestTarget::new("GET", &endpoint, Scheme::Http).is_err());
    }

    #[tokio::test]
    async fn test_exchange() {
        let (endpoint, request) = http_server(
            b"HTTP/1.0 404 Not Found\r\nContent-Type: text/html\r\nContent-Length: 7\r\n\r\nmissing",
        )
        .await;
        let transport = HttpTransport::new(Scheme::Http, options());
        let challenge = Challenge::Text("GET http://server.local/index.html".into());
        let captured = transport.exchange(&endpoint, Some(&challenge)).await.unwrap();
        match captured {
            Captured::Http(reply) => {
                assert_eq!(reply.status, 404);
                assert_eq!(reply.body, "missing");
                assert!(reply
                    .headers
                    .contains(&("content-type".to_string(), "text/html".to_string())));
            }
            other => panic!("unexpected capture: {other:?}"),
        }

        let request = String::from_utf8(request.await.unwrap()).unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /index.html http/1.1\r\n"));
        assert!(request.contains("host: server.local\r\n"));
    }

    #[tokio::test]
    async fn test_redirect_not_followed() {
        let (endpoint, _request) = http_server(
            b"HTTP/1.1 301 Moved Permanently\r\nLocation: http://127.0.0.1:1/\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let transport = HttpTransport::new(Scheme::Http, options());
        let challenge = Challenge::Text("GET /".into());
        match transport.exchange(&endpoint, Some(&challenge)).await.unwrap() {
            Captured::Http(reply) => assert_eq!(reply.status, 301),
            other => panic!("unexpected capture: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_https_starts_with_tls_handshake() {
        let (endpoint, request) = http_server(b"HTTP/1.0 200 OK\r\n\r\n").await;
        let transport = HttpTransport::new(Scheme::Https, options());
        assert_eq!(transport.protocol(), ProtocolTag::HttpsTcp);

        let challenge = Challenge::Text("GET /".into());
        assert!(transport.exchange(&endpoint, Some(&challenge)).await.is_err());

        // 0x16 opens a TLS handshake record; no plaintext request is sent.
        let first = request.await.unwrap();
        assert_eq!(first.first(), Some(&0x16));
    }

    #[tokio::test]
    async fn test_closed_port_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = Endpoint::new("127.0.0.1", Port::new(port).unwrap());
        let transport = HttpTransport::new(Scheme::Http, options());
        let challenge = Challenge::Text("GET /".into());
        assert!(matches!(
            transport.exchange(&endpoint, Some(&challenge)).await,
            Err(TransportError::ConnectionFailed { .. })
        ));
    }
}
