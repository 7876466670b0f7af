//! Endpoint configuration shared by the binaries.
//!
//! Each binary resolves its settings with clap, where every argument falls back to the
//! environment variable named here and then to the default.

/// Environment variable holding the store host
pub const STORE_HOST_ENV: &str = "STORE_HOST";
/// Environment variable holding the store port
pub const STORE_PORT_ENV: &str = "STORE_PORT";

pub const DEFAULT_STORE_HOST: &str = "127.0.0.1";
pub const DEFAULT_STORE_PORT: u16 = 8000;

/// Port on which the store is reached over TLS
const TLS_PORT: u16 = 443;

/// Path of the ingest endpoint, relative to the store base URL
pub const INGEST_PATH: &str = "/processed_agent_data/";
/// Path of the streaming endpoint
pub const WEBSOCKET_PATH: &str = "/ws/";

/// Host and port of a Michi service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Port 443 means the service sits behind TLS
    pub fn is_secure(&self) -> bool {
        self.port == TLS_PORT
    }

    fn authority(&self) -> String {
        if self.is_secure() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Base HTTP URL, e.g. `http://127.0.0.1:8000`
    pub fn http_base_url(&self) -> String {
        let scheme = if self.is_secure() { "https" } else { "http" };
        format!("{}://{}", scheme, self.authority())
    }

    /// Streaming URL, e.g. `ws://127.0.0.1:8000/ws/`
    pub fn websocket_url(&self) -> String {
        let scheme = if self.is_secure() { "wss" } else { "ws" };
        format!("{}://{}{}", scheme, self.authority(), WEBSOCKET_PATH)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_HOST, DEFAULT_STORE_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_endpoint_urls() {
        // テスト項目: 443 以外のポートでは ws/http とポート番号が使われる
        // given (前提条件):
        let endpoint = Endpoint::default();

        // when (操作):
        let http = endpoint.http_base_url();
        let ws = endpoint.websocket_url();

        // then (期待する結果):
        assert_eq!(http, "http://127.0.0.1:8000");
        assert_eq!(ws, "ws://127.0.0.1:8000/ws/");
    }

    #[test]
    fn test_tls_endpoint_urls() {
        // テスト項目: 443 番ポートでは wss/https が使われ、ポート番号は省略される
        // given (前提条件):
        let endpoint = Endpoint::new("store.example.com", 443);

        // when (操作):
        let http = endpoint.http_base_url();
        let ws = endpoint.websocket_url();

        // then (期待する結果):
        assert!(endpoint.is_secure());
        assert_eq!(http, "https://store.example.com");
        assert_eq!(ws, "wss://store.example.com/ws/");
    }
}
