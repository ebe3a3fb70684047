//! V'Lille feed client.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::domain::StationId;

use super::error::StationError;

/// Default roster endpoint: every station with its location.
const DEFAULT_ROSTER_URL: &str = "http://www.vlille.fr/stations/xml-stations.aspx";

/// Default detail endpoint; `{id}` is replaced by the station id.
const DEFAULT_DETAIL_URL: &str = "http://www.vlille.fr/stations/xml-station.aspx?borne={id}";

/// Charset label the feed wrongly declares, compared lowercase.
const UTF16_LABEL: &str = "utf-16";

/// Placeholder substituted in the detail URL template.
const ID_PLACEHOLDER: &str = "{id}";

/// Source of raw roster and detail documents.
///
/// The registry only talks to the feed through this trait, so tests can
/// substitute [`MockFeed`](super::MockFeed).
pub trait Feed: Send + Sync + 'static {
    /// Fetch the roster document listing every station.
    fn fetch_roster(&self) -> impl Future<Output = Result<String, StationError>> + Send;

    /// Fetch the occupancy document for one station.
    fn fetch_detail(
        &self,
        id: StationId,
    ) -> impl Future<Output = Result<String, StationError>> + Send;
}

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Roster endpoint
    pub roster_url: String,
    /// Detail endpoint template containing `{id}`
    pub detail_url: String,
    /// Request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
}

impl FeedConfig {
    /// Set a custom roster URL.
    pub fn with_roster_url(mut self, url: impl Into<String>) -> Self {
        self.roster_url = url.into();
        self
    }

    /// Set a custom detail URL template.
    pub fn with_detail_url(mut self, template: impl Into<String>) -> Self {
        self.detail_url = template.into();
        self
    }

    /// Set a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Detail URL for one station.
    pub fn detail_url_for(&self, id: StationId) -> String {
        self.detail_url.replace(ID_PLACEHOLDER, &id.to_string())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            roster_url: DEFAULT_ROSTER_URL.to_string(),
            detail_url: DEFAULT_DETAIL_URL.to_string(),
            timeout: None,
        }
    }
}

/// HTTP client for the V'Lille XML feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    config: FeedConfig,
}

impl FeedClient {
    /// Create a new feed client.
    pub fn new(config: FeedConfig) -> Result<Self, StationError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Fetch a document. No retry: callers decide what a failure means.
    pub async fn fetch(&self, url: &str) -> Result<String, StationError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(StationError::Api {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // Read raw bytes: the declared charset is wrong, so reqwest's own
        // charset decoding must not kick in.
        let body = response.bytes().await?;
        debug!(url, bytes = body.len(), "fetched feed document");

        let text = String::from_utf8(body.to_vec()).map_err(|e| {
            StationError::decode(format!("{url}: body is not valid UTF-8: {e}"))
        })?;

        Ok(normalize_declared_charset(text))
    }
}

impl Feed for FeedClient {
    async fn fetch_roster(&self) -> Result<String, StationError> {
        self.fetch(&self.config.roster_url).await
    }

    async fn fetch_detail(&self, id: StationId) -> Result<String, StationError> {
        self.fetch(&self.config.detail_url_for(id)).await
    }
}

/// Rewrite a `utf-16` label in the XML declaration to `utf-8`.
///
/// The feed declares UTF-16 but serves UTF-8.
pub fn normalize_declared_charset(body: String) -> String {
    if !body.starts_with("<?xml") {
        return body;
    }
    let Some(end) = body.find("?>") else {
        return body;
    };

    // ASCII lowercasing keeps byte offsets, so `at` indexes `body` too.
    let Some(at) = body[..end].to_ascii_lowercase().find(UTF16_LABEL) else {
        return body;
    };

    format!("{}utf-8{}", &body[..at], &body[at + UTF16_LABEL.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::decode_detail;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(status: &str, content_type: &str, body: &[u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            socket.write_all(&response).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}/xml-station.aspx")
    }

    fn client() -> FeedClient {
        FeedClient::new(FeedConfig::default().with_timeout(Duration::from_secs(5))).unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.roster_url, DEFAULT_ROSTER_URL);
        assert_eq!(config.detail_url, DEFAULT_DETAIL_URL);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn config_builders() {
        let config = FeedConfig::default()
            .with_roster_url("http://localhost:8080/roster")
            .with_detail_url("http://localhost:8080/station/{id}")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.roster_url, "http://localhost:8080/roster");
        assert_eq!(
            config.detail_url_for(StationId::new(83)),
            "http://localhost:8080/station/83"
        );
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn default_detail_url_substitutes_id() {
        let config = FeedConfig::default();
        assert_eq!(
            config.detail_url_for(StationId::new(12)),
            "http://www.vlille.fr/stations/xml-station.aspx?borne=12"
        );
    }

    #[test]
    fn client_builds_with_and_without_timeout() {
        assert!(FeedClient::new(FeedConfig::default()).is_ok());
        let config = FeedConfig::default().with_timeout(Duration::from_secs(1));
        assert!(FeedClient::new(config).is_ok());
    }

    #[test]
    fn normalizes_utf16_declaration() {
        let body = r#"<?xml version="1.0" encoding="utf-16"?><markers/>"#.to_string();
        assert_eq!(
            normalize_declared_charset(body),
            r#"<?xml version="1.0" encoding="utf-8"?><markers/>"#
        );

        for label in ["UTF-16", "Utf-16"] {
            let body = format!(r#"<?xml version="1.0" encoding="{label}"?><markers/>"#);
            assert_eq!(
                normalize_declared_charset(body),
                r#"<?xml version="1.0" encoding="utf-8"?><markers/>"#
            );
        }
    }

    #[test]
    fn leaves_body_text_alone() {
        let body = r#"<?xml version="1.0"?><station><adress>utf-16 street</adress></station>"#;
        assert_eq!(normalize_declared_charset(body.to_string()), body);

        let no_declaration = "<markers name=\"utf-16\"/>";
        assert_eq!(
            normalize_declared_charset(no_declaration.to_string()),
            no_declaration
        );
    }

    #[tokio::test]
    async fn fetch_reports_error_status() {
        let url = serve_once("503 Service Unavailable", "text/plain", b"").await;

        let err = client().fetch(&url).await.unwrap_err();
        assert!(err.is_fetch());
        assert!(matches!(err, StationError::Api { status: 503, url: ref u } if *u == url));
    }

    #[tokio::test]
    async fn fetch_normalizes_mislabelled_body() {
        let body = "<?xml version=\"1.0\" encoding=\"utf-16\"?>\
            <station><adress>Place de la République</adress><bikes>3</bikes></station>";
        let url = serve_once("200 OK", "text/xml; charset=utf-16", body.as_bytes()).await;

        let text = client().fetch(&url).await.unwrap();
        assert!(text.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));

        let occupancy = decode_detail(&text).unwrap();
        assert_eq!(occupancy.address, "Place de la République");
        assert_eq!(occupancy.bikes, 3);
    }

    #[tokio::test]
    async fn fetch_rejects_invalid_utf8() {
        let body = b"<?xml version=\"1.0\" encoding=\"utf-16\"?>\
            <station><adress>Place de la R\xE9publique</adress><bikes>3</bikes></station>";
        let url = serve_once("200 OK", "text/xml", body).await;

        let err = client().fetch(&url).await.unwrap_err();
        assert!(matches!(err, StationError::Decode { .. }));
        assert!(!err.is_fetch());
    }

    #[tokio::test]
    async fn fetch_connection_refused_is_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client().fetch(&format!("http://{addr}/")).await.unwrap_err();
        assert!(matches!(err, StationError::Http(_)));
        assert!(err.is_fetch());
    }
}
