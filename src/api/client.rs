//! Tumblr HTTP client.

use reqwest::{header, Client, Response, StatusCode};

use crate::config::{Config, ProxyMap};
use crate::error::{Error, Result};
use crate::media::MediaKind;

/// HTTP client shared by the feed walker and every download worker.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct TumblrClient {
    client: Client,
    feed_url_template: String,
}

impl TumblrClient {
    /// Build a client with the configured timeout, user agent and proxies.
    pub fn new(config: &Config, proxies: Option<&ProxyMap>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.network.user_agent)
            .timeout(config.timeout());

        if let Some(proxies) = proxies {
            for proxy in proxies.to_proxies()? {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::from_client(
            client,
            config.network.feed_url_template.clone(),
        ))
    }

    /// Wrap an existing `reqwest` client.
    pub fn from_client(client: Client, feed_url_template: String) -> Self {
        Self {
            client,
            feed_url_template,
        }
    }

    /// Feed endpoint for a site, without query parameters.
    pub fn feed_endpoint(&self, site: &str) -> String {
        self.feed_url_template.replace("{site}", site)
    }

    /// Full feed URL of one page, as used in log messages.
    pub fn feed_url(&self, site: &str, kind: MediaKind, num: u32, start: u64) -> String {
        format!(
            "{}?type={}&num={}&start={}",
            self.feed_endpoint(site),
            kind,
            num,
            start
        )
    }

    /// Fetch one raw feed page.
    ///
    /// A 404 becomes [`Error::SiteNotFound`]; any other non-success status becomes
    /// [`Error::HttpStatus`].
    pub async fn get_feed_page(
        &self,
        site: &str,
        kind: MediaKind,
        num: u32,
        start: u64,
    ) -> Result<Vec<u8>> {
        let endpoint = self.feed_endpoint(site);
        tracing::debug!("GET {}", self.feed_url(site, kind, num, start));

        let response = self
            .client
            .get(&endpoint)
            .query(&[
                ("type", kind.as_str().to_string()),
                ("num", num.to_string()),
                ("start", start.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == StatusCode::NOT_FOUND {
            return Err(Error::SiteNotFound(site.to_string()));
        }

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: self.feed_url(site, kind, num, start),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Start downloading a file; the caller inspects status and headers.
    pub async fn get_file(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "*/*")
            .send()
            .await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TumblrClient {
        TumblrClient::from_client(
            Client::new(),
            format!("{}/{{site}}/api/read", server.uri()),
        )
    }

    #[test]
    fn test_feed_url_format() {
        let client = TumblrClient::from_client(
            Client::new(),
            "https://{site}.tumblr.com/api/read".into(),
        );
        assert_eq!(
            client.feed_url("staff", MediaKind::Photo, 50, 100),
            "https://staff.tumblr.com/api/read?type=photo&num=50&start=100"
        );
    }

    #[tokio::test]
    async fn test_get_feed_page_sends_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/staff/api/read"))
            .and(query_param("type", "video"))
            .and(query_param("num", "20"))
            .and(query_param("start", "40"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<tumblr/>"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client_for(&server)
            .get_feed_page("staff", MediaKind::Video, 20, 40)
            .await
            .unwrap();
        assert_eq!(body, b"<tumblr/>");
    }

    #[tokio::test]
    async fn test_get_feed_page_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_feed_page("ghost", MediaKind::Photo, 50, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SiteNotFound(ref s) if s == "ghost"));
    }

    #[tokio::test]
    async fn test_get_feed_page_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_feed_page("staff", MediaKind::Photo, 50, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 502, .. }));
    }

    #[test]
    fn test_new_rejects_bad_proxy() {
        let proxies = ProxyMap::from_json(r#"{"gopher": "http://127.0.0.1:70"}"#).unwrap();
        let err = TumblrClient::new(&Config::default(), Some(&proxies)).unwrap_err();
        assert!(matches!(err, Error::InvalidProxy(_)));
    }
}
