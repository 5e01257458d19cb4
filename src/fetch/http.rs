use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    Client, ClientBuilder, Proxy, Response, StatusCode, Url,
    header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde_json::json;

use crate::{
    config::FetchConfig,
    error::CrawlError,
    fetch::Fetcher,
    models::{FetchedContent, SearchRequest},
    platforms,
};

const ERROR_BODY_LIMIT: usize = 200;

/// Plain HTTP for JSON APIs, a Browserless `/content` endpoint for pages that
/// only show their structure once rendered.
///
/// The configured proxy applies to page requests. The render endpoint is called
/// directly and told to load the page through the proxy itself.
pub struct HttpFetcher {
    client: Client,
    render: Option<(Client, Url)>,
    wait_timeout: Duration,
}

fn render_endpoint(base_url: &str, token: Option<&str>, proxy: Option<&str>) -> Result<Url> {
    let mut endpoint = Url::parse(&format!("{}/content", base_url.trim_end_matches('/')))
        .with_context(|| format!("Invalid render_url {base_url}"))?;

    {
        let mut query = endpoint.query_pairs_mut();
        if let Some(token) = token {
            query.append_pair("token", token);
        }
        if let Some(proxy) = proxy {
            query.append_pair("--proxy-server", proxy);
        }
    }
    if endpoint.query() == Some("") {
        endpoint.set_query(None);
    }

    Ok(endpoint)
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/html"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .context("Invalid accept_language header")?,
        );

        let base = || {
            Client::builder()
                .default_headers(headers.clone())
                .user_agent(config.user_agent.as_str())
                .timeout(Duration::from_secs(config.timeout_secs))
        };

        let mut builder: ClientBuilder = base();
        if let Some(proxy) = &config.proxy {
            log::info!("Routing requests through proxy {}", proxy);
            builder = builder.proxy(Proxy::all(proxy).context("Invalid proxy url")?);
        }

        let render = match config.render_url.as_deref() {
            Some(url) => {
                let endpoint = render_endpoint(
                    url,
                    config.render_token.as_deref(),
                    config.proxy.as_deref(),
                )?;
                let client = base()
                    .no_proxy()
                    .build()
                    .context("Failed to build render client")?;
                Some((client, endpoint))
            }
            None => {
                log::warn!("No render_url configured, dynamic pages are fetched without rendering");
                None
            }
        };

        Ok(Self {
            client: builder.build().context("Failed to build HTTP client")?,
            render,
            wait_timeout: Duration::from_secs(config.wait_timeout_secs),
        })
    }

    fn error(request: &SearchRequest, err: reqwest::Error) -> CrawlError {
        if err.is_timeout() {
            CrawlError::Timeout {
                platform: request.platform(),
                target: request.url().to_string(),
            }
        } else {
            CrawlError::Fetch {
                url: request.url().to_string(),
                message: err.to_string(),
            }
        }
    }

    /// `awaiting` is the selector a render was waiting for; a 408 then means it never showed up.
    async fn read(
        request: &SearchRequest,
        response: Response,
        awaiting: Option<&str>,
    ) -> Result<String, CrawlError> {
        let status = response.status();

        if status == StatusCode::REQUEST_TIMEOUT
            && let Some(selector) = awaiting
        {
            return Err(CrawlError::Timeout {
                platform: request.platform(),
                target: selector.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CrawlError::Fetch {
                url: request.url().to_string(),
                message: format!(
                    "status {}: {}",
                    status.as_u16(),
                    body.chars().take(ERROR_BODY_LIMIT).collect::<String>()
                ),
            });
        }

        response.text().await.map_err(|e| Self::error(request, e))
    }

    async fn get(&self, request: &SearchRequest) -> Result<String, CrawlError> {
        let response = self
            .client
            .get(request.url().clone())
            .send()
            .await
            .map_err(|e| Self::error(request, e))?;

        Self::read(request, response, None).await
    }

    async fn render(
        &self,
        client: &Client,
        endpoint: &Url,
        request: &SearchRequest,
        selector: &str,
    ) -> Result<String, CrawlError> {
        let body = json!({
            "url": request.url().as_str(),
            "waitForSelector": {
                "selector": selector,
                "timeout": self.wait_timeout.as_millis() as u64,
            },
        });

        let response = client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::error(request, e))?;

        Self::read(request, response, Some(selector)).await
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &SearchRequest) -> Result<FetchedContent, CrawlError> {
        let wait_selector = platforms::lookup(request.platform()).wait_selector();
        log::debug!("Fetching {} for {}", request.url(), request.platform());

        match (wait_selector, &self.render) {
            (Some(selector), Some((client, endpoint))) => self
                .render(client, endpoint, request, selector)
                .await
                .map(FetchedContent::Document),
            (Some(_), None) => self.get(request).await.map(FetchedContent::Document),
            (None, _) => self.get(request).await.map(FetchedContent::Text),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        task::JoinHandle,
    };

    use super::*;
    use crate::{config, models::PlatformId};

    fn fetch_config() -> FetchConfig {
        serde_json::from_value(config::defaults()["fetch"].clone()).unwrap()
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Answers a single request with a canned response and hands back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            request
        });

        (base, handle)
    }

    fn request(base: &str, platform: PlatformId) -> SearchRequest {
        let url = Url::parse(&format!("{base}/search?q=rust")).unwrap();
        SearchRequest::new(url, platform, "rust")
    }

    #[test]
    fn test_render_endpoint() {
        assert_eq!(
            render_endpoint("http://browserless:3000/", None, None)
                .unwrap()
                .as_str(),
            "http://browserless:3000/content"
        );
        assert_eq!(
            render_endpoint("https://chrome.example.com", Some("a b&c"), None)
                .unwrap()
                .as_str(),
            "https://chrome.example.com/content?token=a+b%26c"
        );
        assert_eq!(
            render_endpoint("http://localhost:3000", None, Some("http://proxy:8080"))
                .unwrap()
                .as_str(),
            "http://localhost:3000/content?--proxy-server=http%3A%2F%2Fproxy%3A8080"
        );
        assert!(render_endpoint("not a url", None, None).is_err());
    }

    #[test]
    fn test_builds_from_defaults() {
        let fetcher = HttpFetcher::new(&fetch_config()).unwrap();
        assert!(fetcher.render.is_none());
        assert_eq!(fetcher.wait_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_bad_accept_language() {
        let mut config = fetch_config();
        config.accept_language = "en\nUS".to_string();
        assert!(HttpFetcher::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_api_platform_yields_text() {
        let (base, server) = serve_once("200 OK", r#"{"hits": []}"#).await;
        let fetcher = HttpFetcher::new(&fetch_config()).unwrap();

        let content = fetcher.fetch(&request(&base, PlatformId::Hackernews)).await.unwrap();
        assert_eq!(content, FetchedContent::Text(r#"{"hits": []}"#.to_string()));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /search?q=rust HTTP/1.1"));
        assert!(raw.to_lowercase().contains("accept: application/json, text/html"));
        assert!(raw.to_lowercase().contains("accept-language: en-us,en;q=0.9"));
    }

    #[tokio::test]
    async fn test_dom_platform_without_renderer_yields_document() {
        let (base, server) = serve_once("200 OK", "<html><body></body></html>").await;
        let fetcher = HttpFetcher::new(&fetch_config()).unwrap();

        let content = fetcher.fetch(&request(&base, PlatformId::Devto)).await.unwrap();
        assert_eq!(
            content,
            FetchedContent::Document("<html><body></body></html>".to_string())
        );
        assert!(server.await.unwrap().starts_with("GET /search"));
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_error() {
        let (base, server) = serve_once("503 Service Unavailable", "try later").await;
        let fetcher = HttpFetcher::new(&fetch_config()).unwrap();

        let err = fetcher
            .fetch(&request(&base, PlatformId::Github))
            .await
            .unwrap_err();
        match err {
            CrawlError::Fetch { message, .. } => assert_eq!(message, "status 503: try later"),
            other => panic!("unexpected error {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_slow_response_is_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let mut config = fetch_config();
        config.timeout_secs = 1;
        let fetcher = HttpFetcher::new(&config).unwrap();

        let err = fetcher
            .fetch(&request(&base, PlatformId::Reddit))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CrawlError::Timeout { platform: PlatformId::Reddit, .. }
        ));
        server.abort();
    }

    #[tokio::test]
    async fn test_dom_platform_is_rendered() {
        let (render_base, render) = serve_once("200 OK", "<html>rendered</html>").await;

        let mut config = fetch_config();
        config.render_url = Some(render_base);
        config.render_token = Some("secret".to_string());
        let fetcher = HttpFetcher::new(&config).unwrap();

        let page = request("https://dev.to", PlatformId::Devto);
        let content = fetcher.fetch(&page).await.unwrap();
        assert_eq!(
            content,
            FetchedContent::Document("<html>rendered</html>".to_string())
        );

        let raw = render.await.unwrap();
        assert!(raw.starts_with("POST /content?token=secret HTTP/1.1"));
        let body = &raw[raw.find("\r\n\r\n").unwrap() + 4..];
        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(body["url"], "https://dev.to/search?q=rust");
        assert_eq!(body["waitForSelector"]["selector"], "article, .crayons-story");
        assert_eq!(body["waitForSelector"]["timeout"], 10_000);
    }

    #[tokio::test]
    async fn test_render_timeout_status_is_timeout() {
        let (render_base, render) = serve_once("408 Request Timeout", "selector not found").await;

        let mut config = fetch_config();
        config.render_url = Some(render_base);
        let fetcher = HttpFetcher::new(&config).unwrap();

        let err = fetcher
            .fetch(&request("https://www.producthunt.com", PlatformId::Producthunt))
            .await
            .unwrap_err();
        match err {
            CrawlError::Timeout { platform, target } => {
                assert_eq!(platform, PlatformId::Producthunt);
                assert_eq!(target, r#"[class*="post"], [data-test="post"]"#);
            }
            other => panic!("unexpected error {other:?}"),
        }
        render.await.unwrap();
    }

    #[tokio::test]
    async fn test_proxy_carries_pages_but_not_render_calls() {
        let proxy = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let proxy_url = format!("http://{}", proxy.local_addr().unwrap());
        let (render_base, render) = serve_once("200 OK", "<html>rendered</html>").await;

        let mut config = fetch_config();
        config.proxy = Some(proxy_url.clone());
        config.render_url = Some(render_base);
        config.render_token = Some("secret".to_string());
        let fetcher = HttpFetcher::new(&config).unwrap();

        fetcher
            .fetch(&request("https://dev.to", PlatformId::Devto))
            .await
            .unwrap();

        let raw = render.await.unwrap();
        let request_line = raw.lines().next().unwrap();
        assert!(request_line.starts_with("POST /content?token=secret&--proxy-server="));
        assert!(request_line.contains("127.0.0.1"));
        assert!(
            tokio::time::timeout(Duration::from_millis(200), proxy.accept())
                .await
                .is_err(),
            "render call went through the proxy"
        );

        // page requests still use the proxy
        let server = tokio::spawn(async move {
            let (mut stream, _) = proxy.accept().await.unwrap();
            let raw = read_request(&mut stream).await;
            let response = "HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}";
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            raw
        });

        let content = fetcher
            .fetch(&request("http://api.example.invalid", PlatformId::Github))
            .await
            .unwrap();
        assert_eq!(content, FetchedContent::Text("{}".to_string()));
        assert!(
            server
                .await
                .unwrap()
                .starts_with("GET http://api.example.invalid/search?q=rust")
        );
    }
}
