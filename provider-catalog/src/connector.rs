//! Catalog API connector implementation
//!
//! Implements the `CatalogService` trait over the catalog's JSON HTTP API.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use core_library::catalog::CatalogService;
use core_library::models::{SubdirectoryInfo, VideoId, VideoRecord};
use core_runtime::config::CoreConfig;
use core_runtime::logging::redact_url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{CatalogError, Result};
use crate::types::{CreateRequest, PreviewResponse, UpdateRequest, UpdateResponse};

/// Catalog API connector
///
/// # Features
///
/// - Endpoint URLs joined onto a validated base URL
/// - Percent-encoded path segments and query values
/// - Read-only requests retried according to a [`RetryPolicy`]
/// - Preview and mutating requests executed exactly once
///
/// # Example
///
/// ```ignore
/// use provider_catalog::CatalogConnector;
/// use core_library::CatalogService;
///
/// let connector = CatalogConnector::from_config(&config);
/// let videos = connector.list_videos("unsorted").await?;
/// ```
pub struct CatalogConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Service root; always ends with `/`
    base_url: Url,

    /// Per-request timeout
    timeout: Duration,

    /// Policy for list/detail/probe requests
    read_retry: RetryPolicy,
}

impl CatalogConnector {
    /// Create a new catalog connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `base_url` - Root of the catalog service
    /// * `timeout` - Timeout applied to every request
    /// * `read_retry` - Retry policy for read-only requests
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: Url,
        timeout: Duration,
        read_retry: RetryPolicy,
    ) -> Self {
        Self {
            http_client,
            base_url,
            timeout,
            read_retry,
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            Arc::clone(&config.http_client),
            config.base_url.clone(),
            config.request_timeout,
            config.read_retry.clone(),
        )
    }

    /// Build an endpoint URL; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .header("Accept", "application/json")
            .timeout(self.timeout)
    }

    /// Execute a read-only request under the read retry policy.
    async fn read(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self
            .http_client
            .execute_with_retry(request, self.read_retry.clone())
            .await?;
        Self::check_status(response)
    }

    /// Execute a request exactly once.
    async fn send_once(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.http_client.execute(request).await?;
        Self::check_status(response)
    }

    fn check_status(response: HttpResponse) -> Result<HttpResponse> {
        if response.is_success() {
            return Ok(response);
        }

        warn!("Catalog request failed: status={}", response.status);
        Err(CatalogError::Api {
            status_code: response.status,
            message: String::from_utf8_lossy(&response.body).trim().to_string(),
        })
    }

    fn parse<T: DeserializeOwned>(response: &HttpResponse, what: &str) -> Result<T> {
        serde_json::from_slice(&response.body)
            .map_err(|e| CatalogError::Parse(format!("Failed to parse {}: {}", what, e)))
    }
}

#[async_trait]
impl CatalogService for CatalogConnector {
    #[instrument(skip(self))]
    async fn list_subdirectories(&self) -> core_library::Result<Vec<SubdirectoryInfo>> {
        let url = self.endpoint(&["subdirs"])?;
        let response = self.read(self.request(HttpMethod::Get, url)).await?;
        let subdirs: Vec<SubdirectoryInfo> = Self::parse(&response, "subdirectory list")?;

        info!("Listed {} subdirectories", subdirs.len());
        Ok(subdirs)
    }

    #[instrument(skip(self))]
    async fn list_videos(&self, subdir: &str) -> core_library::Result<Vec<VideoRecord>> {
        let url = self.endpoint(&["videos"])?;
        let request = self.request(HttpMethod::Get, url).query("subdir", subdir);
        let response = self.read(request).await?;
        let videos: Vec<VideoRecord> = Self::parse(&response, "video list")?;

        info!("Listed {} videos in '{}'", videos.len(), subdir);
        Ok(videos)
    }

    #[instrument(skip(self, id), fields(video_id = %id))]
    async fn get_video(&self, id: &VideoId) -> core_library::Result<VideoRecord> {
        let url = self.endpoint(&["videos", id.as_str()])?;
        let response = self.read(self.request(HttpMethod::Get, url)).await?;
        let record = Self::parse(&response, "video record")?;

        debug!("Fetched detail record");
        Ok(record)
    }

    #[instrument(skip(self, id), fields(video_id = %id))]
    async fn preview_relpath(&self, id: &VideoId, template: &str) -> core_library::Result<String> {
        let url = self.endpoint(&["videos", id.as_str(), "preview_relpath"])?;
        let request = self
            .request(HttpMethod::Get, url)
            .query("formatstr", template);
        let response = self.send_once(request).await?;
        let preview: PreviewResponse = Self::parse(&response, "preview response")?;

        Ok(preview.relpath)
    }

    #[instrument(skip(self, id), fields(video_id = %id))]
    async fn update_relpath(&self, id: &VideoId, relpath: &str) -> core_library::Result<String> {
        let url = self.endpoint(&["videos", id.as_str()])?;
        let request = self
            .request(HttpMethod::Put, url)
            .json(&UpdateRequest { relpath })?;
        let response = self.send_once(request).await?;
        let updated: UpdateResponse = Self::parse(&response, "update response")?;

        info!("Video moved to '{}'", updated.relpath);
        Ok(updated.relpath)
    }

    #[instrument(skip(self, id), fields(video_id = %id))]
    async fn delete_video(&self, id: &VideoId) -> core_library::Result<()> {
        let url = self.endpoint(&["videos", id.as_str()])?;
        self.send_once(self.request(HttpMethod::Delete, url)).await?;

        info!("Video deleted");
        Ok(())
    }

    #[instrument(skip(self, url), fields(source = %redact_url(url)))]
    async fn create_video(&self, url: &str, subdir: &str) -> core_library::Result<Value> {
        let endpoint = self.endpoint(&["videos"])?;
        let request = self
            .request(HttpMethod::Post, endpoint)
            .json(&CreateRequest { url, subdir })?;
        let response = self.send_once(request).await?;
        let info: Value = Self::parse(&response, "download acknowledgement")?;

        info!("Download accepted into '{}'", subdir);
        Ok(info)
    }

    #[instrument(skip(self, id), fields(video_id = %id))]
    async fn probe_video(&self, id: &VideoId) -> core_library::Result<Value> {
        let url = self.endpoint(&["videos", id.as_str(), "ffprobe"])?;
        let response = self.read(self.request(HttpMethod::Get, url)).await?;
        Ok(Self::parse(&response, "ffprobe output")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use bytes::Bytes;
    use core_library::LibraryError;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> bridge_traits::error::Result<HttpResponse>;
            async fn execute_with_retry(
                &self,
                request: HttpRequest,
                policy: RetryPolicy,
            ) -> bridge_traits::error::Result<HttpResponse>;
        }
    }

    fn ok(body: &str) -> bridge_traits::error::Result<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        })
    }

    fn status(code: u16, body: &str) -> bridge_traits::error::Result<HttpResponse> {
        Ok(HttpResponse {
            status: code,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        })
    }

    fn connector(mock_http: MockHttpClient) -> CatalogConnector {
        CatalogConnector::new(
            Arc::new(mock_http),
            Url::parse("http://localhost:8088/").unwrap(),
            Duration::from_secs(5),
            RetryPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_list_subdirectories() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute_with_retry()
            .withf(|req, policy| {
                req.method == HttpMethod::Get
                    && req.url == "http://localhost:8088/subdirs"
                    && *policy == RetryPolicy::default()
            })
            .times(1)
            .returning(|_, _| ok(r#"[{"name":"music","folder_jpg":"music/folder.jpg"},{"name":"talks"}]"#));

        let subdirs = connector(mock_http).list_subdirectories().await.unwrap();

        assert_eq!(subdirs.len(), 2);
        assert_eq!(subdirs[0].folder_jpg.as_deref(), Some("music/folder.jpg"));
        assert_eq!(subdirs[1].name, "talks");
    }

    #[tokio::test]
    async fn test_list_videos_encodes_subdir() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute_with_retry()
            .withf(|req, _| req.url == "http://localhost:8088/videos?subdir=Talks%20%26%20Slides")
            .times(1)
            .returning(|_, _| {
                ok(r#"[
                    {"id":"a","relpath":"Talks & Slides/a.mp4","subdir":"Talks & Slides","filename":"a.mp4"},
                    {"id":"b","relpath":"Talks & Slides/b.mp4","subdir":"Talks & Slides","filename":"b.mp4"}
                ]"#)
            });

        let videos = connector(mock_http).list_videos("Talks & Slides").await.unwrap();

        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].id.as_str(), "a");
        assert!(videos.iter().all(|v| v.meta.is_none()));
    }

    #[tokio::test]
    async fn test_get_video_encodes_id_segment() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute_with_retry()
            .withf(|req, _| req.url == "http://localhost:8088/videos/a%2Fb")
            .times(1)
            .returning(|_, _| {
                ok(r#"{"id":"a/b","relpath":"unsorted/x.mp4","subdir":"unsorted","filename":"x.mp4",
                       "meta":{"title":"X","thumbnail":"https://img/x.jpg"}}"#)
            });

        let record = connector(mock_http).get_video(&"a/b".into()).await.unwrap();
        assert_eq!(record.title(), Some("X"));
    }

    #[tokio::test]
    async fn test_preview_is_not_retried() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute_with_retry().times(0);
        mock_http
            .expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Get
                    && req.url
                        == "http://localhost:8088/videos/abc/preview_relpath?formatstr=%25%28title%29s-%25%28id%29s.%25%28ext%29s"
            })
            .times(1)
            .returning(|_| ok(r#"{"id":"abc","relpath":"unsorted/Talk-abc.mp4"}"#));

        let relpath = connector(mock_http)
            .preview_relpath(&"abc".into(), "%(title)s-%(id)s.%(ext)s")
            .await
            .unwrap();

        assert_eq!(relpath, "unsorted/Talk-abc.mp4");
    }

    #[tokio::test]
    async fn test_update_relpath_sends_json_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| {
                let body: Value = serde_json::from_slice(req.body.as_deref().unwrap_or_default())
                    .unwrap_or(Value::Null);
                req.method == HttpMethod::Put
                    && req.url == "http://localhost:8088/videos/abc"
                    && body == serde_json::json!({"relpath": "talks/Talk-abc.mp4"})
                    && req.headers.get("Content-Type").map(String::as_str) == Some("application/json")
            })
            .times(1)
            .returning(|_| ok(r#"{"id":"abc","relpath":"talks/Talk-abc (1).mp4"}"#));

        let relpath = connector(mock_http)
            .update_relpath(&"abc".into(), "talks/Talk-abc.mp4")
            .await
            .unwrap();

        assert_eq!(relpath, "talks/Talk-abc (1).mp4");
    }

    #[tokio::test]
    async fn test_delete_accepts_null_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| req.method == HttpMethod::Delete && req.url == "http://localhost:8088/videos/abc")
            .times(1)
            .returning(|_| ok("null"));

        connector(mock_http).delete_video(&"abc".into()).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_video_posts_url_and_subdir() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| {
                let body: Value = serde_json::from_slice(req.body.as_deref().unwrap_or_default())
                    .unwrap_or(Value::Null);
                req.method == HttpMethod::Post
                    && body["url"] == "https://www.youtube.com/watch?v=abc"
                    && body["subdir"] == "talks"
            })
            .times(1)
            .returning(|_| ok(r#"{"id":"abc","title":"Talk","ext":"mp4"}"#));

        let info = connector(mock_http)
            .create_video("https://www.youtube.com/watch?v=abc", "talks")
            .await
            .unwrap();

        assert_eq!(info["title"], "Talk");
    }

    #[tokio::test]
    async fn test_probe_uses_read_policy() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute_with_retry()
            .withf(|req, _| req.url == "http://localhost:8088/videos/abc/ffprobe")
            .times(1)
            .returning(|_, _| ok(r#"{"streams":[{"codec_type":"video"}]}"#));

        let probe = connector(mock_http).probe_video(&"abc".into()).await.unwrap();
        assert_eq!(probe["streams"][0]["codec_type"], "video");
    }

    #[tokio::test]
    async fn test_api_error_handling() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| status(404, "no such video\n"));

        let err = connector(mock_http)
            .update_relpath(&"nope".into(), "x.mp4")
            .await
            .unwrap_err();

        match err {
            LibraryError::CatalogStatus {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 404);
                assert_eq!(message, "no such video");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_parse_error_handling() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute_with_retry()
            .times(1)
            .returning(|_, _| ok(r#"{"not":"a list"}"#));

        let err = connector(mock_http).list_videos("unsorted").await.unwrap_err();
        assert!(matches!(err, LibraryError::CatalogDecode(_)));
    }

    #[tokio::test]
    async fn test_bridge_error_passthrough() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::Timeout("5s".to_string())));

        let err = connector(mock_http).delete_video(&"abc".into()).await.unwrap_err();
        assert!(matches!(err, LibraryError::Bridge(BridgeError::Timeout(_))));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let connector = CatalogConnector::new(
            Arc::new(MockHttpClient::new()),
            Url::parse("http://nas.local/library/").unwrap(),
            Duration::from_secs(5),
            RetryPolicy::none(),
        );

        assert_eq!(
            connector.endpoint(&["videos", "abc", "ffprobe"]).unwrap(),
            "http://nas.local/library/videos/abc/ffprobe"
        );
    }
}
