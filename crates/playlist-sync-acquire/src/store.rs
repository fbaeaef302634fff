// GitHub Contents API as a versioned content store.
//
// A write reads the current blob sha first and sends it back with the new
// content. If someone else committed in between, the sha is stale and
// GitHub rejects the write; that rejection is returned as-is, never retried.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::StatusCode;
use thiserror::Error;

use crate::types::{ContentsResponse, PutContents, PutResponse};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("write to '{path}' conflicts with a newer version (HTTP {status})")]
    Conflict { path: String, status: u16 },

    #[error("write to '{path}' rejected: HTTP {status}: {body}")]
    Rejected { path: String, status: u16, body: String },

    #[error("read of '{path}' failed: HTTP {status}")]
    ReadFailed { path: String, status: u16 },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Coordinates of the remote file and the credential to write it.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub api_url: String,
    /// `owner/name`
    pub repo: String,
    pub branch: String,
    pub token: String,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("api_url", &self.api_url)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Current version of a stored file. Only its version token is needed;
/// the stored content is never decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub sha: String,
    pub path: String,
}

impl From<ContentsResponse> for StoredFile {
    fn from(body: ContentsResponse) -> Self {
        Self {
            sha: body.sha,
            path: body.path,
        }
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub path: String,
    pub created: bool,
    pub commit: Option<String>,
}

pub struct GitHubStore {
    client: reqwest::Client,
    config: StoreConfig,
}

impl GitHubStore {
    pub fn new(client: reqwest::Client, config: StoreConfig) -> Self {
        Self { client, config }
    }

    fn contents_url(&self, path: &str) -> String {
        contents_url(&self.config.api_url, &self.config.repo, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.contents_url(path))
            .bearer_auth(&self.config.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }

    /// Read the current version of `path` on the configured branch.
    ///
    /// Returns `None` when the file does not exist yet.
    pub async fn read(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let response = self
            .request(reqwest::Method::GET, path)
            .query(&[("ref", self.config.branch.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(path, "No stored version yet");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::ReadFailed {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let stored = StoredFile::from(response.json::<ContentsResponse>().await?);
        tracing::debug!(path = %stored.path, sha = %stored.sha, "Read stored version");
        Ok(Some(stored))
    }

    /// Write `content` to `path`. `sha` must be the version being replaced,
    /// or `None` to create the file.
    pub async fn write(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<WriteReceipt, StoreError> {
        let body = put_body(content, message, &self.config.branch, sha);
        let response = self
            .request(reqwest::Method::PUT, path)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        check_put_status(path, status, &text)?;

        let parsed = parse_put_response(path, &text);
        Ok(WriteReceipt {
            path: parsed
                .content
                .map(|c| c.path)
                .unwrap_or_else(|| path.to_string()),
            created: status == StatusCode::CREATED,
            commit: parsed.commit.map(|c| c.sha),
        })
    }

    /// Read the current version token, then write against it.
    pub async fn upsert(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<WriteReceipt, StoreError> {
        let current = self.read(path).await?;
        let sha = current.as_ref().map(|f| f.sha.as_str());
        tracing::info!(
            repo = %self.config.repo,
            branch = %self.config.branch,
            path,
            exists = sha.is_some(),
            "Writing to GitHub"
        );
        self.write(path, content, message, sha).await
    }
}

pub fn contents_url(api_url: &str, repo: &str, path: &str) -> String {
    format!(
        "{}/repos/{}/contents/{}",
        api_url.trim_end_matches('/'),
        repo.trim_matches('/'),
        path.trim_start_matches('/')
    )
}

pub fn put_body(content: &str, message: &str, branch: &str, sha: Option<&str>) -> PutContents {
    PutContents {
        message: message.to_string(),
        content: STANDARD.encode(content.as_bytes()),
        branch: branch.to_string(),
        sha: sha.map(String::from),
    }
}

/// Parse a successful PUT body. The write already succeeded, so an
/// unreadable body only loses the commit sha.
pub fn parse_put_response(path: &str, body: &str) -> PutResponse {
    serde_json::from_str(body).unwrap_or_else(|e| {
        tracing::debug!(path, "Unreadable write response, commit sha unknown: {e}");
        PutResponse::default()
    })
}

/// Map a PUT status to success, a version conflict, or a plain rejection.
pub fn check_put_status(path: &str, status: StatusCode, body: &str) -> Result<(), StoreError> {
    match status {
        StatusCode::OK | StatusCode::CREATED => Ok(()),
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => Err(StoreError::Conflict {
            path: path.to_string(),
            status: status.as_u16(),
        }),
        other => Err(StoreError::Rejected {
            path: path.to_string(),
            status: other.as_u16(),
            body: body.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_url() {
        assert_eq!(
            contents_url("https://api.github.com/", "a7shk1/m3u-broadcast", "/dazn.m3u"),
            "https://api.github.com/repos/a7shk1/m3u-broadcast/contents/dazn.m3u"
        );
    }

    #[test]
    fn test_put_body_with_and_without_sha() {
        let body = put_body("#EXTM3U\n", "update", "main", Some("abc123"));
        assert_eq!(body.content, "I0VYVE0zVQo=");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["sha"], "abc123");
        assert_eq!(json["branch"], "main");

        let create = put_body("#EXTM3U\n", "create", "main", None);
        let json = serde_json::to_value(&create).unwrap();
        assert!(json.get("sha").is_none());
    }

    #[test]
    fn test_check_put_status() {
        assert!(check_put_status("x", StatusCode::OK, "").is_ok());
        assert!(check_put_status("x", StatusCode::CREATED, "").is_ok());
        assert!(matches!(
            check_put_status("x", StatusCode::CONFLICT, "sha mismatch"),
            Err(StoreError::Conflict { status: 409, .. })
        ));
        assert!(matches!(
            check_put_status("x", StatusCode::UNPROCESSABLE_ENTITY, ""),
            Err(StoreError::Conflict { status: 422, .. })
        ));
        match check_put_status("x", StatusCode::UNAUTHORIZED, "Bad credentials") {
            Err(StoreError::Rejected { status, body, .. }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "Bad credentials");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_debug_hides_token() {
        let config = StoreConfig {
            api_url: DEFAULT_API_URL.to_string(),
            repo: "o/r".to_string(),
            branch: "main".to_string(),
            token: "ghp_secret".to_string(),
        };
        assert!(!format!("{config:?}").contains("ghp_secret"));
    }

    #[test]
    fn test_parse_put_response() {
        let parsed = parse_put_response(
            "bein.m3u",
            r#"{"content":{"path":"www/bein.m3u","sha":"b1"},"commit":{"sha":"c1"}}"#,
        );
        assert_eq!(parsed.content.unwrap().path, "www/bein.m3u");
        assert_eq!(parsed.commit.unwrap().sha, "c1");

        let fallback = parse_put_response("bein.m3u", "<html>proxy error</html>");
        assert!(fallback.content.is_none());
        assert!(fallback.commit.is_none());
    }

    #[test]
    fn test_stored_version_ignores_content() {
        // Latin-1 bytes: "#EXTM3U\n\xE9" is not valid UTF-8.
        let body: ContentsResponse = serde_json::from_str(
            r#"{"sha":"deadbeef","path":"bein.m3u","content":"I0VYVE0zVQrp\n","encoding":"base64","size":9}"#,
        )
        .unwrap();
        let stored = StoredFile::from(body);
        assert_eq!(stored.sha, "deadbeef");
        assert_eq!(stored.path, "bein.m3u");
    }
}
