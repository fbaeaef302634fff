use serde::{Deserialize, Serialize};

/// `GET /repos/{repo}/contents/{path}` response (file variant). The
/// base64 `content` field is not read.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentsResponse {
    pub sha: String,
    pub path: String,
}

/// `PUT /repos/{repo}/contents/{path}` request body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PutContents {
    pub message: String,
    /// Base64-encoded file content.
    pub content: String,
    pub branch: String,
    /// Blob sha of the version being replaced. Omitted when creating a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// `PUT` response; only the fields we report on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PutResponse {
    #[serde(default)]
    pub content: Option<ContentRef>,
    #[serde(default)]
    pub commit: Option<CommitRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentRef {
    pub path: String,
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

/// A scheduled event whose page lists web-player links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    /// Kick-off time as shown on the schedule (e.g., "20:45").
    pub time: String,
    pub url: String,
}
