use serde::{Deserialize, Serialize};

/// The video resource returned by the server when the upload completes.
///
/// Only the fields the client consumes are modelled; anything else in the
/// response is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<VideoSnippet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Thumbnails::is_empty")]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.medium.is_none() && self.high.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub privacy_status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub upload_status: String,
}

impl VideoResource {
    /// Returns the echoed title, or an empty string.
    pub fn title(&self) -> &str {
        self.snippet.as_ref().map(|s| s.title.as_str()).unwrap_or("")
    }

    /// Returns the echoed description, or an empty string.
    pub fn description(&self) -> &str {
        self.snippet
            .as_ref()
            .map(|s| s.description.as_str())
            .unwrap_or("")
    }

    /// Returns the best available thumbnail URL (high, then medium, then default).
    pub fn thumbnail_url(&self) -> Option<&str> {
        let thumbs = &self.snippet.as_ref()?.thumbnails;
        thumbs
            .high
            .as_ref()
            .or(thumbs.medium.as_ref())
            .or(thumbs.default.as_ref())
            .map(|t| t.url.as_str())
    }
}
