use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CATEGORY_ID, DEFAULT_MEDIA_TYPE};

/// Visibility of the created video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    #[default]
    Unlisted,
    Private,
}

impl Privacy {
    /// Returns the `privacyStatus` value sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Unlisted => "unlisted",
            Privacy::Private => "private",
        }
    }
}

impl std::str::FromStr for Privacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Privacy::Public),
            "unlisted" => Ok(Privacy::Unlisted),
            "private" => Ok(Privacy::Private),
            other => Err(format!("unknown privacy status: {other}")),
        }
    }
}

/// Metadata describing a video to upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Human-readable category name, mapped through [`category_id`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub privacy: Privacy,
    #[serde(default)]
    pub made_for_kids: bool,
    /// MIME type of the media, sent as `X-Upload-Content-Type`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub media_type: String,
}

impl VideoMetadata {
    /// Creates metadata with a title and defaults for everything else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Returns the media type, falling back to [`DEFAULT_MEDIA_TYPE`].
    pub fn media_type(&self) -> &str {
        if self.media_type.is_empty() {
            DEFAULT_MEDIA_TYPE
        } else {
            &self.media_type
        }
    }

    /// Returns the numeric category identifier for this video.
    pub fn category_id(&self) -> &'static str {
        category_id(self.category.as_deref())
    }

    /// Builds the JSON body of the session-initiation request.
    pub fn insert_body(&self) -> serde_json::Value {
        let mut snippet = serde_json::json!({
            "title": self.title,
            "description": self.description,
            "categoryId": self.category_id(),
        });
        if !self.tags.is_empty() {
            snippet["tags"] = serde_json::json!(self.tags);
        }

        serde_json::json!({
            "snippet": snippet,
            "status": {
                "privacyStatus": self.privacy.as_str(),
                "selfDeclaredMadeForKids": self.made_for_kids,
            },
        })
    }
}

/// Maps a human-readable category name to the remote numeric identifier.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
/// Unknown or absent names map to [`DEFAULT_CATEGORY_ID`].
pub fn category_id(name: Option<&str>) -> &'static str {
    let Some(name) = name else {
        return DEFAULT_CATEGORY_ID;
    };
    match name.trim().to_ascii_lowercase().as_str() {
        "education" => "27",
        "technology" | "business" => "28",
        "entertainment" => "24",
        "music" => "10",
        "news" => "25",
        "gaming" => "20",
        "sports" => "17",
        _ => DEFAULT_CATEGORY_ID,
    }
}
