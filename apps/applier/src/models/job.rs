use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which adapter (job board family) produced a posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Jobright,
    Greenhouse,
    Lever,
    Workday,
    Icims,
    #[default]
    #[serde(other)]
    Custom,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Jobright => "jobright",
            SourceTag::Greenhouse => "greenhouse",
            SourceTag::Lever => "lever",
            SourceTag::Workday => "workday",
            SourceTag::Icims => "icims",
            SourceTag::Custom => "custom",
        }
    }
}

/// A candidate opportunity. `url` is the identity key across cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub source: SourceTag,
}

impl JobPosting {
    /// Builds a posting from a loosely-shaped job dictionary.
    ///
    /// Returns `None` when `title`, `company` or `url` is missing or blank.
    /// Postings without their own `source` key take `fallback_source`.
    pub fn from_raw(raw: &Value, fallback_source: SourceTag) -> Option<Self> {
        let field = |key: &str| {
            raw.get(key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let source = raw
            .get("source")
            .cloned()
            .and_then(|v| serde_json::from_value::<SourceTag>(v).ok())
            .unwrap_or(fallback_source);

        Some(JobPosting {
            title: field("title")?,
            company: field("company")?,
            location: field("location"),
            description: field("description").unwrap_or_default(),
            url: field("url")?,
            source,
        })
    }

    pub fn location_or_empty(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }
}
