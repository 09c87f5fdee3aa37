use serde::{Deserialize, Deserializer, Serialize};

/// One posting scraped from the placement noticeboard.
///
/// Identity is `id` alone; the remaining fields are carried as-is. `notice_time`
/// is a display string in `DD-MM-YYYY HH:mm` form, not an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice_by: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notice_time: String,
}

/// Scrapers send `null` for fields they could not read.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Notice {
    /// Copy without the free-text body and author.
    pub fn redacted(&self) -> Self {
        Self {
            notice_text: None,
            notice_by: None,
            ..self.clone()
        }
    }
}

/// The single live collection of notices. Every save replaces it whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub scraped_at: Option<String>,
    #[serde(default)]
    pub total_notices: u64,
    #[serde(default)]
    pub notices: Vec<Notice>,
}

/// Body of an ingest request as the scraper sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestPayload {
    #[serde(default)]
    pub scraped_at: Option<String>,
    #[serde(default)]
    pub total_notices: Option<u64>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestResult {
    pub ok: bool,
    pub total_notices: u64,
    pub new_notices: usize,
    pub pushed: bool,
}

/// Which notice fields may leave the server through public surfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum NoticeExposure {
    #[default]
    Full,
    Redacted,
}

impl NoticeExposure {
    pub fn apply(self, notices: &[Notice]) -> Vec<Notice> {
        match self {
            NoticeExposure::Full => notices.to_vec(),
            NoticeExposure::Redacted => notices.iter().map(Notice::redacted).collect(),
        }
    }
}
