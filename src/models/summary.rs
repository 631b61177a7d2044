use std::str::FromStr;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SummaryFormat {
    #[default]
    #[serde(rename = "Key Topics (bullets)")]
    KeyTopics,
    #[serde(rename = "Detailed Paragraph")]
    DetailedParagraph,
    #[serde(rename = "Abstract (1-2 sentences)")]
    Abstract,
}

impl SummaryFormat {
    pub const ALL: [SummaryFormat; 3] = [
        SummaryFormat::KeyTopics,
        SummaryFormat::DetailedParagraph,
        SummaryFormat::Abstract,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SummaryFormat::KeyTopics => "Key Topics (bullets)",
            SummaryFormat::DetailedParagraph => "Detailed Paragraph",
            SummaryFormat::Abstract => "Abstract (1-2 sentences)",
        }
    }

    /// Instruction sent to the model for this format.
    pub fn instruction(&self) -> &'static str {
        match self {
            SummaryFormat::KeyTopics => {
                "Provide a concise bulleted list of the main topics, using markdown for formatting."
            }
            SummaryFormat::DetailedParagraph => {
                "Provide a well-structured paragraph summarizing the entire content in detail."
            }
            SummaryFormat::Abstract => {
                "Provide a one or two-sentence high-level summary, like an abstract for a paper."
            }
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            SummaryFormat::KeyTopics => SummaryFormat::DetailedParagraph,
            SummaryFormat::DetailedParagraph => SummaryFormat::Abstract,
            SummaryFormat::Abstract => SummaryFormat::KeyTopics,
        }
    }
}

impl std::fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SummaryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "key-topics" | "keytopics" | "topics" | "bullets" => Ok(SummaryFormat::KeyTopics),
            "detailed" | "detailed-paragraph" | "paragraph" => Ok(SummaryFormat::DetailedParagraph),
            "abstract" => Ok(SummaryFormat::Abstract),
            other => Err(format!(
                "unknown format '{other}' (expected key-topics, detailed or abstract)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    pub title: String,
    pub thumbnail: String,
}

/// A finished summary as kept in history. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    /// Creation time in ISO-8601 (UTC, millisecond precision). Sorts as a string.
    pub id: String,
    pub video_title: String,
    pub video_thumbnail: String,
    pub video_url: String,
    pub summary: String,
    pub format: SummaryFormat,
    /// Local date for display.
    pub created_at: String,
}

impl SummaryResult {
    pub fn new(
        video_url: &str,
        details: VideoDetails,
        summary: String,
        format: SummaryFormat,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id: created.to_rfc3339_opts(SecondsFormat::Millis, true),
            video_title: details.title,
            video_thumbnail: details.thumbnail,
            video_url: video_url.to_string(),
            summary,
            format,
            created_at: created.with_timezone(&Local).format("%-m/%-d/%Y").to_string(),
        }
    }
}
