// Core data structures for reelsync

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use thiserror::Error;

/// Milliseconds since the Unix epoch
pub type EpochMillis = i64;

/// Render epoch millis as a UTC timestamp (for logs and CLI output)
pub fn to_datetime(millis: EpochMillis) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

// ============================================================================
// Channel
// ============================================================================

/// A channel as announced by the listing source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Channel {
    pub id: i64,
    pub display_name: String,
    #[serde(default)]
    pub display_number: String,
    /// Whether the channel's reel loops indefinitely
    #[serde(default)]
    pub repeatable: bool,
    /// Opaque provider metadata, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_data: Option<String>,
}

// ============================================================================
// Advertisement
// ============================================================================

/// Advertisement request type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdType {
    Vast,
}

impl Default for AdType {
    fn default() -> Self {
        Self::Vast
    }
}

/// Advertisement embedded in a program's provider data
///
/// Ordered by `start_ms`, then `stop_ms`. The remaining fields only break
/// ties so that `Ord` stays consistent with `Eq`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Advertisement {
    pub start_ms: EpochMillis,
    pub stop_ms: EpochMillis,
    #[serde(default)]
    pub ad_type: AdType,
    #[serde(default)]
    pub request_url: String,
    /// Provider keys this crate does not interpret, passed through untouched
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl Advertisement {
    pub fn new(start_ms: EpochMillis, stop_ms: EpochMillis, request_url: impl Into<String>) -> Self {
        Self {
            start_ms,
            stop_ms,
            ad_type: AdType::Vast,
            request_url: request_url.into(),
            custom: Map::new(),
        }
    }

    /// Length of the ad break in milliseconds
    pub fn duration_ms(&self) -> i64 {
        self.stop_ms.saturating_sub(self.start_ms)
    }
}

impl Ord for Advertisement {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start_ms
            .cmp(&other.start_ms)
            .then(self.stop_ms.cmp(&other.stop_ms))
            .then(self.ad_type.cmp(&other.ad_type))
            .then_with(|| self.request_url.cmp(&other.request_url))
            .then_with(|| {
                let extras = |ad: &Self| {
                    ad.custom
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_string()))
                        .collect::<Vec<_>>()
                };
                extras(self).cmp(&extras(other))
            })
    }
}

impl PartialOrd for Advertisement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================================
// Provider Data
// ============================================================================

/// Errors decoding or encoding the provider-data blob
#[derive(Error, Debug)]
pub enum ProviderDataError {
    /// Blob is not valid JSON or has the wrong shape
    #[error("Malformed provider data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decoded form of a program's opaque provider-data blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub ads: Vec<Advertisement>,
    /// Keys this crate does not interpret, kept verbatim
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl ProviderData {
    pub fn decode(blob: &str) -> Result<Self, ProviderDataError> {
        Ok(serde_json::from_str(blob)?)
    }

    pub fn encode(&self) -> Result<String, ProviderDataError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Program
// ============================================================================

/// A program, either a reel template or a materialized broadcast instance
///
/// Templates carry times on the reel's own authored timeline. Materialized
/// instances carry absolute window times and are bound to a real channel.
/// Programs read back from a store also carry the store `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Program {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub channel_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
    pub start_time_ms: EpochMillis,
    pub end_time_ms: EpochMillis,
    #[serde(default)]
    pub content_ratings: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_data: Option<String>,
}

impl Program {
    /// Create a program with a title and a time range
    pub fn new(title: impl Into<String>, start_time_ms: EpochMillis, end_time_ms: EpochMillis) -> Self {
        Self {
            title: title.into(),
            start_time_ms,
            end_time_ms,
            ..Default::default()
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_time_ms.saturating_sub(self.start_time_ms)
    }

    /// Field-for-field equality, ignoring the store id
    pub fn same_content(&self, other: &Program) -> bool {
        self.channel_id == other.channel_id
            && self.title == other.title
            && self.description == other.description
            && self.episode_title == other.episode_title
            && self.season_number == other.season_number
            && self.episode_number == other.episode_number
            && self.start_time_ms == other.start_time_ms
            && self.end_time_ms == other.end_time_ms
            && self.content_ratings == other.content_ratings
            && self.genres == other.genres
            && self.poster_uri == other.poster_uri
            && self.provider_data == other.provider_data
    }

    /// Whether `[start, end]` intersects `[window_start, window_end]`
    pub fn overlaps(&self, window_start: EpochMillis, window_end: EpochMillis) -> bool {
        self.start_time_ms <= window_end && self.end_time_ms >= window_start
    }

    /// Decode the provider-data blob; `None` when the program has none
    pub fn decode_provider_data(&self) -> Result<Option<ProviderData>, ProviderDataError> {
        self.provider_data
            .as_deref()
            .map(ProviderData::decode)
            .transpose()
    }

    /// Advertisements embedded in the provider data, empty if there is no blob
    pub fn advertisements(&self) -> Result<Vec<Advertisement>, ProviderDataError> {
        Ok(self
            .decode_provider_data()?
            .map(|data| data.ads)
            .unwrap_or_default())
    }
}

// ============================================================================
// Operation
// ============================================================================

/// A single store mutation produced by reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ProgramOperation {
    Insert(Program),
    Update { id: i64, program: Program },
    Delete { id: i64 },
}

impl ProgramOperation {
    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}
