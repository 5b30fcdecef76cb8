//! Listing sources
//!
//! A listing source announces channels and hands out each channel's template
//! reel. Parsing a concrete feed format into this model happens upstream;
//! [`StaticListingSource`] serves reels that are already in memory or stored
//! as a JSON document.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Channel, Program};
use crate::schedule::TimeWindow;

/// Result type for listing operations
pub type ListingResult<T> = Result<T, ListingError>;

/// Listing source errors
#[derive(Error, Debug)]
pub enum ListingError {
    /// Listing file could not be read
    #[error("Failed to read listing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Listing document is not valid
    #[error("Failed to parse listing: {0}")]
    Parse(#[from] serde_json::Error),

    /// Requested channel is unknown to the source
    #[error("Channel {0} not found in listing")]
    ChannelNotFound(i64),
}

/// Provider of channels and their template reels
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// All channels currently announced
    async fn channels(&self) -> ListingResult<Vec<Channel>>;

    /// Template reel of `channel`, ordered by start time
    ///
    /// Sources may narrow one-shot reels to `window`; repeatable reels are
    /// always returned whole since looping needs every template.
    async fn programs_for_channel(
        &self,
        channel: &Channel,
        window: TimeWindow,
    ) -> ListingResult<Vec<Program>>;
}

/// Thread-safe shared listing source
pub type SharedListingSource = Arc<dyn ListingSource>;

// ============================================================================
// Static Listing
// ============================================================================

/// One channel and its reel, as stored in a listing document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelListing {
    #[serde(flatten)]
    pub channel: Channel,
    #[serde(default)]
    pub programs: Vec<Program>,
}

/// Listing document: `{ "channels": [ { ...channel, "programs": [...] } ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingDocument {
    pub channels: Vec<ChannelListing>,
}

/// Listing source over a fixed set of channel reels
#[derive(Debug, Clone, Default)]
pub struct StaticListingSource {
    channels: Vec<Channel>,
    reels: HashMap<i64, Vec<Program>>,
}

impl StaticListingSource {
    /// Build from channel listings; each reel is stably sorted by start time
    pub fn new(listings: Vec<ChannelListing>) -> Self {
        let mut channels = Vec::with_capacity(listings.len());
        let mut reels = HashMap::with_capacity(listings.len());

        for ChannelListing {
            channel,
            mut programs,
        } in listings
        {
            programs.sort_by_key(|p| p.start_time_ms);
            reels.insert(channel.id, programs);
            channels.push(channel);
        }

        Self { channels, reels }
    }

    pub fn from_json_str(json: &str) -> ListingResult<Self> {
        let document: ListingDocument = serde_json::from_str(json)?;
        Ok(Self::new(document.channels))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ListingResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ListingError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let source = Self::from_json_str(&content)?;

        tracing::info!(
            path = %path.display(),
            channels = source.channels.len(),
            "Loaded listing"
        );
        Ok(source)
    }

    /// Reel of a channel by id
    pub fn reel(&self, channel_id: i64) -> ListingResult<&[Program]> {
        self.reels
            .get(&channel_id)
            .map(Vec::as_slice)
            .ok_or(ListingError::ChannelNotFound(channel_id))
    }

    pub fn channel(&self, channel_id: i64) -> ListingResult<&Channel> {
        self.channels
            .iter()
            .find(|c| c.id == channel_id)
            .ok_or(ListingError::ChannelNotFound(channel_id))
    }
}

#[async_trait]
impl ListingSource for StaticListingSource {
    async fn channels(&self) -> ListingResult<Vec<Channel>> {
        Ok(self.channels.clone())
    }

    async fn programs_for_channel(
        &self,
        channel: &Channel,
        _window: TimeWindow,
    ) -> ListingResult<Vec<Program>> {
        Ok(self.reel(channel.id)?.to_vec())
    }
}
