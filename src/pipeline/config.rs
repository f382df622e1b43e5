//! Pipeline configuration.

use crate::accumulate::ChannelSelection;
use crate::error::{Error, Result};

/// Configuration for the accumulation pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Channels of the query image that receive the reference samples.
    pub channels: ChannelSelection,

    /// Whether accumulation may use multiple threads.
    pub parallel: bool,

    /// Compare file headers before decoding any pixels.
    pub check_headers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channels: ChannelSelection::All,
            parallel: true,
            check_headers: true,
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel selection is empty or contains an
    /// empty channel name.
    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(Error::InvalidParameter {
                name: "channels".to_string(),
                reason: "must select at least one channel".to_string(),
            });
        }

        if let ChannelSelection::Names(names) = &self.channels {
            if let Some(name) = names.iter().find(|name| name.is_empty()) {
                return Err(Error::InvalidParameter {
                    name: "channels".to_string(),
                    reason: format!("channel name {name:?} is empty"),
                });
            }
        }

        Ok(())
    }
}
