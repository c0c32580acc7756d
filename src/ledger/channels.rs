/// Channel lifecycle lookup across the open, pending and closed collections
///
/// Collections are queried in order (open, pending, closed) and the first
/// match wins. A transport failure stops the search immediately.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LedgerError;
use crate::remote::{OpenChannel, WalletNode};

/// Message used for channels absent from every collection
pub const NO_FIND_CHANNEL: &str = "NO_FIND_CHANNEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelState {
    Active,
    Inactive,
    PendingOpen,
    PendingClose,
    Closed,
    NotFound,
}

impl ChannelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelState::Active => "ACTIVE",
            ChannelState::Inactive => "INACTIVE",
            ChannelState::PendingOpen => "PENDING_OPEN",
            ChannelState::PendingClose => "PENDING_CLOSE",
            ChannelState::Closed => "CLOSED",
            ChannelState::NotFound => "NOT_FOUND",
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ChannelStateResolver<'a, N: WalletNode + ?Sized> {
    node: &'a N,
}

impl<'a, N: WalletNode + ?Sized> ChannelStateResolver<'a, N> {
    pub fn new(node: &'a N) -> Self {
        Self { node }
    }

    /// Lifecycle state of the channel funded at `channel_point`
    pub fn resolve(&self, channel_point: &str) -> Result<ChannelState, LedgerError> {
        let open = self.node.list_channels().map_err(|e| {
            log::error!("ListChannels failed: {}", e);
            e
        })?;
        if let Some(channel) = open.iter().find(|c| c.channel_point == channel_point) {
            return Ok(if channel.active {
                ChannelState::Active
            } else {
                ChannelState::Inactive
            });
        }

        let pending = self.node.pending_channels().map_err(|e| {
            log::error!("PendingChannels failed: {}", e);
            e
        })?;
        if pending
            .pending_open_channels
            .iter()
            .any(|p| p.channel.channel_point == channel_point)
        {
            return Ok(ChannelState::PendingOpen);
        }
        if pending
            .waiting_close_channels
            .iter()
            .any(|w| w.channel.channel_point == channel_point)
        {
            return Ok(ChannelState::PendingClose);
        }

        let closed = self.node.closed_channels().map_err(|e| {
            log::error!("ClosedChannels failed: {}", e);
            e
        })?;
        if closed.iter().any(|c| c.channel_point == channel_point) {
            return Ok(ChannelState::Closed);
        }

        log::debug!("Channel {} not found in any collection", channel_point);
        Ok(ChannelState::NotFound)
    }

    /// Full descriptor of an open channel; pending and closed are not searched
    pub fn info(&self, channel_point: &str) -> Result<OpenChannel, LedgerError> {
        self.node
            .list_channels()?
            .into_iter()
            .find(|c| c.channel_point == channel_point)
            .ok_or_else(|| LedgerError::NotFound(NO_FIND_CHANNEL.to_string()))
    }
}
