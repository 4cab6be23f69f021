//! Hand-off of provider results to the rendering task
//!
//! Complication data and provider lookups may complete in an interrupt or
//! another task. They are posted here and drained by the task that owns the
//! engine, which is the only place UI state gets mutated.

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, TrySendError},
};

use super::{ComplicationData, ProviderInfo, SlotId};

/// Number of results that can be pending before new ones are dropped
pub const INBOX_DEPTH: usize = 4;

pub struct Inbox<T, const N: usize> {
    channel: Channel<CriticalSectionRawMutex, T, N>,
}

impl<T, const N: usize> Inbox<T, N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Post a result from any context. Hands the item back if the inbox is full.
    pub fn post(&self, item: T) -> Result<(), T> {
        self.channel.try_send(item).map_err(|TrySendError::Full(item)| {
            warn!("Inbox full, dropping update");
            item
        })
    }

    /// Apply every pending result, returns how many there were.
    pub fn drain(&self, mut apply: impl FnMut(T)) -> usize {
        let mut count = 0;
        while let Ok(item) = self.channel.try_receive() {
            apply(item);
            count += 1;
        }
        count
    }

    /// Wait for the next result.
    pub async fn next(&self) -> T {
        self.channel.receive().await
    }
}

impl<T, const N: usize> Default for Inbox<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Complication data pushed by a provider
pub type ComplicationInbox = Inbox<(SlotId, ComplicationData), INBOX_DEPTH>;

/// Provider metadata looked up for the configuration screen
pub type ProviderInbox = Inbox<(SlotId, Option<ProviderInfo>), INBOX_DEPTH>;
