// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSnapshot<T> {
    pub value: T,
    pub since: Instant,
}

impl<T> DataSnapshot<T> {
    #[must_use]
    pub fn new(value: impl Into<T>, since: impl Into<Instant>) -> Self {
        Self {
            value: value.into(),
            since: since.into(),
        }
    }

    #[must_use]
    pub fn now(value: impl Into<T>) -> Self {
        Self {
            value: value.into(),
            since: Instant::now(),
        }
    }

    pub fn as_ref(&self) -> DataSnapshot<&T> {
        let Self { value, since } = self;
        DataSnapshot {
            value,
            since: *since,
        }
    }
}

/// Token identifying one in-flight round trip.
///
/// Tokens are handed out per mutation. A token minted before the last
/// reset or refresh no longer finishes anything, so the outcome of an
/// outdated round trip can never clobber newer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingToken(u64);

/// Client-side mirror of remote data.
///
/// Keeps the last known snapshot together with the state of at most one
/// pending round trip. The snapshot is a cache, never a source of truth:
/// after a committed mutation it is marked stale until refreshed from
/// the authoritative store.
#[derive(Debug)]
pub struct RemoteData<T> {
    next_token: u64,
    pending: Option<PendingToken>,
    last_snapshot: Option<DataSnapshot<T>>,
    stale: bool,
}

impl<T> RemoteData<T> {
    #[must_use]
    pub const fn default() -> Self {
        Self {
            next_token: 0,
            pending: None,
            last_snapshot: None,
            stale: false,
        }
    }

    #[must_use]
    pub fn ready_now(value: impl Into<T>) -> Self {
        Self {
            next_token: 0,
            pending: None,
            last_snapshot: Some(DataSnapshot::now(value)),
            stale: false,
        }
    }

    pub fn last_snapshot(&self) -> Option<&DataSnapshot<T>> {
        self.last_snapshot.as_ref()
    }

    pub fn last_value(&self) -> Option<&T> {
        self.last_snapshot.as_ref().map(|snapshot| &snapshot.value)
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Start the next round trip.
    ///
    /// Allows only a single pending round trip at a time.
    pub fn try_start_pending_now(&mut self) -> Option<PendingToken> {
        if self.is_pending() {
            return None;
        }
        let token = PendingToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.pending = Some(token);
        Some(token)
    }

    /// Finish the pending round trip identified by the given token.
    ///
    /// Returns `false` for outdated tokens, i.e. tokens minted before
    /// the last reset or refresh.
    pub fn finish_pending(&mut self, token: PendingToken) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Replace the cached value with an authoritative snapshot.
    ///
    /// Discards any pending round trip and clears staleness.
    pub fn replace_value_now(&mut self, value: impl Into<T>) -> Option<DataSnapshot<T>> {
        self.pending = None;
        self.stale = false;
        self.last_snapshot.replace(DataSnapshot::now(value))
    }

    /// Replace the cached value, keeping the round-trip state untouched.
    pub fn set_value_now(&mut self, value: impl Into<T>) -> Option<DataSnapshot<T>> {
        self.last_snapshot.replace(DataSnapshot::now(value))
    }

    pub fn reset(&mut self) -> Option<DataSnapshot<T>> {
        self.pending = None;
        self.stale = false;
        self.last_snapshot.take()
    }
}

impl<T> Default for RemoteData<T> {
    fn default() -> Self {
        Self::default()
    }
}
