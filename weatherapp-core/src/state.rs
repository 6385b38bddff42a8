//! Observable result state.
//!
//! [`StateStore`] holds exactly one [`ResultState`] at a time. Readers take
//! snapshots or hold a [`Subscription`]; writes are crate-private so the
//! query controller stays the single writer.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

use crate::WeatherRecord;

/// Progress of the most recent lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultState {
    #[default]
    Idle,
    Loading,
    Success(WeatherRecord),
    Error(String),
}

impl ResultState {
    /// `Success` and `Error` end a lookup until the next fetch.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResultState::Success(_) | ResultState::Error(_))
    }
}

/// Sequence number of one fetch; only the latest may write its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct StateStore {
    tx: watch::Sender<ResultState>,
    latest: AtomicU64,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self { tx: watch::Sender::new(ResultState::Idle), latest: AtomicU64::new(0) }
    }

    pub fn snapshot(&self) -> ResultState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription { rx: self.tx.subscribe() }
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        drop(subscription);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Issue a new token and switch to `Loading`, atomically.
    pub(crate) fn begin_request(&self) -> RequestToken {
        let mut token = RequestToken(0);
        self.tx.send_modify(|state| {
            token = RequestToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1);
            *state = ResultState::Loading;
        });
        token
    }

    /// Write `next` if `token` is still the latest request.
    ///
    /// Returns `false` when a newer request superseded this one.
    pub(crate) fn complete(&self, token: RequestToken, next: ResultState) -> bool {
        self.tx.send_if_modified(|state| {
            if self.latest.load(Ordering::Acquire) != token.0 {
                return false;
            }
            *state = next;
            true
        })
    }
}

/// Read handle on a [`StateStore`].
///
/// Slow readers may miss intermediate states but always observe the latest.
#[derive(Debug)]
pub struct Subscription {
    rx: watch::Receiver<ResultState>,
}

impl Subscription {
    pub fn current(&self) -> ResultState {
        self.rx.borrow().clone()
    }

    /// Wait for the next replacement. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<ResultState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let store = StateStore::new();
        assert_eq!(store.snapshot(), ResultState::Idle);
        assert!(!store.snapshot().is_terminal());
    }

    #[test]
    fn tokens_increase_and_each_request_reloads() {
        let store = StateStore::new();
        let first = store.begin_request();
        assert!(store.complete(first, ResultState::Error("boom".into())));

        let second = store.begin_request();
        assert!(second > first);
        assert_eq!(store.snapshot(), ResultState::Loading);
    }

    #[test]
    fn superseded_completion_is_discarded() {
        let store = StateStore::new();
        let old = store.begin_request();
        let new = store.begin_request();

        assert!(store.complete(new, ResultState::Error("new".into())));
        assert!(!store.complete(old, ResultState::Error("old".into())));
        assert_eq!(store.snapshot(), ResultState::Error("new".into()));
    }

    #[test]
    fn unsubscribe_releases_receiver() {
        let store = StateStore::new();
        let sub = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);
        store.unsubscribe(sub);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn subscriber_sees_replacements() {
        let store = StateStore::new();
        let mut sub = store.subscribe();
        assert_eq!(sub.current(), ResultState::Idle);

        let token = store.begin_request();
        assert_eq!(sub.changed().await, Some(ResultState::Loading));

        store.complete(token, ResultState::Error("Failed to load data".into()));
        assert_eq!(sub.changed().await, Some(ResultState::Error("Failed to load data".into())));
    }

    #[tokio::test]
    async fn subscription_ends_with_store() {
        let store = StateStore::new();
        let mut sub = store.subscribe();
        drop(store);
        assert_eq!(sub.changed().await, None);
    }
}
