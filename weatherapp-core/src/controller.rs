use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    WeatherClient,
    state::{RequestToken, ResultState, StateStore, Subscription},
};

/// The only message shown to the user when a lookup fails.
pub const FAILED_TO_LOAD: &str = "Failed to load data";

/// Drives lookups and owns the [`ResultState`] they produce.
#[derive(Debug)]
pub struct QueryController<C> {
    client: Arc<C>,
    api_key: Arc<str>,
    store: Arc<StateStore>,
}

impl<C: WeatherClient + 'static> QueryController<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self {
            client: Arc::new(client),
            api_key: Arc::from(api_key.into()),
            store: Arc::new(StateStore::new()),
        }
    }

    pub fn state(&self) -> ResultState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> Subscription {
        self.store.subscribe()
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.store.unsubscribe(subscription);
    }

    pub fn subscriber_count(&self) -> usize {
        self.store.subscriber_count()
    }

    /// Start a lookup for `city`.
    ///
    /// The state is `Loading` when this returns. Must be called inside a
    /// tokio runtime. A completion is written only if no later `fetch`
    /// was issued in the meantime.
    pub fn fetch(&self, city: &str) -> FetchHandle {
        let token = self.store.begin_request();
        debug!(city, token = token.value(), "fetch started");

        let client = Arc::clone(&self.client);
        let api_key = Arc::clone(&self.api_key);
        let store = Arc::clone(&self.store);
        let city = city.to_owned();

        let task = tokio::spawn(async move {
            let next = match client.fetch(&api_key, &city).await {
                Ok(record) => ResultState::Success(record),
                Err(err) => {
                    warn!(city = %city, kind = ?err.kind(), error = %err, "weather lookup failed");
                    ResultState::Error(FAILED_TO_LOAD.to_string())
                }
            };
            settle(&store, token, next)
        });

        FetchHandle { token, task }
    }
}

fn settle(store: &StateStore, token: RequestToken, next: ResultState) -> bool {
    let written = store.complete(token, next);
    if !written {
        debug!(token = token.value(), "discarding superseded result");
    }
    written
}

/// Handle on one in-flight lookup.
#[derive(Debug)]
pub struct FetchHandle {
    token: RequestToken,
    task: JoinHandle<bool>,
}

impl FetchHandle {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Abort the lookup. The state is left untouched.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Wait for the lookup; `true` if its result was written to the state.
    pub async fn join(self) -> bool {
        let token = self.token;
        match self.task.await {
            Ok(written) => written,
            Err(err) if err.is_panic() => {
                warn!(token = token.value(), error = %err, "weather lookup task panicked");
                false
            }
            Err(_) => false,
        }
    }
}
