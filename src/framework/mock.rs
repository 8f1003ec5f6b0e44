//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! [`MockClient`] hands out a real [`ResourceClient`] whose requests are answered, in
//! order, from a queue of expectations instead of by an actor.
//!
//! ```rust
//! # use restaurant_sim::framework::mock::MockClient;
//! # use restaurant_sim::framework::FrameworkError;
//! # use restaurant_sim::model::{Order, OrderId};
//! # #[tokio::main] async fn main() {
//! let mut mock = MockClient::<Order>::new();
//! mock.expect_get(OrderId(1)).return_ok(None);
//! mock.expect_count().return_err(FrameworkError::ActorClosed);
//!
//! let client = mock.client();
//! assert!(client.get(OrderId(1)).await.unwrap().is_none());
//! assert!(client.count(Box::new(|_: &Order| true)).await.is_err());
//! mock.verify();
//! # }
//! ```

use crate::framework::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// An expected request and the response to give it.
enum Expectation<T: ActorEntity> {
    Create(Result<T::Id, FrameworkError>),
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
    ActionFirst(Result<Option<T::ActionResult>, FrameworkError>),
    Count(Result<usize, FrameworkError>),
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
///
/// A request that does not match the next expectation panics the mock task, which
/// surfaces in the test as [`FrameworkError::ActorDropped`] and a failed
/// [`verify`](MockClient::verify).
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Expectations<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queue
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .pop_front();

                match (request, expectation) {
                    (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: expected, response })) => {
                        assert_eq!(id, expected, "get called with an unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { id, respond_to, .. },
                        Some(Expectation::Action { id: expected, response }),
                    ) => {
                        assert_eq!(id, expected, "action called with an unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::ActionFirst { respond_to, .. }, Some(Expectation::ActionFirst(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Count { respond_to, .. }, Some(Expectation::Count(response))) => {
                        let _ = respond_to.send(response);
                    }
                    _ => panic!("Unexpected request or expectation mismatch"),
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    fn builder<R: 'static>(
        &self,
        wrap: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            wrap: Box::new(wrap),
        }
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        self.builder(Expectation::Create)
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |response| Expectation::Get { id, response })
    }

    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(move |response| Expectation::Action { id, response })
    }

    pub fn expect_action_first(&mut self) -> ExpectationBuilder<T, Option<T::ActionResult>> {
        self.builder(Expectation::ActionFirst)
    }

    pub fn expect_count(&mut self) -> ExpectationBuilder<T, usize> {
        self.builder(Expectation::Count)
    }

    /// Panics unless every expectation was consumed.
    pub fn verify(&self) {
        let remaining = self
            .expectations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

/// Sets the response of one expected request.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Expectations<T>,
    wrap: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError>) {
        let expectation = (self.wrap)(response);
        self.expectations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(expectation);
    }
}
