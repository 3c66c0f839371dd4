//! # Mock Framework
//!
//! Utilities for testing clients in isolation, without spawning a real table.
//!
//! Two styles are available:
//! - [`MockClient`]: queue scripted responses up front, run the code under test,
//!   then call [`MockClient::verify`].
//! - [`create_mock_client`] plus [`expect_create`] / [`expect_get`] /
//!   [`expect_delete`] / [`expect_action`]:
//!   receive the raw requests yourself and answer them by hand.
//!
//! Scripted failures are how the checkout tests simulate a data store that
//! accepts an order header and then rejects its line items.

use crate::framework::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest, Response};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A scripted response for the next request of the matching kind.
enum Expectation<T: ActorEntity> {
    Create(Result<T::Id, FrameworkError>),
    CreateBatch(Result<Vec<T::Id>, FrameworkError>),
    Get(Result<Option<T>, FrameworkError>),
    List(Result<Vec<T>, FrameworkError>),
    Update(Result<T, FrameworkError>),
    Delete(Result<(), FrameworkError>),
    Action(Result<T::ActionResult, FrameworkError>),
}

impl<T: ActorEntity> Expectation<T> {
    fn name(&self) -> &'static str {
        match self {
            Expectation::Create(_) => "create",
            Expectation::CreateBatch(_) => "create_batch",
            Expectation::Get(_) => "get",
            Expectation::List(_) => "list",
            Expectation::Update(_) => "update",
            Expectation::Delete(_) => "delete",
            Expectation::Action(_) => "action",
        }
    }
}

/// One queued expectation: the response plus, for id-addressed requests, the
/// id the request must carry.
struct Scripted<T: ActorEntity> {
    id: Option<T::Id>,
    response: Expectation<T>,
}

fn request_id<T: ActorEntity>(request: &ResourceRequest<T>) -> Option<&T::Id> {
    match request {
        ResourceRequest::Get { id, .. }
        | ResourceRequest::Update { id, .. }
        | ResourceRequest::Delete { id, .. }
        | ResourceRequest::Action { id, .. } => Some(id),
        _ => None,
    }
}

fn request_name<T: ActorEntity>(request: &ResourceRequest<T>) -> &'static str {
    match request {
        ResourceRequest::Create { .. } => "create",
        ResourceRequest::CreateBatch { .. } => "create_batch",
        ResourceRequest::Get { .. } => "get",
        ResourceRequest::List { .. } => "list",
        ResourceRequest::Update { .. } => "update",
        ResourceRequest::Delete { .. } => "delete",
        ResourceRequest::Action { .. } => "action",
        ResourceRequest::Subscribe { .. } => "subscribe",
    }
}

struct Script<T: ActorEntity> {
    expectations: VecDeque<Scripted<T>>,
    mismatches: Vec<String>,
}

type SharedScript<T> = Arc<Mutex<Script<T>>>;

fn lock<T: ActorEntity>(script: &SharedScript<T>) -> MutexGuard<'_, Script<T>> {
    script.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A mock client with expectation tracking for fluent testing.
///
/// Requests are answered strictly in the order the expectations were queued.
/// A request that doesn't match the next expectation, by kind or by id, gets its
/// response channel dropped (the caller sees [`FrameworkError::ActorDropped`])
/// and is reported by [`MockClient::verify`].
///
/// # Example
/// ```ignore
/// let mut mock = MockClient::<Order>::new();
/// mock.expect_create().return_ok("order_1".to_string());
/// mock.expect_delete("order_1".to_string()).return_ok(());
///
/// let client = mock.client();
/// // Use client in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    script: SharedScript<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let script: SharedScript<T> = Arc::new(Mutex::new(Script {
            expectations: VecDeque::new(),
            mismatches: Vec::new(),
        }));
        let task_script = script.clone();

        // Spawn background task to handle requests
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = lock(&task_script).expectations.pop_front();
                if let Some(mismatch) = answer(request, expectation) {
                    lock(&task_script).mismatches.push(mismatch);
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            script,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    fn builder<R>(
        &self,
        id: Option<T::Id>,
        wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
    ) -> ResponseBuilder<T, R> {
        ResponseBuilder {
            script: self.script.clone(),
            id,
            wrap,
        }
    }

    /// Expects a `create` operation.
    pub fn expect_create(&mut self) -> ResponseBuilder<T, T::Id> {
        self.builder(None, Expectation::Create)
    }

    /// Expects a `create_batch` operation.
    pub fn expect_create_batch(&mut self) -> ResponseBuilder<T, Vec<T::Id>> {
        self.builder(None, Expectation::CreateBatch)
    }

    /// Expects a `get` of `id`.
    pub fn expect_get(&mut self, id: T::Id) -> ResponseBuilder<T, Option<T>> {
        self.builder(Some(id), Expectation::Get)
    }

    /// Expects a `list` operation.
    pub fn expect_list(&mut self) -> ResponseBuilder<T, Vec<T>> {
        self.builder(None, Expectation::List)
    }

    /// Expects an `update` of `id`.
    pub fn expect_update(&mut self, id: T::Id) -> ResponseBuilder<T, T> {
        self.builder(Some(id), Expectation::Update)
    }

    /// Expects a `delete` of `id`.
    pub fn expect_delete(&mut self, id: T::Id) -> ResponseBuilder<T, ()> {
        self.builder(Some(id), Expectation::Delete)
    }

    /// Expects an `action` on `id`.
    pub fn expect_action(&mut self, id: T::Id) -> ResponseBuilder<T, T::ActionResult> {
        self.builder(Some(id), Expectation::Action)
    }

    /// Verifies that all expectations were met and no unexpected request arrived.
    pub fn verify(&self) {
        let script = lock(&self.script);
        if !script.mismatches.is_empty() {
            panic!("Unexpected requests: {}", script.mismatches.join(", "));
        }
        if !script.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                script.expectations.len()
            );
        }
    }
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sends the scripted response, or describes the mismatch.
fn answer<T: ActorEntity>(request: ResourceRequest<T>, scripted: Option<Scripted<T>>) -> Option<String> {
    fn reply<R>(respond_to: Response<R>, response: Result<R, FrameworkError>) -> Option<String> {
        let _ = respond_to.send(response);
        None
    }

    let Some(Scripted { id: expected_id, response }) = scripted else {
        return Some(format!("got {} with no expectation left", request_name(&request)));
    };
    if let (Some(expected), Some(actual)) = (&expected_id, request_id(&request)) {
        if expected != actual {
            return Some(format!(
                "got {} of {} while expecting {}",
                request_name(&request),
                actual,
                expected
            ));
        }
    }

    match (request, response) {
        (ResourceRequest::Create { respond_to, .. }, Expectation::Create(response)) => reply(respond_to, response),
        (ResourceRequest::CreateBatch { respond_to, .. }, Expectation::CreateBatch(response)) => {
            reply(respond_to, response)
        }
        (ResourceRequest::Get { respond_to, .. }, Expectation::Get(response)) => reply(respond_to, response),
        (ResourceRequest::List { respond_to, .. }, Expectation::List(response)) => reply(respond_to, response),
        (ResourceRequest::Update { respond_to, .. }, Expectation::Update(response)) => reply(respond_to, response),
        (ResourceRequest::Delete { respond_to, .. }, Expectation::Delete(response)) => reply(respond_to, response),
        (ResourceRequest::Action { respond_to, .. }, Expectation::Action(response)) => reply(respond_to, response),
        (request, expected) => Some(format!(
            "got {} while expecting {}",
            request_name(&request),
            expected.name()
        )),
    }
}

/// Builder that queues one scripted response.
pub struct ResponseBuilder<T: ActorEntity, R> {
    script: SharedScript<T>,
    id: Option<T::Id>,
    wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
}

impl<T: ActorEntity, R> ResponseBuilder<T, R> {
    fn push(self, result: Result<R, FrameworkError>) {
        let scripted = Scripted {
            id: self.id,
            response: (self.wrap)(result),
        };
        lock(&self.script).expectations.push_back(scripted);
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }
}

// =============================================================================
// LOW-LEVEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// # Testing Strategy
/// When testing a *client wrapper* we don't want a real table. The receiver lets the
/// test inspect each request, assert on its payload and answer it (success,
/// failure, or never) deterministically.
///
/// **Note**: Consider using [`MockClient`] for a more fluent API.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, Response<T::Id>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<()>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Delete { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, CategoryCreate};

    fn category(id: &str) -> Category {
        Category {
            id: id.to_string(),
            name: "Mains".to_string(),
            description: None,
            display_order: 1,
        }
    }

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Category>(10);

        let create_task = tokio::spawn(async move {
            let params = CategoryCreate {
                name: "Mains".to_string(),
                description: None,
                display_order: 1,
            };
            client.create(params).await
        });

        let (payload, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(payload.name, "Mains");
        responder.send(Ok("category_1".to_string())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result.unwrap(), "category_1");
    }

    #[tokio::test]
    async fn test_raw_get_and_action() {
        use crate::model::{Order, OrderStatus};
        use crate::order_actor::OrderAction;

        let (client, mut receiver) = create_mock_client::<Order>(10);
        let task = tokio::spawn(async move {
            let missing = client.get("order_1".to_string()).await;
            let status = client
                .perform_action("order_2".to_string(), OrderAction::Transition(OrderStatus::Ready))
                .await;
            (missing, status)
        });

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, "order_1");
        responder.send(Ok(None)).unwrap();

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, "order_2");
        assert_eq!(action, OrderAction::Transition(OrderStatus::Ready));
        responder.send(Ok(OrderStatus::Ready)).unwrap();

        let (missing, status) = task.await.unwrap();
        assert!(missing.unwrap().is_none());
        assert_eq!(status.unwrap(), OrderStatus::Ready);
    }

    #[tokio::test]
    async fn test_mock_client_with_expectations() {
        let mut mock = MockClient::<Category>::new();
        mock.expect_get("category_1".to_string())
            .return_ok(Some(category("category_1")));
        mock.expect_delete("category_1".to_string())
            .return_err(FrameworkError::NotFound("category_1".to_string()));

        let client = mock.client();

        let fetched = client.get("category_1".to_string()).await.unwrap();
        assert_eq!(fetched.unwrap().name, "Mains");

        let deleted = client.delete("category_1".to_string()).await;
        assert!(matches!(deleted, Err(FrameworkError::NotFound(_))));

        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "got delete of category_2 while expecting category_1")]
    async fn test_mock_client_reports_wrong_id() {
        let mut mock = MockClient::<Category>::new();
        mock.expect_delete("category_1".to_string()).return_ok(());

        let result = mock.client().delete("category_2".to_string()).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));

        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected requests")]
    async fn test_mock_client_reports_mismatch() {
        let mut mock = MockClient::<Category>::new();
        mock.expect_create().return_ok("category_1".to_string());

        let result = mock.client().get("category_1".to_string()).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));

        mock.verify();
    }
}
