//! # Generic Actor Server
//!
//! The `ResourceActor` owns the entity store and processes requests sequentially. Every
//! request, including store-wide scans such as [`ResourceRequest::ActionFirst`], runs to
//! completion before the next one is read, so no lock is needed around the store.

use super::client::ResourceClient;
use super::entity::ActorEntity;
use super::error::FrameworkError;
use super::message::ResourceRequest;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// ## Operations
///
/// * **Create**: generates the next id from the internal counter, builds the entity with
///   `T::from_create_params`, runs `on_create`, stores it and returns the id.
/// * **Get**: clones the entity out of the store.
/// * **Action**: runs `handle_action` on the entity with the given id.
/// * **ActionFirst**: runs `handle_action` on the first entity, in id order, accepted by the
///   selector. Responds `None` when nothing matches.
/// * **List / Count**: scans the store with a selector.
/// * **Evict / Clear**: removes entities and reports how many were dropped.
///
/// ```rust
/// use restaurant_sim::framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Note { id: u32, text: String }
/// #[derive(Debug)] struct NoteCreate(String);
/// #[derive(Debug)] enum NoteAction { Append(String) }
/// #[derive(Debug, thiserror::Error)] #[error("note error")] struct NoteError;
///
/// #[async_trait]
/// impl ActorEntity for Note {
///     type Id = u32; type Create = NoteCreate; type Action = NoteAction;
///     type ActionResult = usize; type Context = (); type Error = NoteError;
///     fn from_create_params(id: u32, p: NoteCreate) -> Result<Self, NoteError> {
///         Ok(Self { id, text: p.0 })
///     }
///     async fn handle_action(&mut self, a: NoteAction, _: &()) -> Result<usize, NoteError> {
///         match a { NoteAction::Append(s) => { self.text.push_str(&s); Ok(self.text.len()) } }
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Note>::new(8);
///     tokio::spawn(actor.run(()));
///     let id = client.create(NoteCreate("a".into())).await.unwrap();
///     assert_eq!(client.perform_action(id, NoteAction::Append("b".into())).await.unwrap(), 2);
/// }
/// ```
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: BTreeMap<T::Id, T>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; clients wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: BTreeMap::new(),
            next_id: 1,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop until every client has been dropped.
    ///
    /// The `context` is handed to every entity hook.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::Id::from(self.next_id);
                    self.next_id += 1;

                    match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create(&context).await {
                                warn!(entity_type, error = %e, "on_create failed");
                                let _ =
                                    respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                                continue;
                            }
                            self.store.insert(id.clone(), item);
                            debug!(entity_type, %id, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    if let Some(item) = self.store.get_mut(&id) {
                        let result = item
                            .handle_action(action, &context)
                            .await
                            .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                        if let Err(e) = &result {
                            debug!(entity_type, %id, error = %e, "Action rejected");
                        }
                        let _ = respond_to.send(result);
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::ActionFirst {
                    selector,
                    action,
                    respond_to,
                } => {
                    let candidate = self
                        .store
                        .iter_mut()
                        .find(|(_, item)| selector(&**item));
                    match candidate {
                        Some((id, item)) => {
                            debug!(entity_type, %id, ?action, "ActionFirst");
                            let result = item
                                .handle_action(action, &context)
                                .await
                                .map(Some)
                                .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                            let _ = respond_to.send(result);
                        }
                        None => {
                            let _ = respond_to.send(Ok(None));
                        }
                    }
                }
                ResourceRequest::List {
                    selector,
                    respond_to,
                } => {
                    let items: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| selector(*item))
                        .cloned()
                        .collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Count {
                    selector,
                    respond_to,
                } => {
                    let count = self.store.values().filter(|item| selector(*item)).count();
                    let _ = respond_to.send(Ok(count));
                }
                ResourceRequest::Evict {
                    selector,
                    respond_to,
                } => {
                    let before = self.store.len();
                    self.store.retain(|_, item| !selector(&*item));
                    let evicted = before - self.store.len();
                    if evicted > 0 {
                        info!(entity_type, evicted, size = self.store.len(), "Evicted");
                    }
                    let _ = respond_to.send(Ok(evicted));
                }
                ResourceRequest::Clear { respond_to } => {
                    let cleared = self.store.len();
                    self.store.clear();
                    debug!(entity_type, cleared, "Cleared");
                    let _ = respond_to.send(Ok(cleared));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Ticket {
        id: u32,
        owner: String,
        claimed: bool,
    }

    #[derive(Debug)]
    struct TicketCreate {
        owner: String,
    }

    #[derive(Debug)]
    enum TicketAction {
        Claim,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("ticket {0} already claimed")]
    struct TicketError(u32);

    #[async_trait]
    impl ActorEntity for Ticket {
        type Id = u32;
        type Create = TicketCreate;
        type Action = TicketAction;
        type ActionResult = u32;
        type Context = ();
        type Error = TicketError;

        fn from_create_params(id: u32, params: TicketCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                owner: params.owner,
                claimed: false,
            })
        }

        async fn handle_action(
            &mut self,
            action: TicketAction,
            _ctx: &Self::Context,
        ) -> Result<u32, Self::Error> {
            match action {
                TicketAction::Claim if self.claimed => Err(TicketError(self.id)),
                TicketAction::Claim => {
                    self.claimed = true;
                    Ok(self.id)
                }
            }
        }
    }

    fn create(owner: &str) -> TicketCreate {
        TicketCreate {
            owner: owner.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_get_returns_clone() {
        let (actor, client) = ResourceActor::<Ticket>::new(10);
        tokio::spawn(actor.run(()));

        let first = client.create(create("alice")).await.unwrap();
        let second = client.create(create("bob")).await.unwrap();
        assert_eq!((first, second), (1, 2));

        let ticket = client.get(second).await.unwrap().unwrap();
        assert_eq!(ticket.owner, "bob");
        assert!(client.get(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_action_errors_are_boxed_entity_errors() {
        let (actor, client) = ResourceActor::<Ticket>::new(10);
        tokio::spawn(actor.run(()));

        let id = client.create(create("alice")).await.unwrap();
        assert_eq!(client.perform_action(id, TicketAction::Claim).await.unwrap(), id);

        let err = client.perform_action(id, TicketAction::Claim).await.unwrap_err();
        match err {
            FrameworkError::EntityError(inner) => {
                assert!(inner.downcast_ref::<TicketError>().is_some())
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let missing = client.perform_action(42, TicketAction::Claim).await.unwrap_err();
        assert!(matches!(missing, FrameworkError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_action_first_claims_lowest_matching_id_once() {
        let (actor, client) = ResourceActor::<Ticket>::new(10);
        tokio::spawn(actor.run(()));

        for owner in ["alice", "bob", "alice"] {
            client.create(create(owner)).await.unwrap();
        }

        let unclaimed_of = |owner: &'static str| {
            Box::new(move |t: &Ticket| t.owner == owner && !t.claimed)
                as Box<dyn Fn(&Ticket) -> bool + Send + Sync>
        };

        let first = client
            .perform_action_first(unclaimed_of("alice"), TicketAction::Claim)
            .await
            .unwrap();
        let second = client
            .perform_action_first(unclaimed_of("alice"), TicketAction::Claim)
            .await
            .unwrap();
        let third = client
            .perform_action_first(unclaimed_of("alice"), TicketAction::Claim)
            .await
            .unwrap();
        assert_eq!((first, second, third), (Some(1), Some(3), None));

        let claimed = client.count(Box::new(|t: &Ticket| t.claimed)).await.unwrap();
        assert_eq!(claimed, 2);
    }

    #[tokio::test]
    async fn test_concurrent_claims_never_share_a_ticket() {
        let (actor, client) = ResourceActor::<Ticket>::new(64);
        tokio::spawn(actor.run(()));

        for _ in 0..5 {
            client.create(create("alice")).await.unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..20 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client
                    .perform_action_first(Box::new(|t: &Ticket| !t.claimed), TicketAction::Claim)
                    .await
                    .unwrap()
            }));
        }

        let mut won: Vec<u32> = Vec::new();
        for handle in handles {
            if let Some(id) = handle.await.unwrap() {
                won.push(id);
            }
        }
        won.sort_unstable();
        assert_eq!(won, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_evict_and_clear() {
        let (actor, client) = ResourceActor::<Ticket>::new(10);
        let handle = tokio::spawn(actor.run(()));

        for owner in ["alice", "bob", "carol"] {
            client.create(create(owner)).await.unwrap();
        }
        let evicted = client
            .evict(Box::new(|t: &Ticket| t.owner == "bob"))
            .await
            .unwrap();
        assert_eq!(evicted, 1);

        let remaining = client.list(Box::new(|_: &Ticket| true)).await.unwrap();
        let owners: Vec<_> = remaining.iter().map(|t| t.owner.as_str()).collect();
        assert_eq!(owners, vec!["alice", "carol"]);

        assert_eq!(client.clear().await.unwrap(), 2);

        drop(client);
        handle.await.unwrap();
    }
}
