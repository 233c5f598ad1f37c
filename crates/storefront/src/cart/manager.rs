//! The cart state manager.
//!
//! One worker task owns every cart mutation. Calls enqueue a command onto a
//! FIFO channel at call time and get back a future for that command's
//! result, so mutation effects land in call order regardless of how the
//! returned futures are polled. Dropping a future does not cancel its
//! mutation. State only changes after the backend confirms it.

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use packon_core::{CartId, CartLineId, VariantId};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::CartError;
use super::gateway::{CartGateway, GatewayError};
use super::snapshot::CartSnapshot;
use super::store::CartIdentityStore;
use crate::error::add_breadcrumb;
use crate::shopify::{Cart, CartLineInput, CartLineUpdate};

type Reply = oneshot::Sender<Result<Cart, CartError>>;

enum Command {
    Add {
        variant_id: VariantId,
        quantity: NonZeroU32,
        reply: Reply,
    },
    Update {
        line_id: CartLineId,
        quantity: NonZeroU32,
        reply: Reply,
    },
    Remove {
        line_ids: Vec<CartLineId>,
        reply: Reply,
    },
}

/// State shared between handles and the worker.
struct Shared {
    gateway: Arc<dyn CartGateway>,
    store: Arc<dyn CartIdentityStore>,
    state: watch::Sender<CartSnapshot>,
    /// Commands enqueued but not yet applied.
    pending: AtomicUsize,
    /// Bumped every time the backend confirms a new cart state.
    generation: AtomicU64,
}

/// Handle to the cart state manager.
///
/// Cheap to clone; every clone talks to the same worker. The worker stops
/// once the last handle is dropped and its queue is drained.
#[derive(Clone)]
pub struct CartStateManager {
    commands: mpsc::UnboundedSender<Command>,
    shared: Arc<Shared>,
}

impl CartStateManager {
    /// Start the worker. Performs no I/O; call [`hydrate`](Self::hydrate)
    /// to restore a persisted cart.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(gateway: Arc<dyn CartGateway>, store: Arc<dyn CartIdentityStore>) -> Self {
        let (state, _) = watch::channel(CartSnapshot::default());
        let shared = Arc::new(Shared {
            gateway,
            store,
            state,
            pending: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
        });

        let (commands, receiver) = mpsc::unbounded_channel();
        tokio::spawn(
            Worker {
                shared: Arc::clone(&shared),
                commands: receiver,
            }
            .run(),
        );

        Self { commands, shared }
    }

    /// Add `quantity` of a variant, creating the cart on first use.
    ///
    /// The backend merges repeated adds of the same variant into one line;
    /// the returned cart is exactly what it answered.
    pub fn add_item(
        &self,
        variant_id: VariantId,
        quantity: NonZeroU32,
    ) -> impl Future<Output = Result<Cart, CartError>> + Send + 'static {
        self.enqueue(move |reply| Command::Add {
            variant_id,
            quantity,
            reply,
        })
    }

    /// Set a line's quantity. Dropping a line to zero is a removal; call
    /// [`remove_item`](Self::remove_item) for that.
    pub fn update_quantity(
        &self,
        line_id: CartLineId,
        quantity: NonZeroU32,
    ) -> impl Future<Output = Result<Cart, CartError>> + Send + 'static {
        self.enqueue(move |reply| Command::Update {
            line_id,
            quantity,
            reply,
        })
    }

    /// Remove one line.
    pub fn remove_item(
        &self,
        line_id: CartLineId,
    ) -> impl Future<Output = Result<Cart, CartError>> + Send + 'static {
        self.remove_items(vec![line_id])
    }

    /// Remove a batch of lines in one call.
    pub fn remove_items(
        &self,
        line_ids: Vec<CartLineId>,
    ) -> impl Future<Output = Result<Cart, CartError>> + Send + 'static {
        self.enqueue(|reply| Command::Remove { line_ids, reply })
    }

    /// Show the cart drawer.
    pub fn open_cart(&self) {
        self.set_open(true);
    }

    /// Hide the cart drawer.
    pub fn close_cart(&self) {
        self.set_open(false);
    }

    /// Flip the cart drawer.
    pub fn toggle_cart(&self) {
        self.shared.state.send_modify(|s| s.is_open = !s.is_open);
    }

    /// Restore the persisted cart.
    ///
    /// A persisted id the backend no longer knows is forgotten and the cart
    /// stays empty. Commands queued while the read is in flight are waited
    /// out; if any of them was confirmed by the backend the read is
    /// discarded and that state stands. Failed commands do not outrank it.
    ///
    /// # Errors
    ///
    /// Returns `NetworkUnavailable` or `MutationRejected` when the read
    /// fails for any reason other than a missing cart.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) -> Result<CartSnapshot, CartError> {
        let mut changes = self.shared.state.subscribe();
        let started_at = self.shared.generation.load(Ordering::SeqCst);

        let Some(cart_id) = self.shared.load_cart_id().await else {
            debug!("No persisted cart");
            return Ok(self.snapshot());
        };

        let result = self.shared.gateway.read_cart(&cart_id).await;

        // Pending only drops inside a published change, so this cannot miss it.
        loop {
            changes.borrow_and_update();
            if self.shared.generation.load(Ordering::SeqCst) != started_at
                || self.shared.pending.load(Ordering::SeqCst) == 0
            {
                break;
            }
            if changes.changed().await.is_err() {
                break;
            }
        }

        let mut applied = false;
        self.shared.state.send_if_modified(|state| {
            if self.shared.generation.load(Ordering::SeqCst) != started_at {
                return false;
            }
            applied = true;
            match &result {
                Ok(cart) => {
                    state.cart = Some(cart.clone());
                    state.last_error = None;
                }
                Err(GatewayError::Missing) => {
                    state.cart = None;
                    state.last_error = None;
                }
                Err(e) => state.last_error = Some(CartError::from_mutation(e.clone()).kind()),
            }
            true
        });

        if !applied {
            debug!(cart_id = %cart_id, "Mutation landed during hydrate, keeping its state");
            return Ok(self.snapshot());
        }

        match result {
            Ok(cart) => {
                debug!(cart_id = %cart_id, line_count = cart.lines.len(), "Hydrated cart");
                Ok(self.snapshot())
            }
            Err(GatewayError::Missing) => {
                warn!(cart_id = %cart_id, "Persisted cart no longer exists, forgetting it");
                self.shared.forget_cart_id(&cart_id).await;
                Ok(self.snapshot())
            }
            Err(e) => {
                warn!(cart_id = %cart_id, error = %e, "Failed to hydrate cart");
                Err(CartError::from_mutation(e))
            }
        }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.shared.state.borrow().clone()
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.shared.state.subscribe()
    }

    /// Where to send the shopper to pay, once a cart exists.
    #[must_use]
    pub fn checkout_url(&self) -> Option<Url> {
        self.shared
            .state
            .borrow()
            .cart
            .as_ref()
            .map(|cart| cart.checkout_url.clone())
    }

    fn set_open(&self, open: bool) {
        self.shared.state.send_if_modified(|s| {
            let changed = s.is_open != open;
            s.is_open = open;
            changed
        });
    }

    fn enqueue(
        &self,
        command: impl FnOnce(Reply) -> Command,
    ) -> impl Future<Output = Result<Cart, CartError>> + Send + 'static {
        let (reply, response) = oneshot::channel();
        self.shared.pending.fetch_add(1, Ordering::SeqCst);
        if self.commands.send(command(reply)).is_err() {
            self.shared.pending.fetch_sub(1, Ordering::SeqCst);
        }

        async move {
            response
                .await
                .unwrap_or_else(|_| Err(CartError::MutationRejected("cart worker stopped".into())))
        }
    }
}

impl std::fmt::Debug for CartStateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStateManager")
            .field("pending", &self.shared.pending.load(Ordering::SeqCst))
            .field("state", &*self.shared.state.borrow())
            .finish_non_exhaustive()
    }
}

impl Shared {
    /// The active cart id: the persisted one, else the one in memory.
    async fn load_cart_id(&self) -> Option<CartId> {
        match self.store.load().await {
            Ok(Some(id)) => Some(id),
            Ok(None) => self.state.borrow().cart.as_ref().map(|c| c.id.clone()),
            Err(e) => {
                warn!(error = %e, "Failed to load persisted cart id");
                self.state.borrow().cart.as_ref().map(|c| c.id.clone())
            }
        }
    }

    /// Clear the persisted id if it still points at `cart_id`.
    async fn forget_cart_id(&self, cart_id: &CartId) {
        match self.store.load().await {
            Ok(Some(stored)) if &stored == cart_id => {
                if let Err(e) = self.store.clear().await {
                    warn!(error = %e, "Failed to clear persisted cart id");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to load persisted cart id"),
        }
    }
}

// =============================================================================
// Worker
// =============================================================================

struct Worker {
    shared: Arc<Shared>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl Worker {
    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            let (result, reply) = match command {
                Command::Add {
                    variant_id,
                    quantity,
                    reply,
                } => (self.add(&variant_id, quantity).await, reply),
                Command::Update {
                    line_id,
                    quantity,
                    reply,
                } => (self.update(line_id, quantity).await, reply),
                Command::Remove { line_ids, reply } => (self.remove(line_ids).await, reply),
            };
            self.publish(&result);
            // The caller may have stopped listening; the effect stands either way.
            let _ = reply.send(result);
        }
        debug!("Cart worker stopped");
    }

    /// Apply a command's outcome and mark it done.
    fn publish(&self, result: &Result<Cart, CartError>) {
        self.shared.state.send_modify(|state| {
            match result {
                Ok(cart) => {
                    state.cart = Some(cart.clone());
                    state.last_error = None;
                    self.shared.generation.fetch_add(1, Ordering::SeqCst);
                }
                Err(e) => state.last_error = Some(e.kind()),
            }
            self.shared.pending.fetch_sub(1, Ordering::SeqCst);
        });
    }

    #[instrument(skip(self), fields(variant_id = %variant_id, quantity = quantity.get()))]
    async fn add(&self, variant_id: &VariantId, quantity: NonZeroU32) -> Result<Cart, CartError> {
        let lines = vec![CartLineInput {
            merchandise_id: variant_id.clone(),
            quantity,
        }];

        let cart_id = match self.shared.load_cart_id().await {
            Some(id) => id,
            None => self.create_cart().await?,
        };

        let cart = match self.shared.gateway.add_lines(&cart_id, lines.clone()).await {
            Err(GatewayError::Missing) => {
                warn!(cart_id = %cart_id, "Cart no longer exists, creating a new one");
                self.forget_cart(&cart_id).await;
                let cart_id = self.create_cart().await?;
                self.shared.gateway.add_lines(&cart_id, lines).await
            }
            other => other,
        }
        .map_err(|e| {
            warn!(error = %e, "Add to cart failed");
            CartError::from_mutation(e)
        })?;

        add_breadcrumb(
            "cart",
            "Added item",
            Some(&[
                ("variant_id", variant_id.as_str()),
                ("quantity", &quantity.to_string()),
            ]),
        );
        Ok(cart)
    }

    #[instrument(skip(self), fields(line_id = %line_id, quantity = quantity.get()))]
    async fn update(&self, line_id: CartLineId, quantity: NonZeroU32) -> Result<Cart, CartError> {
        let cart_id = self.require_cart_id().await?;
        let lines = vec![CartLineUpdate {
            id: line_id.clone(),
            quantity,
        }];

        let cart = match self.shared.gateway.update_lines(&cart_id, lines).await {
            Ok(cart) => cart,
            Err(e) => return Err(self.mutation_failed(&cart_id, e).await),
        };

        add_breadcrumb(
            "cart",
            "Updated quantity",
            Some(&[
                ("line_id", line_id.as_str()),
                ("quantity", &quantity.to_string()),
            ]),
        );
        Ok(cart)
    }

    #[instrument(skip(self), fields(line_count = line_ids.len()))]
    async fn remove(&self, line_ids: Vec<CartLineId>) -> Result<Cart, CartError> {
        if line_ids.is_empty() {
            return Err(CartError::MutationRejected("no lines to remove".into()));
        }
        let cart_id = self.require_cart_id().await?;

        let cart = match self.shared.gateway.remove_lines(&cart_id, line_ids).await {
            Ok(cart) => cart,
            Err(e) => return Err(self.mutation_failed(&cart_id, e).await),
        };

        add_breadcrumb("cart", "Removed items", None);
        Ok(cart)
    }

    async fn create_cart(&self) -> Result<CartId, CartError> {
        let cart = self.shared.gateway.create_cart().await.map_err(|e| {
            warn!(error = %e, "Cart creation failed");
            CartError::from_create(e)
        })?;

        if let Err(e) = self.shared.store.save(&cart.id).await {
            // The id still lives in memory for this session.
            warn!(cart_id = %cart.id, error = %e, "Failed to persist cart id");
        }
        debug!(cart_id = %cart.id, "Created cart");
        Ok(cart.id)
    }

    async fn require_cart_id(&self) -> Result<CartId, CartError> {
        self.shared
            .load_cart_id()
            .await
            .ok_or_else(|| CartError::MutationRejected("no active cart".into()))
    }

    /// Map a failed update/remove. A missing cart is forgotten on the spot.
    async fn mutation_failed(&self, cart_id: &CartId, error: GatewayError) -> CartError {
        warn!(cart_id = %cart_id, error = %error, "Cart mutation failed");
        if error == GatewayError::Missing {
            self.forget_cart(cart_id).await;
        }
        CartError::from_mutation(error)
    }

    async fn forget_cart(&self, cart_id: &CartId) {
        self.shared.forget_cart_id(cart_id).await;
        self.shared.state.send_modify(|state| {
            state.cart = None;
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use packon_core::{CurrencyCode, Money, SelectedOptions};
    use rust_decimal::Decimal;

    use super::*;
    use crate::cart::{CartErrorKind, MemoryCartIdentityStore};
    use crate::shopify::{CartCost, CartLine, CartMerchandise, CartProduct};

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn cart(id: &str, lines: &[(&str, &str, u32)]) -> Cart {
        let price = Money::new(Decimal::from_str("0.50").unwrap(), CurrencyCode::BRL);
        Cart {
            id: CartId::new(id),
            checkout_url: Url::parse(&format!("https://packon.com.br/checkout/{id}")).unwrap(),
            total_quantity: lines.iter().map(|(_, _, q)| q).sum(),
            cost: CartCost {
                subtotal: price,
                total: price,
            },
            lines: lines
                .iter()
                .map(|(line, variant, quantity)| CartLine {
                    id: CartLineId::new(*line),
                    quantity: nz(*quantity),
                    merchandise: CartMerchandise {
                        id: VariantId::new(*variant),
                        title: "Default Title".to_string(),
                        price,
                        selected_options: SelectedOptions::new(),
                        product: CartProduct {
                            title: "Saco".to_string(),
                            handle: "saco".to_string(),
                            image: None,
                        },
                    },
                })
                .collect(),
        }
    }

    /// Answers every call with one canned result and records call names.
    struct StubGateway {
        answer: Result<Cart, GatewayError>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl StubGateway {
        fn new(answer: Result<Cart, GatewayError>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn answer(&self, call: &'static str) -> Result<Cart, GatewayError> {
            self.calls.lock().unwrap().push(call);
            self.answer.clone()
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CartGateway for StubGateway {
        async fn create_cart(&self) -> Result<Cart, GatewayError> {
            self.answer("create")
        }

        async fn add_lines(&self, _: &CartId, _: Vec<CartLineInput>) -> Result<Cart, GatewayError> {
            self.answer("add")
        }

        async fn update_lines(
            &self,
            _: &CartId,
            _: Vec<CartLineUpdate>,
        ) -> Result<Cart, GatewayError> {
            self.answer("update")
        }

        async fn remove_lines(&self, _: &CartId, _: Vec<CartLineId>) -> Result<Cart, GatewayError> {
            self.answer("remove")
        }

        async fn read_cart(&self, _: &CartId) -> Result<Cart, GatewayError> {
            self.answer("read")
        }
    }

    #[tokio::test]
    async fn test_first_add_creates_and_persists_cart() {
        let gateway = StubGateway::new(Ok(cart("c1", &[("l1", "v1", 500)])));
        let store = Arc::new(MemoryCartIdentityStore::new());
        let manager = CartStateManager::spawn(gateway.clone(), store.clone());

        let result = manager.add_item(VariantId::new("v1"), nz(500)).await.unwrap();

        assert_eq!(result.item_count(), 500);
        assert_eq!(gateway.calls(), vec!["create", "add"]);
        assert_eq!(store.load().await.unwrap(), Some(CartId::new("c1")));
        assert_eq!(manager.snapshot().item_count(), 500);
        assert_eq!(
            manager.checkout_url().unwrap().as_str(),
            "https://packon.com.br/checkout/c1"
        );
    }

    #[tokio::test]
    async fn test_failed_create_leaves_state_untouched() {
        let gateway = StubGateway::new(Err(GatewayError::Missing));
        let store = Arc::new(MemoryCartIdentityStore::new());
        let manager = CartStateManager::spawn(gateway.clone(), store.clone());

        let err = manager.add_item(VariantId::new("v1"), nz(1)).await.unwrap_err();

        assert_eq!(err.kind(), CartErrorKind::CartCreationFailed);
        assert_eq!(gateway.calls(), vec!["create"]);
        assert_eq!(store.load().await.unwrap(), None);
        let snapshot = manager.snapshot();
        assert!(snapshot.cart.is_none());
        assert_eq!(snapshot.last_error, Some(CartErrorKind::CartCreationFailed));
    }

    #[tokio::test]
    async fn test_update_without_cart_is_rejected_without_io() {
        let gateway = StubGateway::new(Ok(cart("c1", &[])));
        let manager =
            CartStateManager::spawn(gateway.clone(), Arc::new(MemoryCartIdentityStore::new()));

        let err = manager
            .update_quantity(CartLineId::new("l1"), nz(2))
            .await
            .unwrap_err();

        assert_eq!(err, CartError::MutationRejected("no active cart".to_string()));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remove_nothing_is_rejected() {
        let gateway = StubGateway::new(Ok(cart("c1", &[])));
        let store = Arc::new(MemoryCartIdentityStore::with_id(CartId::new("c1")));
        let manager = CartStateManager::spawn(gateway.clone(), store);

        let err = manager.remove_items(Vec::new()).await.unwrap_err();
        assert_eq!(err.kind(), CartErrorKind::MutationRejected);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_hydrate_keeps_persisted_id() {
        let gateway = StubGateway::new(Err(GatewayError::Transport("timeout".to_string())));
        let store = Arc::new(MemoryCartIdentityStore::with_id(CartId::new("c1")));
        let manager = CartStateManager::spawn(gateway, store.clone());

        let err = manager.hydrate().await.unwrap_err();

        assert_eq!(err.kind(), CartErrorKind::NetworkUnavailable);
        assert_eq!(store.load().await.unwrap(), Some(CartId::new("c1")));
        let snapshot = manager.snapshot();
        assert!(snapshot.cart.is_none());
        assert_eq!(snapshot.last_error, Some(CartErrorKind::NetworkUnavailable));
    }

    #[tokio::test]
    async fn test_hydrate_restores_cart() {
        let gateway = StubGateway::new(Ok(cart("c1", &[("l1", "v1", 300)])));
        let store = Arc::new(MemoryCartIdentityStore::with_id(CartId::new("c1")));
        let manager = CartStateManager::spawn(gateway.clone(), store);

        let snapshot = manager.hydrate().await.unwrap();

        assert_eq!(snapshot.item_count(), 300);
        assert_eq!(gateway.calls(), vec!["read"]);
    }

    #[tokio::test]
    async fn test_hydrate_without_id_does_no_io() {
        let gateway = StubGateway::new(Ok(cart("c1", &[])));
        let manager =
            CartStateManager::spawn(gateway.clone(), Arc::new(MemoryCartIdentityStore::new()));

        let snapshot = manager.hydrate().await.unwrap();

        assert!(snapshot.cart.is_none());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_cart_on_update_forgets_it() {
        let gateway = StubGateway::new(Err(GatewayError::Missing));
        let store = Arc::new(MemoryCartIdentityStore::with_id(CartId::new("c1")));
        let manager = CartStateManager::spawn(gateway, store.clone());

        let err = manager
            .update_quantity(CartLineId::new("l1"), nz(3))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), CartErrorKind::MutationRejected);
        assert_eq!(store.load().await.unwrap(), None);
        assert!(manager.snapshot().cart.is_none());
    }

    #[tokio::test]
    async fn test_drawer_toggles_without_io() {
        let gateway = StubGateway::new(Ok(cart("c1", &[])));
        let manager =
            CartStateManager::spawn(gateway.clone(), Arc::new(MemoryCartIdentityStore::new()));
        let mut updates = manager.subscribe();

        manager.open_cart();
        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().is_open);

        manager.open_cart();
        assert!(!updates.has_changed().unwrap());

        manager.toggle_cart();
        assert!(!manager.snapshot().is_open);
        manager.toggle_cart();
        manager.close_cart();
        assert!(!manager.snapshot().is_open);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_future_still_applies() {
        let gateway = StubGateway::new(Ok(cart("c1", &[("l1", "v1", 100)])));
        let store = Arc::new(MemoryCartIdentityStore::new());
        let manager = CartStateManager::spawn(gateway.clone(), store);
        let mut updates = manager.subscribe();

        drop(manager.add_item(VariantId::new("v1"), nz(100)));

        updates
            .wait_for(|snapshot| snapshot.cart.is_some())
            .await
            .unwrap();
        assert_eq!(gateway.calls(), vec!["create", "add"]);
    }
}
