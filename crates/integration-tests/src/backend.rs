//! In-memory cart backend.
//!
//! Behaves like the Storefront API as far as the cart manager can tell:
//! adding a variant that already has a line merges into it, every call
//! answers with the whole cart, and line ids are assigned server-side.
//! Tests can script failures, add response latency and count calls.

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use packon_core::{CartId, CartLineId, CurrencyCode, Money, SelectedOptions, VariantId};
use packon_storefront::shopify::{
    Cart, CartCost, CartLine, CartLineInput, CartLineUpdate, CartMerchandise, CartProduct,
};
use packon_storefront::{CartGateway, GatewayError};
use rust_decimal::Decimal;
use url::Url;

/// Gateway operations, for scripting and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Add,
    Update,
    Remove,
    Read,
}

#[derive(Debug, Clone)]
struct StoredLine {
    id: CartLineId,
    variant_id: VariantId,
    quantity: NonZeroU32,
}

#[derive(Debug, Default)]
struct State {
    carts: HashMap<CartId, Vec<StoredLine>>,
    next_id: u64,
    calls: HashMap<Operation, usize>,
    failures: HashMap<Operation, VecDeque<GatewayError>>,
    latencies: HashMap<Operation, VecDeque<Duration>>,
    line_cap: Option<NonZeroU32>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Cart backend double implementing [`CartGateway`].
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

/// Price of every unit the backend sells.
pub fn unit_price() -> Money {
    Money::new(Decimal::new(50, 2), CurrencyCode::BRL)
}

impl FakeBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap merged line quantities, the way a store limits units per order.
    #[must_use]
    pub fn with_line_cap(cap: NonZeroU32) -> Self {
        let backend = Self::default();
        backend.lock().line_cap = Some(cap);
        backend
    }

    /// Make the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: Operation, error: GatewayError) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Delay the next response of `operation`. The backend applies the call
    /// first, so the answer reflects the state at the time it was received.
    pub fn delay_next(&self, operation: Operation, latency: Duration) {
        self.lock()
            .latencies
            .entry(operation)
            .or_default()
            .push_back(latency);
    }

    /// How many times `operation` was called, failures included.
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Expire a cart, as the backend does with abandoned ones.
    pub fn expire(&self, cart_id: &CartId) {
        self.lock().carts.remove(cart_id);
    }

    /// The backend's current view of a cart.
    pub fn cart(&self, cart_id: &CartId) -> Option<Cart> {
        let state = self.lock();
        state
            .carts
            .get(cart_id)
            .and_then(|lines| render(cart_id, lines).ok())
    }

    /// Number of carts the backend holds.
    pub fn cart_count(&self) -> usize {
        self.lock().carts.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call, apply it unless a failure is scripted, then wait out
    /// any scripted latency.
    async fn handle(
        &self,
        operation: Operation,
        apply: impl FnOnce(&mut State) -> Result<Cart, GatewayError>,
    ) -> Result<Cart, GatewayError> {
        let (result, latency) = {
            let mut state = self.lock();
            *state.calls.entry(operation).or_default() += 1;
            let latency = state
                .latencies
                .get_mut(&operation)
                .and_then(VecDeque::pop_front);
            let failure = state
                .failures
                .get_mut(&operation)
                .and_then(VecDeque::pop_front);
            let result = match failure {
                Some(error) => Err(error),
                None => apply(&mut *state),
            };
            (result, latency)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        result
    }
}

fn lines_mut<'s>(
    state: &'s mut State,
    cart_id: &CartId,
) -> Result<&'s mut Vec<StoredLine>, GatewayError> {
    state.carts.get_mut(cart_id).ok_or(GatewayError::Missing)
}

fn render(cart_id: &CartId, lines: &[StoredLine]) -> Result<Cart, GatewayError> {
    let key = cart_id.as_str().rsplit('/').next().unwrap_or_default();
    let checkout_url = Url::parse(&format!("https://packon.test/cart/c/{key}"))
        .map_err(|e| GatewayError::Transport(e.to_string()))?;
    let price = unit_price();
    let total_quantity: u32 = lines.iter().map(|line| line.quantity.get()).sum();
    let amount = price.amount * Decimal::from(total_quantity);
    let cost = Money::new(amount, price.currency_code);

    Ok(Cart {
        id: cart_id.clone(),
        checkout_url,
        total_quantity,
        cost: CartCost {
            subtotal: cost,
            total: cost,
        },
        lines: lines
            .iter()
            .map(|line| CartLine {
                id: line.id.clone(),
                quantity: line.quantity,
                merchandise: CartMerchandise {
                    id: line.variant_id.clone(),
                    title: "Default Title".to_string(),
                    price,
                    selected_options: SelectedOptions::new(),
                    product: CartProduct {
                        title: format!("Product {}", line.variant_id),
                        handle: "product".to_string(),
                        image: None,
                    },
                },
            })
            .collect(),
    })
}

#[async_trait]
impl CartGateway for FakeBackend {
    async fn create_cart(&self) -> Result<Cart, GatewayError> {
        self.handle(Operation::Create, |state| {
            let cart_id = CartId::new(format!("gid://shopify/Cart/{}", state.next_id()));
            state.carts.insert(cart_id.clone(), Vec::new());
            render(&cart_id, &[])
        })
        .await
    }

    async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, GatewayError> {
        self.handle(Operation::Add, |state| {
            let cap = state.line_cap;
            for input in lines {
                let line_id = CartLineId::new(format!("gid://shopify/CartLine/{}", state.next_id()));
                let stored = lines_mut(state, cart_id)?;
                match stored.iter_mut().find(|l| l.variant_id == input.merchandise_id) {
                    Some(existing) => {
                        let merged = existing.quantity.saturating_add(input.quantity.get());
                        existing.quantity = cap.map_or(merged, |cap| merged.min(cap));
                    }
                    None => stored.push(StoredLine {
                        id: line_id,
                        variant_id: input.merchandise_id,
                        quantity: cap.map_or(input.quantity, |cap| input.quantity.min(cap)),
                    }),
                }
            }
            render(cart_id, lines_mut(state, cart_id)?)
        })
        .await
    }

    async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdate>,
    ) -> Result<Cart, GatewayError> {
        self.handle(Operation::Update, |state| {
            let stored = lines_mut(state, cart_id)?;
            for update in &lines {
                let line = stored
                    .iter_mut()
                    .find(|l| l.id == update.id)
                    .ok_or_else(|| GatewayError::Rejected(format!("line {} not found", update.id)))?;
                line.quantity = update.quantity;
            }
            render(cart_id, stored)
        })
        .await
    }

    async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, GatewayError> {
        self.handle(Operation::Remove, |state| {
            let stored = lines_mut(state, cart_id)?;
            if let Some(unknown) = line_ids.iter().find(|id| !stored.iter().any(|l| &l.id == *id)) {
                return Err(GatewayError::Rejected(format!("line {unknown} not found")));
            }
            stored.retain(|l| !line_ids.contains(&l.id));
            render(cart_id, stored)
        })
        .await
    }

    async fn read_cart(&self, cart_id: &CartId) -> Result<Cart, GatewayError> {
        self.handle(Operation::Read, |state| {
            render(cart_id, lines_mut(state, cart_id)?)
        })
        .await
    }
}
