//! Backend service clients.
//!
//! # Architecture
//!
//! - Uses `reqwest` with JSON bodies; responses are taken as raw
//!   `serde_json::Value` and handed to the normalizers - the backends'
//!   shapes are not trusted enough for strict deserialization
//! - Endpoint variants (path-based vs query-param-based vs body-based)
//!   are tried in a fixed order on 404/405, short-circuiting on the first
//!   success; only the final failure surfaces
//! - Catalog responses are cached in-memory via `moka` (5 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mercadito_engine::api::Engine;
//! use mercadito_engine::snapshot::MemoryStore;
//! use mercadito_engine::EngineConfig;
//!
//! let config = EngineConfig::from_env()?;
//! let engine = Engine::new(&config, Arc::new(MemoryStore::new()));
//!
//! engine.auth().login("ana@example.com", "secret").await?;
//! engine.cart().add(ProductId::new(3), 1).await?;
//! let lines = engine.cart().view(engine.catalog()).await;
//! ```

mod auth;
mod cart;
mod catalog;
mod orders;

pub use auth::AuthApi;
pub use cart::{CartApi, CartView};
pub use catalog::{CatalogApi, ProductInput};
pub use orders::OrdersApi;

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::warn;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result, is_variant_miss};
use crate::events::EventBus;
use crate::session::SessionContext;
use crate::snapshot::{KeyValueStore, SnapshotStore};

/// The durable store as shared trait object; every engine component holds
/// a clone of the same `Arc`.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Send a request and take the body as raw JSON.
///
/// Non-success statuses map through [`EngineError::from_status`]; a body
/// that is not JSON degrades to `Value::Null` (malformed payloads are a
/// normalizer concern, never an error).
pub(crate) async fn send_json(request: reqwest::RequestBuilder) -> Result<Value> {
    let response = request.send().await?;
    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        return Err(EngineError::from_status(status));
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
}

/// Try endpoint variants in order, short-circuiting on the first success.
///
/// 404/405 mean "this backend build doesn't map that route" and move on
/// to the next variant; every other failure surfaces immediately.
pub(crate) async fn try_variants(
    what: &str,
    variants: Vec<reqwest::RequestBuilder>,
) -> Result<Value> {
    let mut last_status = 404;

    for (idx, request) in variants.into_iter().enumerate() {
        match send_json(request).await {
            Ok(value) => return Ok(value),
            Err(EngineError::Status { status }) if is_variant_miss(status) => {
                warn!(what, variant = idx, status, "endpoint variant missed, trying next");
                last_status = status;
            }
            Err(other) => return Err(other),
        }
    }

    Err(EngineError::EndpointExhausted { last_status })
}

/// Headers every authenticated call carries: bearer token and the user id
/// the cart/order services key on.
pub(crate) fn auth_headers(session: &SessionContext<SharedStore>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(token) = session.token()
        && let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
    {
        headers.insert(AUTHORIZATION, value);
    }

    if let Some(user_id) = session.identity().user_id
        && let Ok(value) = HeaderValue::from_str(&user_id.to_string())
    {
        headers.insert("X-User-Id", value);
    }

    headers
}

/// Clear the session on a terminal authorization failure.
///
/// Auth endpoints bypass this (a failed login must not clear the session
/// being established, and it keeps redirect loops out of the caller).
pub(crate) fn guard_session(session: &SessionContext<SharedStore>, err: EngineError) -> EngineError {
    if err.is_unauthorized() {
        warn!("authorization rejected, clearing session");
        session.clear();
    }
    err
}

// =============================================================================
// Engine
// =============================================================================

/// The wired-up engine: session context, snapshot store, event bus and the
/// four service clients sharing one HTTP client.
///
/// Cheaply cloneable; construct once at app start with the environment's
/// durable store and inject wherever needed.
#[derive(Clone)]
pub struct Engine {
    session: Arc<SessionContext<SharedStore>>,
    snapshot: Arc<SnapshotStore<SharedStore>>,
    events: EventBus,
    catalog: CatalogApi,
    cart: CartApi,
    auth: AuthApi,
    orders: OrdersApi,
}

impl Engine {
    /// Wire up all engine components over one durable store.
    #[must_use]
    pub fn new(config: &EngineConfig, store: SharedStore) -> Self {
        let client = reqwest::Client::new();
        let events = EventBus::new();
        let session = Arc::new(SessionContext::new(Arc::clone(&store), events.clone()));
        let snapshot = Arc::new(SnapshotStore::new(store));

        let catalog = CatalogApi::new(client.clone(), &config.catalog_base, Arc::clone(&session));
        let cart = CartApi::new(
            client.clone(),
            &config.cart_base,
            Arc::clone(&session),
            Arc::clone(&snapshot),
            events.clone(),
        );
        let auth = AuthApi::new(
            client.clone(),
            &config.auth_base,
            Arc::clone(&session),
            Arc::clone(&snapshot),
        );
        let orders = OrdersApi::new(client, &config.order_base, Arc::clone(&session));

        Self {
            session,
            snapshot,
            events,
            catalog,
            cart,
            auth,
            orders,
        }
    }

    /// The session context.
    #[must_use]
    pub fn session(&self) -> &SessionContext<SharedStore> {
        &self.session
    }

    /// The local cart snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &SnapshotStore<SharedStore> {
        &self.snapshot
    }

    /// The event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// The catalog service client.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogApi {
        &self.catalog
    }

    /// The cart service client.
    #[must_use]
    pub const fn cart(&self) -> &CartApi {
        &self.cart
    }

    /// The auth service client.
    #[must_use]
    pub const fn auth(&self) -> &AuthApi {
        &self.auth
    }

    /// The order service client.
    #[must_use]
    pub const fn orders(&self) -> &OrdersApi {
        &self.orders
    }
}
