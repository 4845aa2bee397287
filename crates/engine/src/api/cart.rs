//! Cart service client.
//!
//! Mutations run under a lock so concurrent taps cannot interleave their
//! snapshot writes; fetches carry a generation guard so a response that
//! raced a mutation is discarded and retried instead of painting stale
//! lines over fresher state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use url::Url;

use mercadito_core::{CartViewLine, ProductId, UserId};

use super::{CatalogApi, SharedStore, auth_headers, guard_session, try_variants};
use crate::error::{EngineError, Result};
use crate::events::{EngineEvent, EventBus};
use crate::normalize::{extract_count, normalize_cart_response};
use crate::reconcile::{badge_count, display_total, reconcile};
use crate::session::SessionContext;
use crate::snapshot::SnapshotStore;

/// How often a fetch raced by mutations is retried before the latest
/// response is accepted as-is.
const MAX_STALE_RETRIES: u32 = 3;

/// A reconciled cart ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub lines: Vec<CartViewLine>,
    pub total: Decimal,
}

/// Client for the cart service.
#[derive(Clone)]
pub struct CartApi {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    base: String,
    session: Arc<SessionContext<SharedStore>>,
    snapshot: Arc<SnapshotStore<SharedStore>>,
    events: EventBus,
    mutation_lock: Mutex<()>,
    generation: AtomicU64,
}

impl CartApi {
    pub(crate) fn new(
        client: reqwest::Client,
        base: &Url,
        session: Arc<SessionContext<SharedStore>>,
        snapshot: Arc<SnapshotStore<SharedStore>>,
        events: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                base: base.as_str().trim_end_matches('/').to_string(),
                session,
                snapshot,
                events,
                mutation_lock: Mutex::new(()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    fn user_id(&self) -> Result<UserId> {
        self.inner
            .session
            .identity()
            .user_id
            .ok_or(EngineError::Unauthorized { status: 401 })
    }

    /// The raw cart payload for the logged-in user.
    ///
    /// Tries the header-keyed route first, then the path-keyed one. If a
    /// mutation lands while the request is in flight the response is
    /// stale and the fetch reruns, up to [`MAX_STALE_RETRIES`] times.
    #[instrument(skip(self))]
    pub async fn fetch_raw(&self) -> Result<Value> {
        let user_id = self.user_id()?;
        let mut retries = 0;

        loop {
            let generation = self.inner.generation.load(Ordering::Acquire);
            let headers = auth_headers(&self.inner.session);
            let variants = vec![
                self.inner
                    .client
                    .get(format!("{}/carrito/usuario", self.inner.base))
                    .headers(headers.clone()),
                self.inner
                    .client
                    .get(format!("{}/carrito/usuario/{user_id}", self.inner.base))
                    .headers(headers),
            ];

            let body = try_variants("cart fetch", variants)
                .await
                .map_err(|e| guard_session(&self.inner.session, e))?;

            if self.inner.generation.load(Ordering::Acquire) == generation {
                return Ok(body);
            }
            if retries >= MAX_STALE_RETRIES {
                warn!(retries, "cart kept changing during fetch, using latest response");
                return Ok(body);
            }
            retries += 1;
            debug!(retries, "cart changed during fetch, retrying");
        }
    }

    /// Cart lines normalized from the server payload.
    #[instrument(skip(self))]
    pub async fn fetch_lines(&self) -> Result<Vec<CartViewLine>> {
        let body = self.fetch_raw().await?;
        Ok(normalize_cart_response(&body))
    }

    /// The reconciled cart view: server lines when present, otherwise the
    /// local snapshot hydrated through the catalog.
    #[instrument(skip(self, catalog))]
    pub async fn view(&self, catalog: &CatalogApi) -> CartView {
        let raw = self.fetch_raw().await;
        let (server, raw_total) = match &raw {
            Ok(body) => (Ok(normalize_cart_response(body)), Some(body)),
            Err(e) => (Err(e), None),
        };

        // The catalog is only consulted when the display has to rebuild
        // from the snapshot; a server cart with lines never touches it.
        let needs_catalog = !matches!(&server, Ok(lines) if !lines.is_empty());
        let snapshot = self.inner.snapshot.read_all();
        let products = if needs_catalog && !snapshot.is_empty() {
            catalog.list_products().await.unwrap_or_default()
        } else {
            Vec::new()
        };

        let lines = reconcile(server, &snapshot, |id| {
            products.iter().find(|p| p.id == id).cloned()
        });
        let total = display_total(raw_total, &lines);

        CartView { lines, total }
    }

    /// The number to show on the cart badge.
    ///
    /// Logged out, the local snapshot is all there is. Logged in, the
    /// larger of server count and local count wins; a failed fetch falls
    /// back to the local count rather than flashing zero.
    #[instrument(skip(self))]
    pub async fn badge(&self) -> u32 {
        let local = self.inner.snapshot.count();
        if !self.inner.session.is_logged_in() {
            return local;
        }

        match self.fetch_raw().await {
            Ok(body) => badge_count(extract_count(&body), local),
            Err(e) => {
                debug!(error = %e, "cart fetch failed, badge from local snapshot");
                local
            }
        }
    }

    /// Add `quantity` of a product to the cart.
    #[instrument(skip(self))]
    pub async fn add(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        let user_id = self.user_id()?;
        let quantity = quantity.max(1);
        let headers = auth_headers(&self.inner.session);

        let variants = vec![
            self.inner
                .client
                .post(format!("{}/carrito/agregar", self.inner.base))
                .headers(headers.clone())
                .json(&json!({
                    "idUsuario": user_id,
                    "idProducto": product_id,
                    "cantidad": quantity,
                })),
            self.inner
                .client
                .post(format!("{}/carrito/agregar", self.inner.base))
                .headers(headers)
                .query(&[
                    ("idProducto", product_id.to_string()),
                    ("cantidad", quantity.to_string()),
                ]),
        ];

        self.mutate("cart add", variants, |snapshot| {
            snapshot.add(product_id, i32::try_from(quantity).unwrap_or(i32::MAX));
        })
        .await
    }

    /// Set the quantity of a line. Zero removes it.
    #[instrument(skip(self))]
    pub async fn set_quantity(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return self.remove(product_id).await;
        }

        let user_id = self.user_id()?;
        let headers = auth_headers(&self.inner.session);
        let body = json!({
            "idUsuario": user_id,
            "idProducto": product_id,
            "cantidad": quantity,
        });

        let variants = vec![
            self.inner
                .client
                .put(format!("{}/carrito/actualizar", self.inner.base))
                .headers(headers.clone())
                .json(&body),
            self.inner
                .client
                .put(format!("{}/carrito/actualizar", self.inner.base))
                .headers(headers)
                .query(&[
                    ("idProducto", product_id.to_string()),
                    ("cantidad", quantity.to_string()),
                ]),
        ];

        self.mutate("cart update", variants, |snapshot| {
            snapshot.set(product_id, quantity);
        })
        .await
    }

    /// Remove a line entirely.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId) -> Result<()> {
        self.user_id()?;
        let headers = auth_headers(&self.inner.session);

        let variants = vec![
            self.inner
                .client
                .delete(format!("{}/carrito/producto/{product_id}", self.inner.base))
                .headers(headers.clone()),
            self.inner
                .client
                .delete(format!("{}/carrito/eliminar", self.inner.base))
                .headers(headers)
                .query(&[("idProducto", product_id.to_string())]),
        ];

        self.mutate("cart remove", variants, |snapshot| {
            snapshot.remove(product_id);
        })
        .await
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        self.user_id()?;
        let headers = auth_headers(&self.inner.session);

        let variants = vec![
            self.inner
                .client
                .delete(format!("{}/carrito/limpiar", self.inner.base))
                .headers(headers.clone()),
            self.inner
                .client
                .delete(format!("{}/carrito/vaciar", self.inner.base))
                .headers(headers),
        ];

        self.mutate("cart clear", variants, SnapshotStore::clear).await
    }

    /// Run one cart mutation end to end.
    ///
    /// The snapshot is only touched after the server confirmed; the
    /// change event fires regardless of outcome so listeners refetch and
    /// converge on whatever state the server actually has.
    async fn mutate(
        &self,
        what: &str,
        variants: Vec<reqwest::RequestBuilder>,
        on_success: impl FnOnce(&SnapshotStore<SharedStore>),
    ) -> Result<()> {
        let _guard = self.inner.mutation_lock.lock().await;

        let result = try_variants(what, variants)
            .await
            .map_err(|e| guard_session(&self.inner.session, e));

        if result.is_ok() {
            on_success(&self.inner.snapshot);
            self.inner.generation.fetch_add(1, Ordering::AcqRel);
        } else {
            warn!(what, "cart mutation failed");
        }

        self.inner.events.emit(EngineEvent::CartChanged);
        result.map(|_| ())
    }
}
