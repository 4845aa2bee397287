//! Order service client.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use mercadito_core::{Order, OrderId, OrderStatus};

use super::{SharedStore, auth_headers, guard_session, send_json, try_variants};
use crate::error::{EngineError, Result};
use crate::normalize::{normalize_order, normalize_order_list};
use crate::session::SessionContext;

/// Client for the order service.
///
/// The service keys everything on the `X-User-Id` header, so all calls
/// require a logged-in session.
#[derive(Clone)]
pub struct OrdersApi {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    base: String,
    session: Arc<SessionContext<SharedStore>>,
}

impl OrdersApi {
    pub(crate) fn new(
        client: reqwest::Client,
        base: &Url,
        session: Arc<SessionContext<SharedStore>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                base: base.as_str().trim_end_matches('/').to_string(),
                session,
            }),
        }
    }

    fn require_login(&self) -> Result<()> {
        if self.inner.session.identity().user_id.is_some() {
            Ok(())
        } else {
            Err(EngineError::Unauthorized { status: 401 })
        }
    }

    /// Place an order from the server-side cart.
    ///
    /// The service builds the order from the cart it holds for the user,
    /// so the request carries no payload beyond an empty object.
    #[instrument(skip(self))]
    pub async fn place_order(&self) -> Result<Option<Order>> {
        self.require_login()?;

        let request = self
            .inner
            .client
            .post(format!("{}/orders", self.inner.base))
            .headers(auth_headers(&self.inner.session))
            .json(&json!({}));

        let body = send_json(request)
            .await
            .map_err(|e| guard_session(&self.inner.session, e))?;
        Ok(normalize_order(&body))
    }

    /// The logged-in user's order history, in the service's own ordering.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>> {
        self.require_login()?;

        let request = self
            .inner
            .client
            .get(format!("{}/orders", self.inner.base))
            .headers(auth_headers(&self.inner.session));

        let body = send_json(request)
            .await
            .map_err(|e| guard_session(&self.inner.session, e))?;
        Ok(normalize_order_list(&body))
    }

    /// Every order in the system. The service only honors this for the
    /// admin user.
    #[instrument(skip(self))]
    pub async fn all_orders(&self) -> Result<Vec<Order>> {
        self.require_login()?;

        let request = self
            .inner
            .client
            .get(format!("{}/orders/all", self.inner.base))
            .headers(auth_headers(&self.inner.session));

        let body = send_json(request)
            .await
            .map_err(|e| guard_session(&self.inner.session, e))?;
        Ok(normalize_order_list(&body))
    }

    /// How many orders the user has. Failures read as zero so callers can
    /// decorate UI without error handling.
    #[instrument(skip(self))]
    pub async fn order_count(&self) -> u32 {
        match self.my_orders().await {
            Ok(orders) => u32::try_from(orders.len()).unwrap_or(u32::MAX),
            Err(e) => {
                debug!(error = %e, "order count unavailable");
                0
            }
        }
    }

    /// Move an order to a new lifecycle state.
    ///
    /// Tries the admin route first; builds where the admin route isn't
    /// mapped fall through to the internal one.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: &OrderStatus) -> Result<()> {
        self.require_login()?;

        let headers = auth_headers(&self.inner.session);
        let body = json!({ "estado": status.as_wire() });

        let variants = vec![
            self.inner
                .client
                .put(format!("{}/orders/{id}/status", self.inner.base))
                .headers(headers.clone())
                .json(&body),
            self.inner
                .client
                .put(format!("{}/orders/internal/{id}/status", self.inner.base))
                .headers(headers)
                .json(&body),
        ];

        try_variants("order status update", variants)
            .await
            .map_err(|e| guard_session(&self.inner.session, e))
            .map(|_| ())
    }
}
