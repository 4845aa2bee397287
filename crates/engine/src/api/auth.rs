//! Auth service client.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};
use url::Url;

use mercadito_core::SessionIdentity;

use super::{SharedStore, auth_headers, guard_session, send_json};
use crate::error::{EngineError, Result};
use crate::session::{SessionContext, extract_identity, extract_token};
use crate::snapshot::SnapshotStore;

/// Client for the auth service.
///
/// Unlike the other clients, authorization failures here never clear the
/// session: a failed login attempt must not log out whoever is already in.
#[derive(Clone)]
pub struct AuthApi {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    base: String,
    session: Arc<SessionContext<SharedStore>>,
    snapshot: Arc<SnapshotStore<SharedStore>>,
}

impl AuthApi {
    pub(crate) fn new(
        client: reqwest::Client,
        base: &Url,
        session: Arc<SessionContext<SharedStore>>,
        snapshot: Arc<SnapshotStore<SharedStore>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                base: base.as_str().trim_end_matches('/').to_string(),
                session,
                snapshot,
            }),
        }
    }

    /// Log in and persist the resulting session.
    ///
    /// The token may arrive in the body under several keys or in the
    /// `Authorization` response header; a success response carrying no
    /// token at all is treated as rejected credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionIdentity> {
        let response = self
            .inner
            .client
            .post(format!("{}/auth/login", self.inner.base))
            .json(&json!({ "correo": email, "password": password }))
            .send()
            .await?;

        let status = response.status().as_u16();
        // Backends signal bad credentials as 401, 403 or 404 depending on
        // whether the lookup or the password check failed first.
        if matches!(status, 401 | 403 | 404) {
            return Err(EngineError::Unauthorized { status });
        }
        if !(200..300).contains(&status) {
            return Err(EngineError::from_status(status));
        }

        let authorization = response
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if extract_token(&body, authorization.as_deref()).is_none() {
            warn!("login response carried no token");
            return Err(EngineError::Unauthorized { status });
        }

        let identity = self.inner.session.apply_login(&body, authorization.as_deref());
        debug!(user_id = ?identity.user_id, "login succeeded");
        Ok(identity)
    }

    /// Create an account. Does not log in; callers chain [`Self::login`]
    /// afterwards.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        let request = self
            .inner
            .client
            .post(format!("{}/auth/register", self.inner.base))
            .json(&json!({ "correo": email, "password": password }));

        send_json(request).await.map(|_| ())
    }

    /// The server's view of the current user.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<SessionIdentity> {
        let request = self
            .inner
            .client
            .get(format!("{}/auth/profile", self.inner.base))
            .headers(auth_headers(&self.inner.session));

        let body = send_json(request)
            .await
            .map_err(|e| guard_session(&self.inner.session, e))?;
        Ok(extract_identity(&body, None))
    }

    /// Log out. The server call is best effort; local session and cart
    /// snapshot are cleared no matter what it returns.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let request = self
            .inner
            .client
            .post(format!("{}/auth/logout", self.inner.base))
            .headers(auth_headers(&self.inner.session))
            .json(&json!({}));

        if let Err(e) = send_json(request).await {
            debug!(error = %e, "server logout failed, clearing locally anyway");
        }

        self.inner.snapshot.clear();
        self.inner.session.clear();
    }
}
