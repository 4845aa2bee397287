//! Session identity extraction and the owned session context.
//!
//! Login responses scatter identity across flat body fields, a nested
//! `user` object and the bearer token's claims, and some backend builds
//! only hand the token back through the `Authorization` response header.
//! Resolution order is fixed: body fields first, token claims as the
//! fallback supplier. Claim decoding reads the token's middle segment as
//! base64url JSON; it never verifies a signature and never errors -
//! undecodable segments simply contribute no claims.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use mercadito_core::{SessionIdentity, UserId};

use crate::events::{EngineEvent, EventBus};
use crate::resolve::{resolve, resolve_id, resolve_string, value_to_i64};
use crate::snapshot::KeyValueStore;

/// Durable store keys for session state.
pub mod keys {
    /// Bearer token.
    pub const TOKEN: &str = "token";
    /// Backend user id, stringified.
    pub const USER_ID: &str = "userId";
    /// Display username.
    pub const USERNAME: &str = "username";
    /// Account email.
    pub const EMAIL: &str = "correo";
    /// JSON-encoded role list.
    pub const ROLES: &str = "roles";
    /// Catalog page-size preference.
    pub const PAGE_SIZE: &str = "pageSize";
}

/// Candidate body fields for the bearer token, in resolution order.
const TOKEN_CANDIDATES: &[&str] = &["token", "jwtToken", "accessToken", "jwt"];
/// Candidate key paths for the user id, body first, then claims.
const USER_ID_CANDIDATES: &[&str] = &["id", "userId", "usuarioId", "user.id"];
/// Candidate key paths for the email.
const EMAIL_CANDIDATES: &[&str] = &["correo", "email", "user.correo", "user.email"];
/// Candidate key paths for the username.
const USERNAME_CANDIDATES: &[&str] = &["username", "nombreUsuario", "user.username"];
/// Candidate key paths for roles in the body.
const ROLES_CANDIDATES: &[&str] = &["roles", "user.roles"];

/// Extract the bearer token from a login response.
///
/// Body fields win over the `Authorization` response header; a `Bearer `
/// prefix is stripped wherever it appears. First non-empty wins.
#[must_use]
pub fn extract_token(body: &Value, authorization_header: Option<&str>) -> Option<String> {
    for candidate in TOKEN_CANDIDATES {
        if let Some(Value::String(s)) = resolve(Some(body), &[candidate]) {
            let token = strip_bearer(s);
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    authorization_header
        .map(strip_bearer)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}

fn strip_bearer(raw: &str) -> &str {
    raw.trim().strip_prefix("Bearer ").unwrap_or(raw.trim())
}

/// Decode the claims object from a token's middle segment.
///
/// Unsigned-structure read: base64url (unpadded) JSON. Any decoding
/// failure yields `None`, never an error.
#[must_use]
pub fn decode_claims(token: &str) -> Option<Value> {
    let segment = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.is_object().then_some(claims)
}

/// Normalize a roles value of any observed shape into a string list.
///
/// Native lists pass through; a string that looks like a JSON array
/// literal is parsed as one (parse failure yields an empty set); anything
/// else is split on commas, a lone value becoming a single role.
#[must_use]
pub fn parse_roles(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(ToString::to_string)
            .collect(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else if trimmed.starts_with('[') {
                serde_json::from_str(trimmed).unwrap_or_default()
            } else {
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(ToString::to_string)
                    .collect()
            }
        }
        _ => Vec::new(),
    }
}

/// Extract a [`SessionIdentity`] from a login response.
///
/// Body fields take precedence; when the body carries no user id or roles
/// and a token was found, its decoded claims supply the fallback values.
#[must_use]
pub fn extract_identity(body: &Value, authorization_header: Option<&str>) -> SessionIdentity {
    let token = extract_token(body, authorization_header);
    let claims = token.as_deref().and_then(decode_claims);

    let user_id = resolve_id(Some(body), USER_ID_CANDIDATES)
        .or_else(|| resolve_id(claims.as_ref(), &["id", "userId", "usuarioId"]))
        .map(UserId::new);

    let mut roles = parse_roles(resolve(Some(body), ROLES_CANDIDATES));
    if roles.is_empty() {
        roles = parse_roles(resolve(claims.as_ref(), &["roles"]));
    }

    let token_expiry = resolve(claims.as_ref(), &["exp"]).and_then(value_to_i64);

    SessionIdentity {
        user_id,
        username: non_empty(resolve_string(Some(body), USERNAME_CANDIDATES)),
        email: non_empty(resolve_string(Some(body), EMAIL_CANDIDATES))
            .or_else(|| non_empty(resolve_string(claims.as_ref(), EMAIL_CANDIDATES))),
        roles,
        token_expiry,
    }
}

/// Whether a token's `exp` claim has passed.
///
/// Fails open: a token with no decodable `exp` is treated as NOT expired
/// (stale but present tokens stay usable rather than forcing spurious
/// logouts).
#[must_use]
pub fn is_session_expired(token: &str) -> bool {
    decode_claims(token)
        .as_ref()
        .and_then(|claims| resolve(Some(claims), &["exp"]))
        .and_then(value_to_i64)
        .is_some_and(|exp| exp < chrono::Utc::now().timestamp())
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

// =============================================================================
// SessionContext
// =============================================================================

/// The owned session state, hydrated from and persisted to the durable
/// key-value store.
///
/// Constructed once at app start and injected into whatever needs it; the
/// store itself is the source of truth (another process or tab may share
/// it), so reads go through rather than caching. The token is handed out
/// wrapped in [`SecretString`] so call sites don't log it.
pub struct SessionContext<S: KeyValueStore> {
    store: S,
    events: EventBus,
}

impl<S: KeyValueStore> SessionContext<S> {
    /// Wrap a durable store.
    pub const fn new(store: S, events: EventBus) -> Self {
        Self { store, events }
    }

    /// The persisted bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.store
            .get(keys::TOKEN)
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    }

    /// Whether a token is present. Presence, not validity.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    /// Whether the persisted token has a passed `exp` claim.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.token()
            .is_some_and(|t| is_session_expired(t.expose_secret()))
    }

    /// The current identity as hydrated from the store.
    #[must_use]
    pub fn identity(&self) -> SessionIdentity {
        let token_expiry = self.token().and_then(|t| {
            decode_claims(t.expose_secret())
                .as_ref()
                .and_then(|claims| resolve(Some(claims), &["exp"]))
                .and_then(value_to_i64)
        });

        SessionIdentity {
            user_id: self
                .store
                .get(keys::USER_ID)
                .and_then(|v| v.parse::<i64>().ok())
                .map(UserId::new),
            username: self.store.get(keys::USERNAME).filter(|v| !v.is_empty()),
            email: self.store.get(keys::EMAIL).filter(|v| !v.is_empty()),
            roles: self
                .store
                .get(keys::ROLES)
                .map(|raw| parse_roles(Some(&Value::String(raw))))
                .unwrap_or_default(),
            token_expiry,
        }
    }

    /// Normalized role list, regardless of how it was stored.
    #[must_use]
    pub fn get_roles(&self) -> Vec<String> {
        self.identity().roles
    }

    /// Persist the outcome of a successful login and announce the change.
    ///
    /// Stale credentials are replaced wholesale; fields the response did
    /// not supply are removed rather than left over from a previous user.
    pub fn apply_login(
        &self,
        body: &Value,
        authorization_header: Option<&str>,
    ) -> SessionIdentity {
        let token = extract_token(body, authorization_header);
        let identity = extract_identity(body, authorization_header);

        self.put_or_remove(keys::TOKEN, token);
        self.put_or_remove(keys::USER_ID, identity.user_id.map(|id| id.to_string()));
        self.put_or_remove(keys::USERNAME, identity.username.clone());
        self.put_or_remove(keys::EMAIL, identity.email.clone());
        if identity.roles.is_empty() {
            self.store.remove(keys::ROLES);
        } else if let Ok(raw) = serde_json::to_string(&identity.roles) {
            self.store.set(keys::ROLES, &raw);
        }

        debug!(user_id = ?identity.user_id, "session identity persisted");
        self.events.emit(EngineEvent::AuthChanged);
        identity
    }

    /// Clear all session state unconditionally and announce the change.
    pub fn clear(&self) {
        self.store.remove(keys::TOKEN);
        self.store.remove(keys::USER_ID);
        self.store.remove(keys::USERNAME);
        self.store.remove(keys::EMAIL);
        self.store.remove(keys::ROLES);
        self.events.emit(EngineEvent::AuthChanged);
    }

    /// Catalog page-size preference, when one was saved.
    #[must_use]
    pub fn page_size(&self) -> Option<u32> {
        self.store
            .get(keys::PAGE_SIZE)
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&n| n > 0)
    }

    /// Persist the catalog page-size preference.
    pub fn set_page_size(&self, size: u32) {
        self.store.set(keys::PAGE_SIZE, &size.max(1).to_string());
    }

    fn put_or_remove(&self, key: &str, value: Option<String>) {
        match value {
            Some(v) if !v.is_empty() => self.store.set(key, &v),
            _ => self.store.remove(key),
        }
    }
}
