// src/session.rs
//! Session state derived from the persisted token pair. The access token is
//! decoded without signature verification (the backend is the verifier);
//! the client only checks expiry and reads the identity claims.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::{validate_required, ApiError, ApiResult};
use crate::models::Role;

// ==================== TOKEN STORAGE ====================

/// Access/refresh pair as issued by POST /token/.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// On-disk key names kept compatible with the browser client's storage.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

/// Durable storage for the token pair: one JSON file with fixed keys,
/// cleared on logout or on a failed restore. `in_memory` keeps no file and
/// exists for tests.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<Mutex<StoreInner>>,
}

struct StoreInner {
    path: Option<PathBuf>,
    tokens: Option<TokenPair>,
}

impl TokenStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tokens = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<StoredTokens>(&raw).ok())
            .map(|stored| TokenPair {
                access: stored.access_token,
                refresh: stored.refresh_token,
            });
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                path: Some(path),
                tokens,
            })),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                path: None,
                tokens: None,
            })),
        }
    }

    pub fn save(&self, pair: TokenPair) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(ref path) = inner.path {
            let stored = StoredTokens {
                access_token: pair.access.clone(),
                refresh_token: pair.refresh.clone(),
            };
            match serde_json::to_string_pretty(&stored) {
                Ok(raw) => {
                    if let Err(err) = fs::write(path, raw) {
                        log::warn!("Failed to persist session tokens: {}", err);
                    }
                }
                Err(err) => log::warn!("Failed to serialize session tokens: {}", err),
            }
        }
        inner.tokens = Some(pair);
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(ref path) = inner.path {
            if path.exists() {
                if let Err(err) = fs::remove_file(path) {
                    log::warn!("Failed to remove session token file: {}", err);
                }
            }
        }
        inner.tokens = None;
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.lock().unwrap().tokens.as_ref().map(|t| t.access.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner.lock().unwrap().tokens.as_ref().map(|t| t.refresh.clone())
    }
}

// ==================== CLAIMS ====================

/// Claims the backend bakes into the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub exp: i64,
}

/// Decode without verifying the signature: issuing and verifying tokens is
/// the backend's job, the client only needs the payload.
pub fn decode_claims(token: &str) -> ApiResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|err| ApiError::DecodeError(format!("Invalid token: {}", err)))
}

// ==================== SESSION ====================

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
            role: claims.role,
        }
    }
}

pub struct Session {
    store: TokenStore,
    identity: Option<Identity>,
}

impl Session {
    pub fn new(store: TokenStore) -> Self {
        Self {
            store,
            identity: None,
        }
    }

    /// Rebuild the identity from the persisted access token. An absent,
    /// undecodable or expired token clears the store and yields no session.
    pub fn restore(&mut self) -> Option<&Identity> {
        self.identity = None;
        let token = self.store.access_token()?;
        match decode_claims(&token) {
            Ok(claims) if claims.exp > Utc::now().timestamp() => {
                self.identity = Some(claims.into());
            }
            Ok(_) => {
                log::info!("Stored session expired, clearing");
                self.store.clear();
            }
            Err(err) => {
                log::warn!("Stored token unreadable ({}), clearing", err);
                self.store.clear();
            }
        }
        self.identity.as_ref()
    }

    /// Delegate to the backend; on success persist both tokens and decode
    /// the identity. Failures leave no partial state behind.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        username: &str,
        password: &str,
    ) -> ApiResult<Identity> {
        validate_required("Username", username)?;
        validate_required("Password", password)?;

        let pair = api.login(username, password).await?;
        let claims = match decode_claims(&pair.access) {
            Ok(claims) => claims,
            Err(err) => {
                self.store.clear();
                return Err(err);
            }
        };
        self.store.save(pair);
        let identity: Identity = claims.into();
        log::info!("Logged in as '{}' ({})", identity.username, identity.role);
        self.identity = Some(identity.clone());
        Ok(identity)
    }

    pub fn logout(&mut self) {
        self.store.clear();
        self.identity = None;
        log::info!("Logged out, session cleared");
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

// ==================== ROUTING ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Dashboard,
    Scanner,
    History,
    Reports,
    Users,
    Print,
}

impl Page {
    pub fn accessible_to(&self, role: Role) -> bool {
        match role {
            Role::Administrator => matches!(
                self,
                Page::Dashboard | Page::History | Page::Reports | Page::Users | Page::Print
            ),
            Role::Operator => matches!(self, Page::Scanner),
        }
    }
}

pub fn home_page(role: Role) -> Page {
    match role {
        Role::Administrator => Page::Dashboard,
        Role::Operator => Page::Scanner,
    }
}

/// Route resolution: unauthenticated goes to login, a role-inappropriate
/// page redirects to that role's home page.
pub fn resolve_page(identity: Option<&Identity>, requested: Page) -> Page {
    match identity {
        None => Page::Login,
        Some(identity) => {
            if requested.accessible_to(identity.role) {
                requested
            } else {
                home_page(identity.role)
            }
        }
    }
}

// ==================== TESTS ====================

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_with(role: &str, exp: i64) -> String {
        let claims = serde_json::json!({
            "token_type": "access",
            "user_id": 1,
            "username": "olena",
            "role": role,
            "exp": exp,
            "jti": "abc123",
        });
        // Signed with a key the client does not know - decoding must not care
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-only")).unwrap()
    }

    #[test]
    fn test_decode_claims_ignores_signature() {
        let token = token_with("ADMINISTRATOR", Utc::now().timestamp() + 3600);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.username, "olena");
        assert_eq!(claims.role, Role::Administrator);
    }

    #[test]
    fn test_decode_claims_rejects_garbage() {
        assert!(decode_claims("not-a-token").is_err());
    }

    #[test]
    fn test_restore_with_valid_token() {
        let store = TokenStore::in_memory();
        store.save(TokenPair {
            access: token_with("OPERATOR", Utc::now().timestamp() + 3600),
            refresh: "r".to_string(),
        });
        let mut session = Session::new(store);
        let identity = session.restore().cloned().unwrap();
        assert_eq!(identity.role, Role::Operator);
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_restore_clears_expired_token() {
        let store = TokenStore::in_memory();
        store.save(TokenPair {
            access: token_with("OPERATOR", Utc::now().timestamp() - 10),
            refresh: "r".to_string(),
        });
        let mut session = Session::new(store.clone());
        assert!(session.restore().is_none());
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_restore_clears_undecodable_token() {
        let store = TokenStore::in_memory();
        store.save(TokenPair {
            access: "garbage".to_string(),
            refresh: "r".to_string(),
        });
        let mut session = Session::new(store.clone());
        assert!(session.restore().is_none());
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_token_store_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = TokenStore::open(&path);
        assert!(store.access_token().is_none());
        store.save(TokenPair {
            access: "a1".to_string(),
            refresh: "r1".to_string(),
        });

        // A fresh store over the same file sees the persisted pair
        let reopened = TokenStore::open(&path);
        assert_eq!(reopened.access_token().as_deref(), Some("a1"));
        assert_eq!(reopened.refresh_token().as_deref(), Some("r1"));

        reopened.clear();
        assert!(!path.exists());
        assert!(TokenStore::open(&path).access_token().is_none());
    }

    #[test]
    fn test_token_file_uses_fixed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = TokenStore::open(&path);
        store.save(TokenPair {
            access: "a1".to_string(),
            refresh: "r1".to_string(),
        });
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("accessToken"));
        assert!(raw.contains("refreshToken"));
    }

    #[test]
    fn test_logout_clears_everything() {
        let store = TokenStore::in_memory();
        store.save(TokenPair {
            access: token_with("OPERATOR", Utc::now().timestamp() + 3600),
            refresh: "r".to_string(),
        });
        let mut session = Session::new(store.clone());
        session.restore();
        session.logout();
        assert!(!session.is_authenticated());
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_route_gating() {
        let admin = Identity {
            id: 1,
            username: "admin".to_string(),
            role: Role::Administrator,
        };
        let operator = Identity {
            id: 2,
            username: "op".to_string(),
            role: Role::Operator,
        };

        assert_eq!(resolve_page(None, Page::Dashboard), Page::Login);
        assert_eq!(resolve_page(Some(&admin), Page::Reports), Page::Reports);
        assert_eq!(resolve_page(Some(&admin), Page::Scanner), Page::Dashboard);
        assert_eq!(resolve_page(Some(&operator), Page::Scanner), Page::Scanner);
        assert_eq!(resolve_page(Some(&operator), Page::Users), Page::Scanner);
        assert_eq!(home_page(Role::Administrator), Page::Dashboard);
        assert_eq!(home_page(Role::Operator), Page::Scanner);
    }
}
