//! Identity verification and user provisioning
//!
//! Bearer ID tokens are verified by an [`IdentityVerifier`]. A verified
//! identity is mapped to a `users` row, creating one on first sight.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::db::{CreateUser, Database, UserRecord};

// ============================================================================
// Verified identity
// ============================================================================

/// Identity claims extracted from a verified token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Identity providers linked to the account, keyed by provider name
    pub identities: HashMap<String, Vec<String>>,
}

impl VerifiedIdentity {
    /// `line` if linked via LINE, `email` if an email identity exists, else `unknown`
    pub fn auth_provider(&self) -> &'static str {
        if self.identities.contains_key("line.signin") {
            "line"
        } else if self.identities.contains_key("email") {
            "email"
        } else {
            "unknown"
        }
    }

    /// Account name: the token's name, else the local part of the email
    pub fn account_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .unwrap_or_default()
            .to_string()
    }
}

/// Verifies bearer tokens issued by the external identity provider
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity>;
}

// ============================================================================
// JWT verifier
// ============================================================================

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    #[serde(default)]
    firebase: Option<FirebaseClaims>,
    #[allow(dead_code)]
    exp: i64,
}

#[derive(Debug, Default, Deserialize)]
struct FirebaseClaims {
    #[serde(default)]
    identities: HashMap<String, Vec<String>>,
}

/// HS256 ID token verifier
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, issuer: Option<&str>, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret.trim().as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity> {
        let data = decode::<IdTokenClaims>(token, &self.key, &self.validation)
            .context("ID token verification failed")?;
        let claims = data.claims;

        Ok(VerifiedIdentity {
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
            identities: claims.firebase.unwrap_or_default().identities,
        })
    }
}

// ============================================================================
// Provisioning
// ============================================================================

/// Authenticate a bearer token, provisioning the user row if needed.
///
/// Returns `None` when the token does not verify; callers treat the request
/// as anonymous rather than failing it.
pub async fn authenticate(
    verifier: &dyn IdentityVerifier,
    db: &Database,
    token: &str,
) -> Result<Option<UserRecord>> {
    let identity = match verifier.verify(token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected bearer token");
            return Ok(None);
        }
    };

    tracing::debug!(uid = %identity.uid, email = ?identity.email, "ID token verified");

    let users = db.users();
    if let Some(user) = users.get_by_firebase_uid(&identity.uid).await? {
        tracing::debug!(user_id = user.id, "Existing user signed in");
        return Ok(Some(user));
    }

    let name = identity.account_name();
    let provider = identity.auth_provider();
    tracing::info!(uid = %identity.uid, provider, "Creating user");

    let user = users
        .create(CreateUser {
            firebase_uid: identity.uid.clone(),
            email: identity.email.clone().unwrap_or_default(),
            name: name.clone(),
            display_name: name,
            auth_provider: vec![provider.to_string()],
        })
        .await?;

    tracing::info!(user_id = user.id, "User created");
    Ok(Some(user))
}
