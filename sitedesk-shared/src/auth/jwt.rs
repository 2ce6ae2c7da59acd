/// JWT validation at the identity boundary
///
/// SiteDesk consumes bearer tokens minted by the external identity provider
/// and validates them into the `{user_id, global_role, company_id}` triple.
/// Tokens are HS256 (HMAC-SHA256) with issuer and expiration checks.
///
/// `create_token` exists for the test harness and operational tooling; the
/// production mint lives with the identity provider.
///
/// # Example
///
/// ```
/// use sitedesk_shared::auth::jwt::{create_token, validate_token, Claims};
/// use sitedesk_shared::models::user::GlobalRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(Uuid::new_v4(), GlobalRole::Member, Some(Uuid::new_v4()));
/// let token = create_token(&claims, "a-secret-of-at-least-32-characters!!")?;
///
/// let validated = validate_token(&token, "a-secret-of-at-least-32-characters!!")?;
/// assert_eq!(validated.sub, claims.sub);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::GlobalRole;

/// Issuer expected on every token
pub const ISSUER: &str = "sitedesk";

/// Token lifetime
const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "sitedesk")
/// - `iat` / `exp` / `nbf`: Timestamps
///
/// # Custom Claims
///
/// - `role`: The user's company-wide role
/// - `company_id`: Company affiliation; absent for guests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user ID
    pub sub: Uuid,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Company-wide role
    pub role: GlobalRole,

    /// Company affiliation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
}

impl Claims {
    /// Creates new claims with the default lifetime
    pub fn new(user_id: Uuid, role: GlobalRole, company_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(TOKEN_LIFETIME_HOURS);

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            role,
            company_id,
        }
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns [`JwtError::CreateError`] if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Validates a token and returns its claims
///
/// Checks the signature, expiration, not-before, and issuer.
///
/// # Errors
///
/// - [`JwtError::Expired`] for expired tokens
/// - [`JwtError::InvalidIssuer`] for tokens from another issuer
/// - [`JwtError::ValidationError`] for everything else
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_nbf = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(e.to_string()),
    })?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-test-secret-test-secret!";

    #[test]
    fn test_round_trip() {
        let user_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();
        let claims = Claims::new(user_id, GlobalRole::Admin, Some(company_id));

        let token = create_token(&claims, SECRET).unwrap();
        let validated = validate_token(&token, SECRET).unwrap();

        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.role, GlobalRole::Admin);
        assert_eq!(validated.company_id, Some(company_id));
        assert_eq!(validated.iss, ISSUER);
    }

    #[test]
    fn test_companyless_claims() {
        let claims = Claims::new(Uuid::new_v4(), GlobalRole::Guest, None);
        let token = create_token(&claims, SECRET).unwrap();
        let validated = validate_token(&token, SECRET).unwrap();
        assert_eq!(validated.company_id, None);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims::new(Uuid::new_v4(), GlobalRole::Member, None);
        let token = create_token(&claims, SECRET).unwrap();
        assert!(validate_token(&token, "another-secret-another-secret-!!").is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), GlobalRole::Member, None);
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_expired_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), GlobalRole::Member, None);
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(validate_token("not.a.token", SECRET).is_err());
    }
}
