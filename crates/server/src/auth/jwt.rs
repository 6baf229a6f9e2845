// JWT token service for authentication
// Decision: Use HS256 algorithm for simplicity (symmetric key)
// Decision: Tokens are stateless; logout only clears the client cookie
// Decision: Claims are trusted as-is after signature and expiry checks, no user lookup

use chrono::Utc;
use funpage_core::{Identity, Role};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// JWT claims carried by every session token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub id: String,
    /// Account username
    pub username: String,
    /// Account role
    #[serde(rename = "userType")]
    pub user_type: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity::new(claims.id, claims.username, claims.user_type)
    }
}

/// Token issue/verify failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is empty")]
    EmptyToken,
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// JWT service for token generation and validation
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    has_secret: bool,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key,
            decoding_key,
            validation,
            has_secret: !secret.is_empty(),
        }
    }

    /// Issue a signed token for the given subject, valid for `ttl`
    pub fn issue(
        &self,
        subject_id: &str,
        username: &str,
        role: Role,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| TokenError::Signing(format!("invalid token lifetime: {}", e)))?;
        let exp = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Signing("token lifetime out of range".to_string()))?;

        let claims = Claims {
            id: subject_id.to_string(),
            username: username.to_string(),
            user_type: role,
            exp: exp.timestamp(),
        };

        self.sign(&claims)
    }

    /// Verify a token and return the identity it carries
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::EmptyToken);
        }
        if !self.has_secret {
            return Err(TokenError::InvalidSignature);
        }

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Malformed,
                }
            })?;

        // A token whose expiry second has been reached is already dead.
        if token_data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims.into())
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        if !self.has_secret {
            return Err(TokenError::Signing(
                "signing secret is not configured".to_string(),
            ));
        }

        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-testing";

    fn service() -> TokenService {
        TokenService::new(SECRET)
    }

    fn payload_of(token: &str) -> &str {
        token.split('.').nth(1).unwrap()
    }

    fn replace_payload(token: &str, payload: &str) -> String {
        let parts: Vec<&str> = token.split('.').collect();
        format!("{}.{}.{}", parts[0], payload, parts[2])
    }

    #[test]
    fn test_issue_and_verify() {
        let service = service();
        let token = service
            .issue("42", "alice", Role::User, Duration::from_secs(900))
            .unwrap();

        assert!(!token.is_empty());
        assert_eq!(token.split('.').count(), 3);

        let identity = service.verify(&token).unwrap();
        assert_eq!(identity, Identity::new("42", "alice", Role::User));
    }

    #[test]
    fn test_admin_role_survives_round_trip() {
        let service = service();
        let token = service
            .issue("7", "root", Role::Admin, Duration::from_secs(60))
            .unwrap();
        assert_eq!(service.verify(&token).unwrap().role, Role::Admin);
    }

    #[test]
    fn test_empty_token() {
        let service = service();
        assert_eq!(service.verify(""), Err(TokenError::EmptyToken));
        assert_eq!(service.verify("   "), Err(TokenError::EmptyToken));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let service = service();
        let alice = service
            .issue("1", "alice", Role::User, Duration::from_secs(900))
            .unwrap();
        let bob = service
            .issue("2", "bob", Role::User, Duration::from_secs(900))
            .unwrap();

        let forged = replace_payload(&alice, payload_of(&bob));
        assert_eq!(service.verify(&forged), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new("some-other-secret")
            .issue("1", "alice", Role::User, Duration::from_secs(900))
            .unwrap();
        assert_eq!(service().verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_expired_token() {
        let service = service();
        let claims = Claims {
            id: "1".to_string(),
            username: "alice".to_string(),
            user_type: Role::User,
            exp: Utc::now().timestamp() - 10,
        };
        let token = service.sign(&claims).unwrap();
        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let service = service();
        let token = service
            .issue("1", "alice", Role::User, Duration::ZERO)
            .unwrap();
        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let service = service();
        assert_eq!(service.verify("invalid-token"), Err(TokenError::Malformed));
        assert_eq!(service.verify("a.b.c"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_unknown_role_is_malformed() {
        #[derive(Serialize)]
        struct RawClaims<'a> {
            id: &'a str,
            username: &'a str,
            #[serde(rename = "userType")]
            user_type: &'a str,
            exp: i64,
        }

        let raw = RawClaims {
            id: "1",
            username: "mallory",
            user_type: "superuser",
            exp: Utc::now().timestamp() + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &raw,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_missing_secret_cannot_sign() {
        let service = TokenService::new("");
        let result = service.issue("1", "alice", Role::User, Duration::from_secs(60));
        assert!(matches!(result, Err(TokenError::Signing(_))));
    }

    #[test]
    fn test_claims_wire_shape() {
        let claims = Claims {
            id: "1".to_string(),
            username: "alice".to_string(),
            user_type: Role::User,
            exp: 1_700_000_000,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "1",
                "username": "alice",
                "userType": "user",
                "exp": 1_700_000_000
            })
        );
    }
}
