use crate::model::{Id, user::UserMarker};
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use thiserror::Error;
use time::{Duration, UtcDateTime};

/// Issued bearer tokens stop validating this long after issuance.
pub const TOKEN_VALIDITY: Duration = Duration::hours(1);

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Password hashing failed: {0}")]
pub struct PasswordHashError(argon2::password_hash::Error);

/// An argon2id password hash in PHC string form, as persisted for a user.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn hash(password: &str) -> Result<Self, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(PasswordHashError)?;

        Ok(Self(hash.to_string()))
    }

    /// Constant-time verification against a candidate password.
    pub fn verify(&self, password: &str) -> Result<bool, PasswordHashError> {
        let parsed = argon2::password_hash::PasswordHash::new(&self.0)
            .map_err(PasswordHashError)?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError(err)),
        }
    }

    #[must_use]
    pub fn from_phc_string(phc: String) -> Self {
        Self(phc)
    }

    #[must_use]
    pub fn as_phc_str(&self) -> &str {
        &self.0
    }
}

impl Debug for HashedPassword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HashedPassword").field(&"[redacted]").finish()
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Invalid auth token: {0}")]
pub struct TokenError(#[from] jsonwebtoken::errors::Error);

/// A signed bearer token as sent over the `Authorization` header.
#[derive(Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Debug for AuthToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthToken").field(&"[redacted]").finish()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Id<UserMarker>,
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn expiry(&self) -> UtcDateTime {
        UtcDateTime::from_unix_timestamp(self.exp).unwrap_or(UtcDateTime::UNIX_EPOCH)
    }
}

/// Issues and validates the HS256-signed claims used for request auth.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: Id<UserMarker>) -> Result<AuthToken, TokenError> {
        self.issue_at(user_id, UtcDateTime::now())
    }

    pub fn issue_at(
        &self,
        user_id: Id<UserMarker>,
        issued_at: UtcDateTime,
    ) -> Result<AuthToken, TokenError> {
        let claims = Claims {
            sub: user_id,
            exp: (issued_at + TOKEN_VALIDITY).unix_timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(AuthToken(token))
    }

    /// Fails on a bad signature or an elapsed expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

impl Debug for TokenSigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id,
        auth::{HashedPassword, TOKEN_VALIDITY, TokenSigner},
    };
    use time::UtcDateTime;

    #[test]
    fn password_hash_verification() {
        let hashed = HashedPassword::hash("hunter2").unwrap();

        assert!(hashed.verify("hunter2").unwrap());
        assert!(!hashed.verify("hunter3").unwrap());
        assert!(!hashed.verify("").unwrap());
    }

    #[test]
    fn password_hashes_are_salted() {
        let first = HashedPassword::hash("hunter2").unwrap();
        let second = HashedPassword::hash("hunter2").unwrap();

        assert_ne!(first.as_phc_str(), second.as_phc_str());
    }

    #[test]
    fn token_round_trip() {
        let signer = TokenSigner::new("test-secret");
        let user_id = Id::random();

        let token = signer.issue(user_id).unwrap();
        let claims = signer.decode(token.get()).unwrap();

        assert_eq!(claims.sub, user_id);
        assert!(claims.expiry() > UtcDateTime::now());
    }

    #[test]
    fn expired_token_rejected() {
        let signer = TokenSigner::new("test-secret");
        let issued_at = UtcDateTime::now() - TOKEN_VALIDITY * 2;

        let token = signer.issue_at(Id::random(), issued_at).unwrap();

        assert!(signer.decode(token.get()).is_err());
    }

    #[test]
    fn foreign_signature_rejected() {
        let signer = TokenSigner::new("test-secret");
        let other_signer = TokenSigner::new("other-secret");

        let token = signer.issue(Id::random()).unwrap();

        assert!(other_signer.decode(token.get()).is_err());
    }
}
