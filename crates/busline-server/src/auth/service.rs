//! Authentication service: user registration and credential checks (MongoDB)

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use busline::db::{collections, is_duplicate_key, MongoDb};
use busline::error::{ApiError, ApiResult};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub password_hash: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Authentication service (MongoDB)
pub struct AuthService {
    db: MongoDb,
}

impl AuthService {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    fn users(&self) -> mongodb::Collection<User> {
        self.db.collection(collections::USERS)
    }

    /// Register a new user. The password is stored only as a salted argon2
    /// hash, never in plaintext.
    pub async fn register(&self, username: &str, password: &str) -> ApiResult<()> {
        let existing = self
            .users()
            .find_one(doc! { "username": username }, None)
            .await
            .map_err(|e| {
                tracing::error!("register lookup failed: {}", e);
                ApiError::from(e)
            })?;
        if existing.is_some() {
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }

        let user = User {
            id: None,
            username: username.to_string(),
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };

        self.users().insert_one(&user, None).await.map_err(|e| {
            // Two registrations can race past the existence check; the
            // unique index turns the loser into the same conflict answer.
            if is_duplicate_key(&e) {
                ApiError::Conflict("Username already exists".to_string())
            } else {
                tracing::error!("register insert failed: {}", e);
                ApiError::from(e)
            }
        })?;

        Ok(())
    }

    /// Verify credentials and return the matching user.
    ///
    /// An unknown username and a wrong password produce the same error so
    /// the response does not reveal which check failed.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<User> {
        let user = self
            .users()
            .find_one(doc! { "username": username }, None)
            .await
            .map_err(|e| {
                tracing::error!("login lookup failed: {}", e);
                ApiError::from(e)
            })?
            .ok_or(ApiError::Auth)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(ApiError::Auth);
        }

        Ok(user)
    }
}

/// Hash a password with a fresh salt
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash via the library verifier, never
/// by comparing hash strings
pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| ApiError::Internal(format!("Invalid hash format: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
