//! Session management service (MongoDB)

use chrono::{DateTime, Duration, Utc};
use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use busline::db::{collections, MongoDb};
use busline::error::{ApiError, ApiResult};

/// Session document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub session_id: String,
    pub username: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
}

/// Session service for cookie authentication (MongoDB)
///
/// Sessions live in the `sessions` collection keyed by an opaque uuid; a
/// TTL index on `expires_at` reaps stale documents on the store's side.
pub struct SessionService {
    db: MongoDb,
    ttl_days: i64,
}

impl SessionService {
    pub fn new(db: MongoDb, ttl_days: i64) -> Self {
        Self { db, ttl_days }
    }

    fn sessions(&self) -> mongodb::Collection<SessionDoc> {
        self.db.collection(collections::SESSIONS)
    }

    /// Create a session bound to a username; returns the opaque session id
    pub async fn create_session(&self, username: &str) -> ApiResult<String> {
        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let session = SessionDoc {
            id: None,
            session_id: session_id.clone(),
            username: username.to_string(),
            created_at: now,
            expires_at: now + Duration::days(self.ttl_days),
        };

        self.sessions().insert_one(&session, None).await.map_err(|e| {
            tracing::error!("create_session insert failed: {}", e);
            ApiError::from(e)
        })?;

        Ok(session_id)
    }

    /// Resolve a session id to the username it is bound to. Returns
    /// `Ok(None)` for an unknown or expired session; expired sessions are
    /// deleted on sight.
    pub async fn validate_session(&self, session_id: &str) -> ApiResult<Option<String>> {
        let session = self
            .sessions()
            .find_one(doc! { "session_id": session_id }, None)
            .await
            .map_err(|e| {
                tracing::error!("validate_session lookup failed: {}", e);
                ApiError::from(e)
            })?;

        match session {
            Some(doc) if Utc::now() > doc.expires_at => {
                self.delete_session(session_id).await?;
                Ok(None)
            }
            Some(doc) => Ok(Some(doc.username)),
            None => Ok(None),
        }
    }

    /// Delete a session (logout)
    pub async fn delete_session(&self, session_id: &str) -> ApiResult<()> {
        self.sessions()
            .delete_one(doc! { "session_id": session_id }, None)
            .await
            .map_err(|e| {
                tracing::error!("delete_session failed: {}", e);
                ApiError::from(e)
            })?;
        Ok(())
    }
}
