//! Catalog reads: cities and routes
//!
//! Both collections are schemaless pass-through: whatever documents the
//! store holds are returned verbatim, with no pagination, sorting, or
//! filtering.

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};

use crate::db::{collections, MongoDb};
use crate::error::{ApiError, ApiResult};

/// Read service for the city and route collections (MongoDB)
pub struct CatalogService {
    db: MongoDb,
}

impl CatalogService {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    /// Return every document in the cities collection, unmodified
    pub async fn list_cities(&self) -> ApiResult<Vec<Document>> {
        self.list_all(collections::CITIES).await.map_err(|e| {
            tracing::error!("list_cities query failed: {}", e);
            ApiError::from(e)
        })
    }

    /// Return every document in the routes collection, unmodified
    pub async fn list_routes(&self) -> ApiResult<Vec<Document>> {
        self.list_all(collections::ROUTES).await.map_err(|e| {
            tracing::error!("list_routes query failed: {}", e);
            ApiError::from(e)
        })
    }

    /// Materialize a full collection with an unconditional (empty) filter
    async fn list_all(&self, name: &str) -> mongodb::error::Result<Vec<Document>> {
        let cursor = self
            .db
            .collection::<Document>(name)
            .find(doc! {}, None)
            .await?;
        cursor.try_collect().await
    }
}
