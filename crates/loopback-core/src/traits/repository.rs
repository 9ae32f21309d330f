//! Generic lookup trait shared by the model repositories.

use async_trait::async_trait;

use crate::result::AppResult;

/// Keyed lookup over a remote collection.
///
/// Implemented by every repository so code that only needs to read records
/// can stay generic over the model type. Creation and mutation stay on the
/// concrete repositories and instances because their inputs differ per type.
#[async_trait]
pub trait Repository<Entity, Key>: Send + Sync
where
    Entity: Send + 'static,
    Key: Send + Sync + ?Sized,
{
    /// Fetch exactly one entity by key. A missing entity is a `NotFound` error.
    async fn find_by_id(&self, key: &Key) -> AppResult<Entity>;

    /// Fetch every entity, in the order the server returned them.
    async fn all(&self) -> AppResult<Vec<Entity>>;
}
