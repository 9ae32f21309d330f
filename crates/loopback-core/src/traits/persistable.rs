//! CRUD lifecycle of a single server-backed record.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::ModelId;

/// A local instance that mirrors one server record.
///
/// An instance without an id is unsaved. The first successful
/// [`save`](Persistable::save) assigns the id the server minted; it does not
/// change afterwards. Both operations take `&mut self`, so one instance
/// cannot have two mutating calls in flight.
#[async_trait]
pub trait Persistable: Send {
    /// Server-assigned id, absent until the first successful save.
    fn id(&self) -> Option<&ModelId>;

    /// Create the record (no id yet) or update it (keyed by id).
    async fn save(&mut self) -> AppResult<()>;

    /// Delete the record keyed by its id.
    ///
    /// Fails without contacting the server when the instance has no id.
    async fn destroy(&mut self) -> AppResult<()>;
}
