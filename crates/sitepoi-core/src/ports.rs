//! Port trait definitions
//!
//! Adapters for the external POI database implement these traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{PoiQuery, RawPoi};

/// Port for fetching raw POI elements from an external source
#[async_trait]
pub trait PoiSource: Send + Sync {
    /// Execute one spatial query
    ///
    /// # Returns
    /// The raw elements, or `SitePoiError::QueryFailure` describing why the
    /// query produced nothing
    async fn fetch(&self, query: &PoiQuery) -> Result<Vec<RawPoi>>;

    /// Human-readable identifier of the backing service
    fn name(&self) -> &str;
}
