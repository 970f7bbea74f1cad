pub mod cluster;
pub mod features;
pub mod poi;
pub mod proximity;
pub mod query;
pub mod site;

pub use cluster::{ClusterBoundingBox, ClusterLabel, RegionBounds};
pub use features::{PoiFeatures, SiteFeatureRow};
pub use poi::{GeometryType, PoiCategory, PoiCenter, PoiKey, PoiRecord, RawPoi};
pub use proximity::ProximityEdge;
pub use query::{PoiQuery, QueryTarget};
pub use site::{RawSiteRow, Site};
