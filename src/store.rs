//! The document store seam. Handlers only ever see [`SharedStore`].
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{Route, Stop, Stored};

pub type SharedStore = Arc<dyn TransitStore>;

#[async_trait]
pub trait TransitStore: Send + Sync {
    /// Matching stops in insertion order.
    async fn find_stops(&self, filter: &StopFilter) -> Result<Vec<Stored<Stop>>, StoreError>;

    async fn insert_stop(&self, stop: Stop) -> Result<Stored<Stop>, StoreError>;

    /// Matching routes in insertion order.
    async fn find_routes(&self, filter: &RouteFilter) -> Result<Vec<Stored<Route>>, StoreError>;

    async fn insert_route(&self, route: Route) -> Result<Stored<Route>, StoreError>;
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopFilter {
    pub stop_id: Option<String>,
}

impl StopFilter {
    pub fn matches(&self, stop: &Stop) -> bool {
        self.stop_id.as_ref().is_none_or(|id| *id == stop.stop_id)
    }
}

/// Both conditions must hold when both are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteFilter {
    pub route_number: Option<i64>,
    pub stop_id: Option<String>,
}

impl RouteFilter {
    pub fn matches(&self, route: &Route) -> bool {
        self.route_number.is_none_or(|n| n == route.route_number)
            && self.stop_id.as_ref().is_none_or(|id| route.serves(id))
    }
}
