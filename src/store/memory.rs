use async_trait::async_trait;
use itertools::Itertools;
use tokio::sync::RwLock;

use super::{RouteFilter, StopFilter, StoreError, TransitStore};
use crate::model::{Route, Stop, Stored};

/// Keeps both collections in process. Used by tests and `--store memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    stops: RwLock<Vec<Stored<Stop>>>,
    routes: RwLock<Vec<Stored<Route>>>,
}

#[async_trait]
impl TransitStore for MemoryStore {
    async fn find_stops(&self, filter: &StopFilter) -> Result<Vec<Stored<Stop>>, StoreError> {
        let stops = self.stops.read().await;

        Ok(stops.iter().filter(|s| filter.matches(s)).cloned().collect_vec())
    }

    async fn insert_stop(&self, stop: Stop) -> Result<Stored<Stop>, StoreError> {
        let stop = Stored::new(stop);
        self.stops.write().await.push(stop.clone());

        Ok(stop)
    }

    async fn find_routes(&self, filter: &RouteFilter) -> Result<Vec<Stored<Route>>, StoreError> {
        let routes = self.routes.read().await;

        Ok(routes.iter().filter(|r| filter.matches(r)).cloned().collect_vec())
    }

    async fn insert_route(&self, route: Route) -> Result<Stored<Route>, StoreError> {
        let route = Stored::new(route);
        self.routes.write().await.push(route.clone());

        Ok(route)
    }
}
