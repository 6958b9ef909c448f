//! PostgreSQL implementation of the store. Every collection is a table of JSONB documents.
pub mod routes;
pub mod stops;

use anyhow::Error;
use async_trait::async_trait;
use sqlx::{PgPool, Pool, Postgres};
use tracing::{error, info};

use crate::{
    model::{Route, Stop, Stored},
    store::{RouteFilter, StopFilter, StoreError, TransitStore},
};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    /// Connects and applies migrations. A failure is logged and the store falls back to a pool
    /// that connects on first use, so the server still comes up and requests fail individually.
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        let store = match PgPool::connect(database_url).await {
            Ok(pool) => {
                info!("Connected to PostgreSQL");
                PgStore { pool }
            }
            Err(e) => {
                error!("PostgreSQL connection error: {e}");
                return Ok(PgStore {
                    pool: PgPool::connect_lazy(database_url)?,
                });
            }
        };

        if let Err(e) = store.migrate().await {
            error!("Error running migrations: {e}");
        }

        Ok(store)
    }

    #[tracing::instrument(err, skip(self))]
    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TransitStore for PgStore {
    async fn find_stops(&self, filter: &StopFilter) -> Result<Vec<Stored<Stop>>, StoreError> {
        Ok(stops::find_stops(filter, &self.pool).await?)
    }

    async fn insert_stop(&self, stop: Stop) -> Result<Stored<Stop>, StoreError> {
        Ok(stops::insert_stop(stop, &self.pool).await?)
    }

    async fn find_routes(&self, filter: &RouteFilter) -> Result<Vec<Stored<Route>>, StoreError> {
        Ok(routes::find_routes(filter, &self.pool).await?)
    }

    async fn insert_route(&self, route: Route) -> Result<Stored<Route>, StoreError> {
        Ok(routes::insert_route(route, &self.pool).await?)
    }
}
