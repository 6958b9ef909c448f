use itertools::Itertools;
use sqlx::{Pool, Postgres, QueryBuilder, query, types::Json};
use tracing::{Instrument, info_span};

use crate::{
    model::{Stop, Stored},
    store::StopFilter,
};

#[tracing::instrument(err, skip(pool, stop), fields(stop_id = %stop.stop_id))]
pub async fn insert_stop(stop: Stop, pool: &Pool<Postgres>) -> Result<Stored<Stop>, sqlx::Error> {
    let stop = Stored::new(stop);

    query("INSERT INTO bus_stops (id, doc) VALUES ($1, $2)")
        .bind(stop.id)
        .bind(Json(&stop.document))
        .execute(pool)
        .await?;

    Ok(stop)
}

#[tracing::instrument(err, skip(pool))]
pub async fn find_stops(
    filter: &StopFilter,
    pool: &Pool<Postgres>,
) -> Result<Vec<Stored<Stop>>, sqlx::Error> {
    let mut query_builder = find_stops_query(filter);

    let rows: Vec<(uuid::Uuid, Json<Stop>)> = query_builder
        .build_query_as()
        .fetch_all(pool)
        .instrument(info_span!("Selecting stops"))
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, Json(document))| Stored { id, document })
        .collect_vec())
}

fn find_stops_query(filter: &StopFilter) -> QueryBuilder<'static, Postgres> {
    let mut query_builder = QueryBuilder::new("SELECT id, doc FROM bus_stops");

    if let Some(stop_id) = &filter.stop_id {
        query_builder
            .push(" WHERE doc->>'stop_id' = ")
            .push_bind(stop_id.clone());
    }

    query_builder.push(" ORDER BY seq");
    query_builder
}
