use itertools::Itertools;
use serde_json::json;
use sqlx::{Pool, Postgres, QueryBuilder, query, types::Json};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::{
    model::{Route, Stored},
    store::RouteFilter,
};

#[tracing::instrument(err, skip(pool, route), fields(route_number = route.route_number))]
pub async fn insert_route(
    route: Route,
    pool: &Pool<Postgres>,
) -> Result<Stored<Route>, sqlx::Error> {
    let route = Stored::new(route);

    query("INSERT INTO bus_routes (id, doc) VALUES ($1, $2)")
        .bind(route.id)
        .bind(Json(&route.document))
        .execute(pool)
        .instrument(info_span!("Inserting route", stops = route.stops.len()))
        .await?;

    Ok(route)
}

#[tracing::instrument(err, skip(pool))]
pub async fn find_routes(
    filter: &RouteFilter,
    pool: &Pool<Postgres>,
) -> Result<Vec<Stored<Route>>, sqlx::Error> {
    let mut query_builder = find_routes_query(filter);

    let rows: Vec<(Uuid, Json<Route>)> = query_builder
        .build_query_as()
        .fetch_all(pool)
        .instrument(info_span!("Selecting routes"))
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, Json(document))| Stored { id, document })
        .collect_vec())
}

fn find_routes_query(filter: &RouteFilter) -> QueryBuilder<'static, Postgres> {
    let mut query_builder = QueryBuilder::new("SELECT id, doc FROM bus_routes");
    let mut conditions = 0;

    if let Some(route_number) = filter.route_number {
        query_builder
            .push(" WHERE (doc->>'routeNumber')::bigint = ")
            .push_bind(route_number);
        conditions += 1;
    }

    if let Some(stop_id) = &filter.stop_id {
        // containment hits the GIN index on doc->'stops'
        query_builder
            .push(if conditions == 0 { " WHERE " } else { " AND " })
            .push("doc->'stops' @> ")
            .push_bind(Json(json!([{ "stop_id": stop_id }])));
    }

    query_builder.push(" ORDER BY seq");
    query_builder
}
