use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{BytesRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use super::error::ApiError;
use crate::{
    model::{Route, Stored, validation::parse_body},
    store::{RouteFilter, SharedStore},
};

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    #[serde(rename = "routeNumber")]
    pub route_number: Option<String>,
    #[serde(rename = "stopId")]
    pub stop_id: Option<String>,
}

impl TryFrom<RouteQuery> for RouteFilter {
    type Error = ApiError;

    /// Empty values are ignored. `routeNumber` is compared as a number, so it has to parse as one.
    fn try_from(query: RouteQuery) -> Result<Self, Self::Error> {
        let route_number = match query.route_number.filter(|n| !n.is_empty()) {
            None => None,
            Some(value) => Some(parse_route_number(&value).ok_or(ApiError::Cast {
                value,
                path: "routeNumber",
            })?),
        };

        Ok(RouteFilter {
            route_number,
            stop_id: query.stop_id.filter(|id| !id.is_empty()),
        })
    }
}

/// Accepts `12`, ` 12 ` and `12.0`.
fn parse_route_number(value: &str) -> Option<i64> {
    let value = value.trim();

    value.parse::<i64>().ok().or_else(|| {
        let f: f64 = value.parse().ok()?;
        (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
    })
}

pub async fn list_routes(
    State(store): State<SharedStore>,
    query: Result<Query<RouteQuery>, QueryRejection>,
) -> Result<Json<Vec<Stored<Route>>>, ApiError> {
    let Query(query) = query?;
    let routes = store.find_routes(&RouteFilter::try_from(query)?).await?;

    Ok(Json(routes))
}

pub async fn create_route(
    State(store): State<SharedStore>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Stored<Route>>), ApiError> {
    let value = parse_body(Route::DOCUMENT, &body?)?;
    let route = Route::from_json(&value)?;

    let created = store.insert_route(route).await?;
    info!(
        id = %created.id,
        route_number = created.route_number,
        stops = created.stops.len(),
        "created route"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::{Method, StatusCode};
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        api::test_support::*,
        model::Stop,
        store::{StopFilter, StoreError, TransitStore},
    };

    fn route(route_number: i64, stop_ids: &[&str]) -> Value {
        json!({
            "routeNumber": route_number,
            "busName": format!("Bus {route_number}"),
            "startPoint": "Start",
            "endPoint": "End",
            "arrival": "10:00",
            "departure": "10:05",
            "stops": stop_ids
                .iter()
                .map(|id| json!({ "stop_id": id, "arrival": "10:10", "departure": "10:15" }))
                .collect::<Vec<_>>()
        })
    }

    #[test]
    fn test_parse_route_number() {
        assert_eq!(parse_route_number("12"), Some(12));
        assert_eq!(parse_route_number(" 12 "), Some(12));
        assert_eq!(parse_route_number("12.0"), Some(12));
        assert_eq!(parse_route_number("-3"), Some(-3));
        assert_eq!(parse_route_number("12.5"), None);
        assert_eq!(parse_route_number("abc"), None);
        assert_eq!(parse_route_number("NaN"), None);
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_array() {
        let router = memory_router();
        let (status, body) = send_json(&router, Method::GET, "/bus_routes", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_create_then_find_by_stop_id() {
        let router = memory_router();

        let (status, created) =
            send_json(&router, Method::POST, "/bus_routes", Some(route(1, &["stop1"]))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created["_id"].is_string());
        assert_eq!(created["routeNumber"], json!(1));
        assert_eq!(created["stops"][0]["stop_id"], json!("stop1"));

        let (status, found) =
            send_json(&router, Method::GET, "/bus_routes?stopId=stop1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found, json!([created]));
    }

    #[tokio::test]
    async fn test_filters() {
        let router = memory_router();
        let (_, r1) = send_json(&router, Method::POST, "/bus_routes", Some(route(1, &["a", "b"]))).await;
        let (_, r2) = send_json(&router, Method::POST, "/bus_routes", Some(route(2, &["b", "c"]))).await;
        let (_, r10) = send_json(&router, Method::POST, "/bus_routes", Some(route(10, &["a"]))).await;

        let cases = [
            ("/bus_routes", json!([r1, r2, r10])),
            ("/bus_routes?routeNumber=1", json!([r1])),
            ("/bus_routes?routeNumber=01", json!([r1])),
            ("/bus_routes?routeNumber=10", json!([r10])),
            ("/bus_routes?stopId=b", json!([r1, r2])),
            ("/bus_routes?stopId=c", json!([r2])),
            ("/bus_routes?stopId=d", json!([])),
            ("/bus_routes?routeNumber=1&stopId=a", json!([r1])),
            ("/bus_routes?routeNumber=2&stopId=a", json!([])),
            ("/bus_routes?routeNumber=&stopId=", json!([r1, r2, r10])),
        ];

        for (uri, expected) in cases {
            let (status, body) = send_json(&router, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body, expected, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_non_numeric_route_number() {
        let router = memory_router();
        let (status, body) =
            send_json(&router, Method::GET, "/bus_routes?routeNumber=abc", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "Cast to Number failed for value \"abc\" at path \"routeNumber\"" })
        );
    }

    #[tokio::test]
    async fn test_invalid_route_is_rejected_and_not_stored() {
        let router = memory_router();
        let mut invalid = route(3, &["a"]);
        invalid["stops"][0].as_object_mut().unwrap().remove("departure");

        let (status, body) = send_json(&router, Method::POST, "/bus_routes", Some(invalid)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            json!("BusRoute validation failed: stops.0.departure: field is required")
        );

        let (_, all) = send_json(&router, Method::GET, "/bus_routes", None).await;
        assert_eq!(all, json!([]));
    }

    struct UnavailableStore;

    #[async_trait]
    impl TransitStore for UnavailableStore {
        async fn find_stops(&self, _: &StopFilter) -> Result<Vec<Stored<Stop>>, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn insert_stop(&self, _: Stop) -> Result<Stored<Stop>, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn find_routes(&self, _: &RouteFilter) -> Result<Vec<Stored<Route>>, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn insert_route(&self, _: Route) -> Result<Stored<Route>, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_500_with_message() {
        let router = crate::api::router(Arc::new(UnavailableStore));
        let expected = json!({ "error": sqlx::Error::PoolTimedOut.to_string() });

        let (status, body) = send_json(&router, Method::GET, "/bus_routes", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, expected);

        let (status, body) =
            send_json(&router, Method::POST, "/bus_routes", Some(route(1, &[]))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, expected);

        let (status, body) = send_json(&router, Method::GET, "/bus_stops", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, expected);
    }
}
