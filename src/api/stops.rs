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
    model::{Stop, Stored, validation::parse_body},
    store::{SharedStore, StopFilter},
};

#[derive(Debug, Deserialize)]
pub struct StopQuery {
    #[serde(rename = "stopId")]
    pub stop_id: Option<String>,
}

impl From<StopQuery> for StopFilter {
    fn from(query: StopQuery) -> Self {
        StopFilter {
            stop_id: query.stop_id.filter(|id| !id.is_empty()),
        }
    }
}

pub async fn list_stops(
    State(store): State<SharedStore>,
    query: Result<Query<StopQuery>, QueryRejection>,
) -> Result<Json<Vec<Stored<Stop>>>, ApiError> {
    let Query(query) = query?;
    let stops = store.find_stops(&StopFilter::from(query)).await?;

    Ok(Json(stops))
}

pub async fn create_stop(
    State(store): State<SharedStore>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Stored<Stop>>), ApiError> {
    let value = parse_body(Stop::DOCUMENT, &body?)?;
    let stop = Stop::from_json(&value)?;

    let created = store.insert_stop(stop).await?;
    info!(
        id = %created.id,
        stop_id = %created.stop_id,
        longitude = created.coordinates.longitude(),
        latitude = created.coordinates.latitude(),
        "created stop"
    );

    Ok((StatusCode::CREATED, Json(created)))
}
