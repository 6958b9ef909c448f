use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::{Fields, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Not unique. Several routes may share a number.
    pub route_number: i64,
    pub bus_name: String,
    pub start_point: String,
    pub end_point: String,
    /// Free form, never parsed.
    pub arrival: String,
    /// Free form, never parsed.
    pub departure: String,
    #[serde(default)]
    pub stops: Vec<StopRef>,
}

/// A copy of a stop id embedded in a route. It is never checked against the stops collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRef {
    pub stop_id: String,
    pub arrival: String,
    pub departure: String,
}

impl Route {
    /// Name used in validation messages.
    pub const DOCUMENT: &str = "BusRoute";

    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let fields = Fields::root(Self::DOCUMENT, value)?;

        Ok(Route {
            route_number: fields.integer("routeNumber")?,
            bus_name: fields.string("busName")?,
            start_point: fields.string("startPoint")?,
            end_point: fields.string("endPoint")?,
            arrival: fields.string("arrival")?,
            departure: fields.string("departure")?,
            stops: StopRef::list(&fields, "stops")?,
        })
    }

    pub fn serves(&self, stop_id: &str) -> bool {
        self.stops.iter().any(|s| s.stop_id == stop_id)
    }
}

impl StopRef {
    fn list(fields: &Fields<'_>, field: &str) -> Result<Vec<Self>, ValidationError> {
        let Some(values) = fields.array(field)? else {
            return Ok(vec![]);
        };

        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                StopRef::from_fields(&fields.nested(format!("{}.{i}", fields.path(field)), value)?)
            })
            .collect()
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self, ValidationError> {
        Ok(StopRef {
            stop_id: fields.string("stop_id")?,
            arrival: fields.string("arrival")?,
            departure: fields.string("departure")?,
        })
    }
}
