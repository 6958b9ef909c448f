use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::{Fields, Reason, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Not unique. Several stops may share an id.
    pub stop_id: String,
    pub stop_name: String,
    pub coordinates: Point,
}

/// GeoJSON style point, `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "type", default)]
    pub kind: GeometryType,
    pub coordinates: [f64; 2],
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    #[default]
    Point,
}

impl Stop {
    /// Name used in validation messages.
    pub const DOCUMENT: &str = "BusStop";

    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let fields = Fields::root(Self::DOCUMENT, value)?;

        Ok(Stop {
            stop_id: fields.string("stop_id")?,
            stop_name: fields.string("stop_name")?,
            coordinates: Point::from_fields(&fields.object("coordinates")?)?,
        })
    }
}

impl Point {
    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self, ValidationError> {
        let kind = match fields.optional("type") {
            None => GeometryType::Point,
            Some(Value::String(s)) if s == "Point" => GeometryType::Point,
            Some(Value::String(s)) => return Err(fields.error("type", Reason::NotPoint(s.clone()))),
            Some(_) => return Err(fields.error("type", Reason::WrongType("a string"))),
        };

        let values = fields
            .array("coordinates")?
            .ok_or_else(|| fields.error("coordinates", Reason::Required))?;

        if values.len() != 2 {
            return Err(fields.error("coordinates", Reason::CoordinateCount(values.len())));
        }

        let base = fields.path("coordinates");
        let mut coordinates = [0.0; 2];
        for (i, (value, limit)) in values.iter().zip([180.0, 90.0]).enumerate() {
            let path = format!("{base}.{i}");
            let n = value
                .as_f64()
                .ok_or_else(|| fields.error_at(path.clone(), Reason::WrongType("a number")))?;

            if !(-limit..=limit).contains(&n) {
                return Err(fields.error_at(
                    path,
                    Reason::OutOfRange {
                        value: n,
                        min: -limit,
                        max: limit,
                    },
                ));
            }
            coordinates[i] = n;
        }

        Ok(Point { kind, coordinates })
    }
}
