pub mod route;
pub mod stop;
pub mod validation;

pub use route::*;
pub use stop::*;

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A document as it sits in the store, with the identifier the store assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub document: T,
}

impl<T> Stored<T> {
    pub fn new(document: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            document,
        }
    }
}

impl<T> Deref for Stored<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.document
    }
}
