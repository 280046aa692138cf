//! Resource Model

use serde::{Deserialize, Serialize};

/// What kind of bookable entity a resource is.
///
/// Only affects how a slot conflict is phrased to the operator: a taken
/// clubhouse slot means "an event already exists", a taken field slot means
/// the field is occupied. Behavior is identical for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Field,
    Clubhouse,
}

/// A bookable physical entity (a field or the clubhouse).
///
/// The set of resources is fixed at deployment; resources are never
/// created or destroyed at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Stable identifier, e.g. `campo7a`
    pub id: String,
    /// Display name, e.g. "Campo 7 — A"
    pub name: String,
    /// Short code for compact views, e.g. "C7A"
    pub short_code: String,
    pub kind: ResourceKind,
}

impl Resource {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        short_code: impl Into<String>,
        kind: ResourceKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            short_code: short_code.into(),
            kind,
        }
    }
}
