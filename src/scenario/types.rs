//! Core identifier and reference types for the scenario model
//!
//! Every cross-entity reference is a typed identifier rather than a bare
//! string, so a reference always knows which entity kind it points at.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of entity held by the scenario store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Settings,
    Node,
    Edge,
    VehicleType,
    Route,
    Flow,
    Trip,
    Detector,
    TrafficLightProgram,
}

impl EntityKind {
    /// Human-readable name used in findings and log messages
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Settings => "simulation settings",
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
            EntityKind::VehicleType => "vehicle type",
            EntityKind::Route => "route",
            EntityKind::Flow => "flow",
            EntityKind::Trip => "trip",
            EntityKind::Detector => "detector",
            EntityKind::TrafficLightProgram => "traffic-light program",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A resolved-or-not pointer to another entity: kind plus identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.id)
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The reference this identifier denotes
            pub fn to_ref(&self) -> EntityRef {
                EntityRef::new($kind, self.0.clone())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

entity_id!(
    /// Identifier of a network node (junction)
    NodeId => EntityKind::Node
);
entity_id!(
    /// Identifier of a directed edge
    EdgeId => EntityKind::Edge
);
entity_id!(
    /// Identifier of a vehicle type
    VehicleTypeId => EntityKind::VehicleType
);
entity_id!(
    /// Identifier of a named route
    RouteId => EntityKind::Route
);

/// A 2D position in network coordinates (metres)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
