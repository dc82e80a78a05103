//! Scenario model
//!
//! This module holds the typed scenario entities, the store that owns them
//! for an editing session, and the validator that checks their
//! cross-references before anything is exported.

mod defaults;
mod entities;
mod loader;
mod network;
mod settings;
mod store;
mod types;
mod validator;

pub use entities::{
    CarFollowModel, Color, Detector, Edge, Entity, Flow, FlowPath, FlowRate, LaneChangeParams,
    Node, NodeType, Phase, Route, SpreadType, TlsType, TrafficLightProgram, Trip, TripEndpoints,
    VehicleType, SIGNAL_STATES,
};
pub use loader::{load_scenario, parse_scenario, Format, LoadError, ScenarioFile};
pub use network::RoadGraph;
pub use settings::{
    CollisionAction, DrivingSide, LaneChangeModel, OutputKind, OutputSettings, Outputs,
    SimulationSettings,
};
pub use store::{EntityStore, Snapshot, StoreError, Table};
pub use types::{EdgeId, EntityKind, EntityRef, NodeId, Position, RouteId, VehicleTypeId};
pub use validator::{validate, Finding, Severity, ValidationReport, SETTINGS_ID};
