//! Scenario description files
//!
//! A scenario file lists entities per kind plus the simulation settings, in
//! TOML or JSON. Loading replays every entity through the store's `add`
//! operation, so duplicate or malformed identifiers are rejected exactly as
//! they would be for interactive edits.

use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::entities::{Detector, Edge, Flow, Node, Route, TrafficLightProgram, Trip, VehicleType};
use super::settings::SimulationSettings;
use super::store::{EntityStore, StoreError};

/// Errors that can occur while loading a scenario file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// An entity was rejected by the store.
    #[error("invalid scenario in {file}: {source}")]
    Store { file: PathBuf, source: StoreError },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported scenario file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// Detect the format of a file based on its extension
    pub fn detect(path: &Path) -> Result<Format, LoadError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Format::Toml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoadError::UnsupportedFormat {
                file: path.to_path_buf(),
            }),
        }
    }
}

/// On-disk shape of a scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioFile {
    pub settings: SimulationSettings,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub vehicle_types: Vec<VehicleType>,
    pub routes: Vec<Route>,
    pub flows: Vec<Flow>,
    pub trips: Vec<Trip>,
    pub detectors: Vec<Detector>,
    pub traffic_lights: Vec<TrafficLightProgram>,
}

impl ScenarioFile {
    /// Replays every entity into a fresh store, in file order
    pub fn into_store(self) -> Result<EntityStore, StoreError> {
        let mut store = EntityStore::new();
        store.settings = self.settings;

        for node in self.nodes {
            store.nodes.add(node)?;
        }
        for edge in self.edges {
            store.edges.add(edge)?;
        }
        for vehicle_type in self.vehicle_types {
            store.vehicle_types.add(vehicle_type)?;
        }
        for route in self.routes {
            store.routes.add(route)?;
        }
        for flow in self.flows {
            store.flows.add(flow)?;
        }
        for trip in self.trips {
            store.trips.add(trip)?;
        }
        for detector in self.detectors {
            store.detectors.add(detector)?;
        }
        for program in self.traffic_lights {
            store.traffic_lights.add(program)?;
        }

        Ok(store)
    }
}

/// Parses scenario text in the given format into a store
///
/// `origin` only labels errors.
pub fn parse_scenario(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<EntityStore, LoadError> {
    let parsed: Result<ScenarioFile, String> = match format {
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    };
    let scenario = parsed.map_err(|detail| LoadError::Parse {
        file: origin.to_path_buf(),
        detail,
    })?;

    scenario.into_store().map_err(|source| LoadError::Store {
        file: origin.to_path_buf(),
        source,
    })
}

/// Reads a scenario file, choosing the format from its extension
pub fn load_scenario(path: &Path) -> Result<EntityStore, LoadError> {
    let format = Format::detect(path)?;
    let content = std::fs::read_to_string(path)?;
    let store = parse_scenario(&content, format, path)?;

    info!(
        "Loaded {} entities from {}",
        store.entity_count(),
        path.display()
    );
    Ok(store)
}
