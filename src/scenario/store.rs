//! The entity store that owns the scenario for one editing session
//!
//! Each entity kind lives in its own [`Table`], keyed by identifier and kept
//! in insertion order so that generated files come out the same way every
//! time. Referential integrity is not enforced here: removing an entity that
//! others point at leaves the dangling reference for the validator.

use log::debug;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use super::entities::{
    Detector, Edge, Entity, Flow, Node, Route, TrafficLightProgram, Trip, VehicleType,
};
use super::settings::SimulationSettings;
use super::types::EntityKind;

/// Errors raised synchronously by store mutations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Another entity of the same kind already uses this identifier.
    #[error("duplicate {kind} identifier '{id}'")]
    DuplicateIdentifier { kind: EntityKind, id: String },

    /// No entity of this kind has the identifier.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    /// Identifiers must be non-empty and free of whitespace.
    #[error("invalid {kind} identifier '{id}'")]
    InvalidIdentifier { kind: EntityKind, id: String },
}

fn check_identifier(kind: EntityKind, id: &str) -> Result<(), StoreError> {
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return Err(StoreError::InvalidIdentifier {
            kind,
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Insertion-ordered collection of one entity kind
#[derive(Debug, Clone)]
pub struct Table<T: Entity> {
    rows: Vec<T>,
    /// Maps identifiers to their position in `rows`
    index: HashMap<String, usize>,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Entity> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new entity at the end of the table
    pub fn add(&mut self, entity: T) -> Result<(), StoreError> {
        let id = entity.key().to_string();
        check_identifier(T::KIND, &id)?;
        if self.index.contains_key(&id) {
            return Err(StoreError::DuplicateIdentifier { kind: T::KIND, id });
        }

        debug!("Added {} '{}'", T::KIND, id);
        self.index.insert(id, self.rows.len());
        self.rows.push(entity);
        Ok(())
    }

    /// Replaces the entity stored under `id`, keeping its position
    ///
    /// The replacement may carry a new identifier, as long as no other entity
    /// of the same kind already uses it.
    pub fn update(&mut self, id: &str, entity: T) -> Result<(), StoreError> {
        let slot = *self.index.get(id).ok_or_else(|| StoreError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        })?;

        let new_id = entity.key().to_string();
        if new_id != id {
            check_identifier(T::KIND, &new_id)?;
            if self.index.contains_key(&new_id) {
                return Err(StoreError::DuplicateIdentifier {
                    kind: T::KIND,
                    id: new_id,
                });
            }
            self.index.remove(id);
            self.index.insert(new_id.clone(), slot);
            debug!("Renamed {} '{}' to '{}'", T::KIND, id, new_id);
        }

        debug!("Updated {} '{}'", T::KIND, new_id);
        self.rows[slot] = entity;
        Ok(())
    }

    /// Removes and returns the entity stored under `id`
    pub fn remove(&mut self, id: &str) -> Result<T, StoreError> {
        let slot = self.index.remove(id).ok_or_else(|| StoreError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        })?;

        let removed = self.rows.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }

        debug!("Removed {} '{}'", T::KIND, id);
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|slot| &self.rows[*slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All entities in insertion order
    pub fn list(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The mutable scenario model of one editing session
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    pub nodes: Table<Node>,
    pub edges: Table<Edge>,
    pub vehicle_types: Table<VehicleType>,
    pub routes: Table<Route>,
    pub flows: Table<Flow>,
    pub trips: Table<Trip>,
    pub detectors: Table<Detector>,
    pub traffic_lights: Table<TrafficLightProgram>,
    pub settings: SimulationSettings,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes an isolated copy of the whole store for validation and export
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            inner: Arc::new(self.clone()),
        }
    }

    /// Total number of entities across all kinds
    pub fn entity_count(&self) -> usize {
        self.nodes.len()
            + self.edges.len()
            + self.vehicle_types.len()
            + self.routes.len()
            + self.flows.len()
            + self.trips.len()
            + self.detectors.len()
            + self.traffic_lights.len()
    }
}

/// An immutable point-in-time copy of an [`EntityStore`]
///
/// Cloning a snapshot is cheap and the copy can be shared across threads;
/// later edits to the store are never visible through it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    inner: Arc<EntityStore>,
}

impl Deref for Snapshot {
    type Target = EntityStore;

    fn deref(&self) -> &EntityStore {
        &self.inner
    }
}
