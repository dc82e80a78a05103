//! SUMO file generation
//!
//! One pure generator per output file. Generators read a validated snapshot
//! and never re-resolve references: identifiers are written verbatim.

mod additional;
mod command;
mod demand;
mod edges;
mod nodes;
mod sumocfg;
pub mod xml;

use log::debug;
use std::fmt;

use crate::scenario::Snapshot;

pub use additional::generate_additional;
pub use command::{build_command, run_command, LEFTHAND_FLAG, NETCONVERT, SUMO};
pub use demand::generate_demand;
pub use edges::generate_edges;
pub use nodes::generate_nodes;
pub use sumocfg::generate_configuration;

/// File name of the network `netconvert` builds from the node and edge files
pub const NETWORK_FILE: &str = "network.net.xml";

/// The files produced for a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Nodes,
    Edges,
    Demand,
    Additional,
    Configuration,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Nodes,
        ArtifactKind::Edges,
        ArtifactKind::Demand,
        ArtifactKind::Additional,
        ArtifactKind::Configuration,
    ];

    /// Stable file name, derived only from the kind
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Nodes => "nodes.nod.xml",
            ArtifactKind::Edges => "edges.edg.xml",
            ArtifactKind::Demand => "routes.rou.xml",
            ArtifactKind::Additional => "additional.add.xml",
            ArtifactKind::Configuration => "simulation.sumocfg",
        }
    }

    /// SUMO schema the file validates against
    pub fn schema(self) -> &'static str {
        match self {
            ArtifactKind::Nodes => "http://sumo.dlr.de/xsd/nodes_file.xsd",
            ArtifactKind::Edges => "http://sumo.dlr.de/xsd/edges_file.xsd",
            ArtifactKind::Demand => "http://sumo.dlr.de/xsd/routes_file.xsd",
            ArtifactKind::Additional => "http://sumo.dlr.de/xsd/additional_file.xsd",
            ArtifactKind::Configuration => "http://sumo.dlr.de/xsd/sumoConfiguration.xsd",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub contents: String,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, contents: String) -> Self {
        Self { kind, contents }
    }

    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }
}

/// The five files of a scenario, generated from one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    pub nodes: Artifact,
    pub edges: Artifact,
    pub demand: Artifact,
    pub additional: Artifact,
    pub configuration: Artifact,
}

impl GeneratedArtifacts {
    /// Artifacts in package order
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        [
            &self.nodes,
            &self.edges,
            &self.demand,
            &self.additional,
            &self.configuration,
        ]
        .into_iter()
    }

    pub fn get(&self, kind: ArtifactKind) -> &Artifact {
        match kind {
            ArtifactKind::Nodes => &self.nodes,
            ArtifactKind::Edges => &self.edges,
            ArtifactKind::Demand => &self.demand,
            ArtifactKind::Additional => &self.additional,
            ArtifactKind::Configuration => &self.configuration,
        }
    }
}

/// Runs every generator over the same snapshot
///
/// Callers must only pass snapshots whose validation produced no errors.
pub fn generate_all(snapshot: &Snapshot) -> GeneratedArtifacts {
    let artifacts = GeneratedArtifacts {
        nodes: generate_nodes(snapshot),
        edges: generate_edges(snapshot),
        demand: generate_demand(snapshot),
        additional: generate_additional(snapshot),
        configuration: generate_configuration(snapshot),
    };

    for artifact in artifacts.iter() {
        debug!("Generated {} ({} bytes)", artifact.kind, artifact.contents.len());
    }
    artifacts
}
