//! Command synthesis for the external SUMO tools

use super::{ArtifactKind, NETWORK_FILE};
use crate::scenario::{DrivingSide, SimulationSettings};

/// Network build tool
pub const NETCONVERT: &str = "netconvert";

/// Simulator binary
pub const SUMO: &str = "sumo";

/// Flag telling `netconvert` to build a left-hand traffic network
pub const LEFTHAND_FLAG: &str = "--lefthand";

/// The `netconvert` invocation that turns the node and edge files into the
/// network file referenced by the configuration
///
/// Only the driving side influences the result.
pub fn build_command(settings: &SimulationSettings) -> String {
    let mut command = format!(
        "{} -n {} -e {} -o {}",
        NETCONVERT,
        ArtifactKind::Nodes.file_name(),
        ArtifactKind::Edges.file_name(),
        NETWORK_FILE
    );
    if settings.driving_side == DrivingSide::Left {
        command.push(' ');
        command.push_str(LEFTHAND_FLAG);
    }
    command
}

/// The simulator invocation for the generated configuration
pub fn run_command() -> String {
    format!("{} -c {}", SUMO, ArtifactKind::Configuration.file_name())
}
