//! Edge file (`.edg.xml`) generation

use super::command::LEFTHAND_FLAG;
use super::xml::{format_number, XmlElement};
use super::{Artifact, ArtifactKind};
use crate::scenario::{DrivingSide, Position, Snapshot};

/// Renders a SUMO shape attribute: `x1,y1 x2,y2 ...`
fn format_shape(shape: &[Position]) -> String {
    shape
        .iter()
        .map(|point| format!("{},{}", format_number(point.x), format_number(point.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn generate_edges(snapshot: &Snapshot) -> Artifact {
    let kind = ArtifactKind::Edges;
    let side = snapshot.settings.driving_side;

    // The driving side is applied by netconvert, not by the edge file itself
    let note = match side {
        DrivingSide::Left => format!(
            "Driving side: left-hand (build the network with {})",
            LEFTHAND_FLAG
        ),
        DrivingSide::Right => "Driving side: right-hand".to_string(),
    };
    let mut root = XmlElement::schema_root("edges", kind.schema()).comment(note);

    for edge in snapshot.edges.list() {
        let mut element = XmlElement::new("edge")
            .attr("id", &edge.id)
            .attr("from", &edge.from)
            .attr("to", &edge.to)
            .attr("numLanes", edge.num_lanes)
            .attr_number("speed", edge.speed)
            .attr_opt("priority", edge.priority)
            .attr_opt_number("laneWidth", edge.lane_width);

        if !edge.allow.is_empty() {
            element = element.attr("allow", edge.allow.join(" "));
        }
        if !edge.disallow.is_empty() {
            element = element.attr("disallow", edge.disallow.join(" "));
        }
        if !edge.shape.is_empty() {
            element = element.attr("shape", format_shape(&edge.shape));
        }

        root.push(
            element
                .attr_opt("spreadType", edge.spread_type.map(|spread| spread.as_str()))
                .attr_opt_number("endOffset", edge.end_offset),
        );
    }

    Artifact::new(kind, root.to_document())
}
