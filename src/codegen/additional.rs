//! Additional file (`.add.xml`) generation: detectors, traffic-light
//! programs and aggregated edge/lane data declarations

use super::xml::XmlElement;
use super::{Artifact, ArtifactKind};
use crate::scenario::{OutputKind, Snapshot};

pub fn generate_additional(snapshot: &Snapshot) -> Artifact {
    let kind = ArtifactKind::Additional;
    let mut root = XmlElement::schema_root("additional", kind.schema());

    for detector in snapshot.detectors.list() {
        root.push(
            XmlElement::new("inductionLoop")
                .attr("id", &detector.id)
                .attr("lane", detector.lane_id())
                .attr_number("pos", detector.position)
                .attr_number("period", detector.frequency)
                .attr("file", &detector.file),
        );
    }

    for program in snapshot.traffic_lights.list() {
        let mut logic = XmlElement::new("tlLogic")
            .attr("id", &program.id)
            .attr("type", program.kind.as_str())
            .attr("programID", &program.program_id)
            .attr_number("offset", program.offset);
        for phase in &program.phases {
            logic.push(
                XmlElement::new("phase")
                    .attr_number("duration", phase.duration)
                    .attr("state", &phase.state),
            );
        }
        root.push(logic);
    }

    // Aggregated edge/lane measures are mean-data declarations, not sumocfg options
    let mean_data = [
        (OutputKind::EdgeData, "edgeData"),
        (OutputKind::LaneData, "laneData"),
    ];
    for (output_kind, tag) in mean_data {
        let output = snapshot.settings.outputs.get(output_kind);
        if !output.enabled {
            continue;
        }
        root.push(
            XmlElement::new(tag)
                .attr("id", output_kind.as_str())
                .attr_opt_number("period", output.frequency)
                .attr("file", &output.file),
        );
    }

    Artifact::new(kind, root.to_document())
}
