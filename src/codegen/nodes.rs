//! Node file (`.nod.xml`) generation

use super::xml::XmlElement;
use super::{Artifact, ArtifactKind};
use crate::scenario::Snapshot;

pub fn generate_nodes(snapshot: &Snapshot) -> Artifact {
    let kind = ArtifactKind::Nodes;
    let mut root = XmlElement::schema_root("nodes", kind.schema());

    for node in snapshot.nodes.list() {
        root.push(
            XmlElement::new("node")
                .attr("id", &node.id)
                .attr_number("x", node.position.x)
                .attr_number("y", node.position.y)
                .attr_opt("type", node.node_type.map(|node_type| node_type.as_str())),
        );
    }

    Artifact::new(kind, root.to_document())
}
