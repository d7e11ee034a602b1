use super::ExampleTopology;
use crate::parsers::ParserRegistry;
use crate::topology::{Topology, TopologyConfig};

/// Small OLSR mesh. The first node has a second interface, the fifth node is known but has
/// no links.
///
/// ```text
/// 10.150.0.1 <-> 10.150.0.2 -> 10.150.0.3 -> 10.150.0.4      10.150.0.5
/// ```
pub struct Mesh {}

impl ExampleTopology for Mesh {
    fn url() -> &'static str {
        "http://10.150.0.1:9090/topology"
    }

    fn topology(registry: &ParserRegistry) -> Topology {
        let config = TopologyConfig::new("mesh", "olsr", Self::url());
        let mut t = Topology::new(config, registry).unwrap();
        let n1 = t.add_node(vec!["10.150.0.1".to_string(), "172.16.0.1".to_string()]).unwrap();
        let n2 = t.add_node(vec!["10.150.0.2".to_string()]).unwrap();
        let n3 = t.add_node(vec!["10.150.0.3".to_string()]).unwrap();
        let n4 = t.add_node(vec!["10.150.0.4".to_string()]).unwrap();
        t.add_node(vec!["10.150.0.5".to_string()]).unwrap();

        t.add_link(n1, n2, 1.0).unwrap();
        t.add_link(n2, n1, 1.0).unwrap();
        t.add_link(n2, n3, 1.5).unwrap();
        t.add_link(n3, n4, 1.0).unwrap();
        t
    }

    /// Variant 0 matches the stored state. Variant 1 raises the cost of `.2 -> .3` to 2,
    /// replaces `.3 -> .4` by `.3 -> .5` and therefore drops `.4`.
    fn latest_payload(variant: usize) -> String {
        let topology = match variant {
            0 => vec![
                ("10.150.0.1", "10.150.0.2", 1024),
                ("10.150.0.2", "10.150.0.1", 1024),
                ("10.150.0.2", "10.150.0.3", 1536),
                ("10.150.0.3", "10.150.0.4", 1024),
            ],
            _ => vec![
                ("172.16.0.1", "10.150.0.2", 1024),
                ("10.150.0.2", "10.150.0.1", 1024),
                ("10.150.0.2", "10.150.0.3", 2048),
                ("10.150.0.3", "10.150.0.5", 1024),
            ],
        };
        let entries: Vec<String> = topology
            .iter()
            .map(|(last_hop, destination, cost)| {
                format!(
                    "{{\"lastHopIP\": \"{}\", \"destinationIP\": \"{}\", \"tcEdgeCost\": {}}}",
                    last_hop, destination, cost
                )
            })
            .collect();
        let mid = r#"[{"ipAddress": "10.150.0.1", "aliases": [{"ipAddress": "172.16.0.1"}]}]"#;
        format!("{{\"topology\": [{}], \"mid\": {}}}", entries.join(", "), mid)
    }
}
