use crate::differ::{diff, ChangedLink, Delta};
use crate::example_networks::{ExampleTopology, Mesh};
use crate::fetcher::{GraphFetcher, MemoryTransport, DEFAULT_TIMEOUT};
use crate::netjson::{Link, Node};
use crate::parsers::ParserRegistry;
use crate::serializer::SerializeMode;
use crate::topology::{MemoryRepository, TopologyRepository};

fn fetcher(variant: usize) -> GraphFetcher<MemoryTransport> {
    let mut transport = MemoryTransport::new();
    transport.insert(Mesh::url(), Mesh::latest_payload(variant));
    GraphFetcher::new(transport, ParserRegistry::with_builtins())
}

#[test]
fn test_unchanged_mesh() {
    let t = Mesh::topology(&ParserRegistry::with_builtins());
    let delta = t.diff(&fetcher(0), SerializeMode::Corrected, DEFAULT_TIMEOUT).unwrap();
    assert!(delta.is_empty(), "unexpected delta: {:?}", delta);
}

#[test]
fn test_changed_mesh() {
    let t = Mesh::topology(&ParserRegistry::with_builtins());
    let delta = t.diff(&fetcher(1), SerializeMode::Corrected, DEFAULT_TIMEOUT).unwrap();
    assert_eq!(
        delta,
        Delta {
            // reached through the added link .3 -> .5
            added_nodes: vec![Node::new("10.150.0.5")],
            removed_nodes: vec![Node::new("10.150.0.4")],
            added_links: vec![Link::new("10.150.0.3", "10.150.0.5", 1.0)],
            removed_links: vec![Link::new("10.150.0.3", "10.150.0.4", 1.0)],
            changed_links: vec![ChangedLink {
                source: "10.150.0.2".to_string(),
                target: "10.150.0.3".to_string(),
                old_cost: 1.5,
                new_cost: 2.0,
            }],
        }
    );
}

#[test]
fn test_apply_delta() {
    let registry = ParserRegistry::with_builtins();
    let fetcher = fetcher(1);
    let mut t = Mesh::topology(&registry);
    let delta = t.diff(&fetcher, SerializeMode::Corrected, DEFAULT_TIMEOUT).unwrap();
    t.apply_delta(&delta).unwrap();

    assert_eq!(t.node_count(), 4);
    assert_eq!(t.link_count(), 4);
    assert_eq!(t.find_node("10.150.0.4"), None);
    let n2 = t.find_node("10.150.0.2").unwrap();
    let n3 = t.find_node("10.150.0.3").unwrap();
    let n5 = t.find_node("10.150.0.5").unwrap();
    assert_eq!(t.link_cost(n2, n3), Some(2.0));
    assert_eq!(t.link_cost(n3, n5), Some(1.0));
    // the first node keeps its second interface
    assert_eq!(t.find_node("172.16.0.1"), t.find_node("10.150.0.1"));

    assert!(t.diff(&fetcher, SerializeMode::Corrected, DEFAULT_TIMEOUT).unwrap().is_empty());

    let mut repo = MemoryRepository::new();
    repo.save_topology(&t).unwrap();
    let restored = repo.load_topology(t.id(), &registry).unwrap();
    assert!(restored.diff(&fetcher, SerializeMode::Corrected, DEFAULT_TIMEOUT).unwrap().is_empty());
}

#[test]
fn test_faithful_mesh() {
    let t = Mesh::topology(&ParserRegistry::with_builtins());
    let current = t.json(SerializeMode::Faithful).unwrap();
    assert_eq!(current.nodes().len(), 8);
    // every link of the legacy output points back to its source
    assert!(current.links().iter().all(|l| l.source() == l.target()));

    let latest = t.latest(&fetcher(0), DEFAULT_TIMEOUT).unwrap();
    let delta = diff(&current, &latest);
    assert!(delta.added_nodes.is_empty());
    assert!(delta.removed_nodes.is_empty());
    assert_eq!(delta.added_links.len(), 4);
    assert_eq!(delta.removed_links.len(), 3);
}

#[test]
fn test_diff_does_not_touch_inputs() {
    let t = Mesh::topology(&ParserRegistry::with_builtins());
    let current = t.json(SerializeMode::Corrected).unwrap();
    let latest = t.latest(&fetcher(1), DEFAULT_TIMEOUT).unwrap();
    let (current_copy, latest_copy) = (current.clone(), latest.clone());
    let first = diff(&current, &latest);
    assert_eq!(current, current_copy);
    assert_eq!(latest, latest_copy);
    assert_eq!(diff(&current, &latest), first);
    assert!(diff(&latest, &latest).is_empty());
}
