mod cli;
use cli::{Cli, Command};

use clap::Parser;
use log::{error, info};
use topodiff::topology::{JsonDirRepository, TopologyRepository};
use topodiff::{
    Error, GraphFetcher, ParserRegistry, SerializeMode, Settings, Topology, TopologyConfig,
};
use topodiff_http::HttpTransport;

fn main() {
    pretty_env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let builtins = ParserRegistry::with_builtins();
    let mut settings = match cli.config.as_ref() {
        Some(path) => Settings::load(path, &builtins)?,
        None => Settings::default(),
    };
    if let Some(store) = cli.store {
        settings.store = store;
    }
    if let Some(timeout) = cli.timeout {
        settings.timeout = timeout;
    }
    if cli.faithful {
        settings.serialize_mode = SerializeMode::Faithful;
    }
    settings.validate(&builtins)?;

    let registry = settings.registry(&builtins)?;
    let mut repo = JsonDirRepository::open(&settings.store)?;

    match cli.command {
        Command::Parsers => {
            for (id, parser) in registry.iter() {
                println!(
                    "{}\t{} {} ({})",
                    id,
                    parser.protocol(),
                    parser.version(),
                    parser.metric()
                );
            }
        }
        Command::Add { label, parser, url } => {
            let topology = Topology::new(TopologyConfig::new(label, parser, url), &registry)?;
            repo.save_topology(&topology)?;
            println!("{}", topology.id());
        }
        Command::List => {
            for id in repo.list()? {
                let topology = repo.load_topology(id, &registry)?;
                println!(
                    "{}\t{}\t{}\t{}\t{} nodes, {} links",
                    id,
                    topology,
                    topology.parser_id(),
                    topology.url(),
                    topology.node_count(),
                    topology.link_count()
                );
            }
        }
        Command::Json { id, pretty } => {
            let topology = repo.load_topology(id, &registry)?;
            println!("{}", topology.json_string(settings.serialize_mode, pretty)?);
        }
        Command::Diff { id, pretty } => {
            let topology = repo.load_topology(id, &registry)?;
            let fetcher = GraphFetcher::new(HttpTransport::new(), registry.clone());
            let delta = topology.diff(&fetcher, settings.serialize_mode, settings.timeout())?;
            let output = if pretty {
                serde_json::to_string_pretty(&delta)?
            } else {
                serde_json::to_string(&delta)?
            };
            println!("{}", output);
        }
        Command::Update { id } => {
            let mut topology = repo.load_topology(id, &registry)?;
            let fetcher = GraphFetcher::new(HttpTransport::new(), registry.clone());
            let revision = topology.revision().to_string();
            let delta = topology.update(&fetcher, settings.timeout())?;
            if delta.is_empty() && topology.revision() == revision {
                info!("Topology {} is up to date", topology);
                return Ok(());
            }
            repo.save_topology(&topology)?;
            info!(
                "Topology {} updated: +{} -{} nodes, +{} -{} ~{} links",
                topology,
                delta.added_nodes.len(),
                delta.removed_nodes.len(),
                delta.added_links.len(),
                delta.removed_links.len(),
                delta.changed_links.len()
            );
        }
    }
    Ok(())
}
