//! Diagram Studio CLI - edit a persisted diagram document from the terminal
//!
//! Drives the full synchronization path (store -> binding adapter ->
//! engine) against the headless in-memory engine, then writes the canonical
//! snapshot back to disk.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::{style, Emoji};

use diagram_studio::{
    diagram::persist, DiagramView, GraphDelta, GraphSnapshot, HeadlessEngine, LinkRecord,
    ModelData, NodeRecord, Point, RemovalPolicy,
};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "+ ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");
static ARROW: Emoji<'_, '_> = Emoji("→ ", "-> ");

#[derive(Parser)]
#[command(name = "diagram-studio")]
#[command(about = "Edit a diagram document through the synchronization core")]
#[command(long_about = r#"
Loads a diagram document ({nodeDataArray, linkDataArray, modelData} JSON),
applies one edit through the canonical store and binding adapter, and saves
the result. Node keys are positive and link keys negative; keys are assigned
automatically and never reused within a session.

Examples:
  diagram-studio init                      # Write a starter document
  diagram-studio show                      # List nodes and links
  diagram-studio add-node --text Epsilon   # Create a node
  diagram-studio add-link --from 1 --to 2  # Create a link
  diagram-studio remove-node --key 2       # Remove a node and its links
"#)]
struct Cli {
    /// Diagram document to edit
    #[arg(short, long, default_value = "diagram.json", global = true)]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter document
    Init {
        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },
    /// List the document's nodes and links
    Show,
    /// Create a node
    AddNode {
        #[arg(long)]
        text: String,
        #[arg(long, default_value = "lightblue")]
        color: String,
        /// Location as "x y"
        #[arg(long, default_value = "0 0")]
        at: String,
    },
    /// Create a link between two existing nodes
    AddLink {
        #[arg(long)]
        from: i64,
        #[arg(long)]
        to: i64,
    },
    /// Remove a node
    RemoveNode {
        #[arg(long)]
        key: i64,
        /// Refuse removal while links reference the node, instead of
        /// cascade-deleting them
        #[arg(long)]
        reject_links: bool,
    },
    /// Allow or forbid relinking model-wide
    SetRelink {
        /// "true" to allow, "false" to forbid
        #[arg(action = clap::ArgAction::Set)]
        allowed: bool,
    },
}

fn starter_document() -> GraphSnapshot {
    GraphSnapshot::new(
        vec![
            NodeRecord::new("Alpha")
                .with_key(1)
                .with_loc(Point::new(0.0, 0.0)),
            NodeRecord::new("Beta")
                .with_key(2)
                .with_color("orange")
                .with_loc(Point::new(150.0, 0.0)),
            NodeRecord::new("Gamma")
                .with_key(3)
                .with_color("lightgreen")
                .with_loc(Point::new(0.0, 100.0)),
            NodeRecord::new("Delta")
                .with_key(4)
                .with_color("pink")
                .with_loc(Point::new(150.0, 100.0)),
        ],
        vec![
            LinkRecord::new(1, 2).with_key(-1),
            LinkRecord::new(1, 3).with_key(-2),
        ],
        ModelData::default(),
    )
}

/// Build a view over the document with a fresh headless engine.
fn open_view(
    snapshot: GraphSnapshot,
    policy: RemovalPolicy,
) -> Result<DiagramView<HeadlessEngine>> {
    let view = DiagramView::new(
        Some(HeadlessEngine::new()),
        snapshot,
        policy,
        None,
        |_| {},
        |delta: &GraphDelta| log::debug!("committed delta: {delta:?}"),
    )?;
    Ok(view)
}

fn load_document(path: &PathBuf) -> Result<GraphSnapshot> {
    persist::load(path).with_context(|| format!("failed to read {}", path.display()))
}

fn save_document(path: &PathBuf, snapshot: &GraphSnapshot) -> Result<()> {
    persist::save(path, snapshot).with_context(|| format!("failed to write {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            if cli.file.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    cli.file.display()
                );
            }
            save_document(&cli.file, &starter_document())?;
            println!("{}wrote {}", CHECK, style(cli.file.display()).cyan());
        }
        Commands::Show => {
            let snapshot = load_document(&cli.file)?;
            println!(
                "{} ({} nodes, {} links, relink {})",
                style(cli.file.display()).cyan(),
                snapshot.nodes.len(),
                snapshot.links.len(),
                if snapshot.model_data.can_relink {
                    "allowed"
                } else {
                    "forbidden"
                }
            );
            for node in &snapshot.nodes {
                println!(
                    "  [{}] {} ({}, at {})",
                    style(node.key).green(),
                    style(&node.text).bold(),
                    node.color,
                    node.loc
                );
            }
            for link in &snapshot.links {
                println!(
                    "  [{}] {} {}{}",
                    style(link.key).yellow(),
                    link.from,
                    ARROW,
                    link.to
                );
            }
        }
        Commands::AddNode { text, color, at } => {
            let loc = Point::parse(&at)
                .with_context(|| format!("invalid --at value {at:?}, expected \"x y\""))?;
            let mut view = open_view(load_document(&cli.file)?, RemovalPolicy::Cascade)?;
            let key = view.add_node(NodeRecord::new(&text).with_color(color).with_loc(loc))?;
            save_document(&cli.file, view.snapshot())?;
            println!("{}added node [{}] {}", CHECK, style(key).green(), text);
        }
        Commands::AddLink { from, to } => {
            let mut view = open_view(load_document(&cli.file)?, RemovalPolicy::Cascade)?;
            match view.add_link(LinkRecord::new(from, to)) {
                Ok(key) => {
                    save_document(&cli.file, view.snapshot())?;
                    println!(
                        "{}added link [{}] {} {}{}",
                        CHECK,
                        style(key).yellow(),
                        from,
                        ARROW,
                        to
                    );
                }
                Err(err) => {
                    println!("{}{}", CROSS, style(&err).red());
                    bail!(err);
                }
            }
        }
        Commands::RemoveNode { key, reject_links } => {
            let policy = if reject_links {
                RemovalPolicy::Reject
            } else {
                RemovalPolicy::Cascade
            };
            let mut view = open_view(load_document(&cli.file)?, policy)?;
            match view.remove_node(key) {
                Ok(applied) => {
                    save_document(&cli.file, view.snapshot())?;
                    println!(
                        "{}removed node [{}] and {} link(s)",
                        CHECK,
                        style(key).green(),
                        applied.removed_link_keys.len()
                    );
                }
                Err(err) => {
                    println!("{}{}", CROSS, style(&err).red());
                    bail!(err);
                }
            }
        }
        Commands::SetRelink { allowed } => {
            let mut view = open_view(load_document(&cli.file)?, RemovalPolicy::Cascade)?;
            view.set_can_relink(allowed)?;
            save_document(&cli.file, view.snapshot())?;
            println!(
                "{}relinking {}",
                CHECK,
                if allowed { "allowed" } else { "forbidden" }
            );
        }
    }

    Ok(())
}
