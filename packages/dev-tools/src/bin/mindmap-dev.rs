//! Development CLI for MindMap project stores
//!
//! Inspects and edits a directory-backed project store from the terminal,
//! using the same storage functions and state container as the editor.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin mindmap-dev -- create "Trip Plan"
//! cargo run --bin mindmap-dev -- list
//! cargo run --bin mindmap-dev -- export-svg <id> > trip.svg
//! cargo run --bin mindmap-dev -- outline "Notes" notes.md
//! ```
//!
//! # Configuration
//!
//! - `MINDMAP_STORE_DIR` - store directory (default `.mindmap-store`)
//! - `MINDMAP_CONFIG` - JSON settings file (defaults apply when missing)
//! - `RUST_LOG` - log filter (default `mindmap_dev=info,mindmap_core=info`)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mindmap_core::config::load_config;
use mindmap_core::export::{export_json, generate_thumbnail, import_json, render_svg};
use mindmap_core::outline::outline_to_project;
use mindmap_core::{AppStore, FileStore, Project};

#[derive(Parser)]
#[command(name = "mindmap-dev")]
#[command(version = "0.1.0")]
#[command(about = "Inspect and edit a MindMap project store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the project store
    #[arg(long, global = true, env = "MINDMAP_STORE_DIR", default_value = ".mindmap-store")]
    store_dir: PathBuf,

    /// Settings file
    #[arg(long, global = true, env = "MINDMAP_CONFIG", default_value = "mindmap.json")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects, most recently updated first
    List,

    /// Create a project with a single root node
    Create {
        /// Project title (locale default when omitted)
        title: Option<String>,
    },

    /// Print a project's nodes and edges
    Show { id: String },

    Delete { id: String },

    /// Copy a project's nodes under a new id
    Duplicate { id: String },

    /// Print the project document as JSON
    ExportJson { id: String },

    /// Print the project rendered as SVG
    ExportSvg { id: String },

    /// Import an exported project file as a new project
    Import { file: PathBuf },

    /// Build a project from a markdown outline
    Outline { title: String, file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mindmap_dev=info,mindmap_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .await
        .with_context(|| format!("Failed to read settings from {}", cli.config.display()))?;
    let backend = FileStore::open_for_config(&cli.store_dir, &config)
        .with_context(|| format!("Failed to open store at {}", cli.store_dir.display()))?;
    tracing::debug!("Using store at {}", cli.store_dir.display());
    let store = AppStore::from_config(Arc::new(backend), config);

    match cli.command {
        Commands::List => cmd_list(&store),
        Commands::Create { title } => cmd_create(&store, title.as_deref()),
        Commands::Show { id } => cmd_show(&store, &id),
        Commands::Delete { id } => cmd_delete(&store, &id),
        Commands::Duplicate { id } => cmd_duplicate(&store, &id),
        Commands::ExportJson { id } => {
            let project = load(&store, &id)?;
            println!("{}", export_json(&project)?);
            Ok(())
        }
        Commands::ExportSvg { id } => {
            let project = load(&store, &id)?;
            print!("{}", render_svg(&project));
            Ok(())
        }
        Commands::Import { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let project = import_json(&text, store.storage().now())?;
            persist(&store, project)
        }
        Commands::Outline { title, file } => {
            let markdown = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let messages = store.storage().messages();
            let project = outline_to_project(&title, &markdown, messages, store.storage().now());
            persist(&store, project)
        }
    }
}

/// Surface the state container's error message when an action fails
fn action_failed(store: &AppStore) -> anyhow::Error {
    match store.state().error {
        Some(message) => anyhow!(message),
        None => anyhow!("Action failed"),
    }
}

fn load(store: &AppStore, id: &str) -> Result<Project> {
    Ok(store.load_project(id)?)
}

/// Save a new project with a fresh thumbnail and print its id
fn persist(store: &AppStore, mut project: Project) -> Result<()> {
    project.thumbnail = Some(generate_thumbnail(&project, store.storage().messages()));
    store.storage().save(&project)?;
    tracing::info!("Saved project {} ({} nodes)", project.id, project.nodes.len());
    println!("{}", project.id);
    Ok(())
}

fn cmd_list(store: &AppStore) -> Result<()> {
    store.load_projects();
    let state = store.state();
    if let Some(error) = state.error {
        return Err(anyhow!(error));
    }

    let messages = store.storage().messages();
    for project in &state.projects {
        println!(
            "{}  {}  {} {} {} {}  {}",
            project.id,
            project.updated_at.format("%Y-%m-%d %H:%M"),
            project.nodes.len(),
            messages.nodes_unit,
            project.edges.len(),
            messages.edges_unit,
            project.title
        );
    }
    Ok(())
}

fn cmd_create(store: &AppStore, title: Option<&str>) -> Result<()> {
    let project = store.create_project(title).ok_or_else(|| action_failed(store))?;
    println!("{}", project.id);
    Ok(())
}

fn cmd_show(store: &AppStore, id: &str) -> Result<()> {
    let project = load(store, id)?;

    println!("{} ({})", project.title, project.id);
    if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{}", description);
    }
    println!("created {}  updated {}", project.created_at, project.updated_at);
    println!();
    for node in &project.nodes {
        println!(
            "  [{}] {} \"{}\" at ({}, {})",
            node.node_type().as_str(),
            node.id,
            node.data.label,
            node.position.x,
            node.position.y
        );
    }
    for edge in &project.edges {
        println!("  {} -> {} ({})", edge.source, edge.target, edge.id);
    }
    let dangling = project.dangling_edges().count();
    if dangling > 0 {
        tracing::warn!("{} edges point at missing nodes", dangling);
    }
    Ok(())
}

fn cmd_delete(store: &AppStore, id: &str) -> Result<()> {
    store.delete_project(id);
    if let Some(error) = store.state().error {
        return Err(anyhow!(error));
    }
    tracing::info!("Deleted project {}", id);
    Ok(())
}

fn cmd_duplicate(store: &AppStore, id: &str) -> Result<()> {
    let original = load(store, id)?;
    let copy = store.storage().duplicate(&original);
    store.storage().save(&copy)?;
    println!("{}", copy.id);
    Ok(())
}
