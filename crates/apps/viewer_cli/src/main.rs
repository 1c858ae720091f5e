//! Headless driver for the expression viewer.
//!
//! Loads a dataset through the remote gene service, applies a selection the
//! way the UI would, and prints the resulting encoding, panel state or pick
//! result as JSON.
//!
//! ```bash
//! viewer_cli --prefix ob encode --gene Gad1
//! viewer_cli --prefix moe encode --gene Gad1 --gene Slc17a7 --mode 2
//! viewer_cli pick --gene Gad1 --x 640 --y 360
//! ```

mod config;
mod http_source;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use foundation::math::Vec2;
use formats::{ApiEndpoint, DatasetManifest};
use runtime::Metrics;
use scene::{HoverEvent, Viewport};
use serde_json::{Value, json};
use state::{AppStores, GeneMode, QueryParams, SelectedState};
use tracing::info;
use tracing_subscriber::EnvFilter;
use viewer::{Colorbars, PanelModel, ViewerSession};

use crate::config::Overrides;
use crate::http_source::HttpSource;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless single-cell expression viewer")]
struct Cli {
    /// Gene service base URL (env: EXPRSCOPE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Dataset prefix, e.g. `ob` or `moe` (env: EXPRSCOPE_PREFIX)
    #[arg(long)]
    prefix: Option<String>,

    /// Database name (env: EXPRSCOPE_DBNAME)
    #[arg(long)]
    dbname: Option<String>,

    /// Service user (env: EXPRSCOPE_USERNAME)
    #[arg(long)]
    username: Option<String>,

    /// Session manifest with prefix mapping, palette and reorder
    #[arg(long)]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, Default)]
struct Selection {
    /// Viewer URL query string to restore, e.g. `gene=%255B%2522Gad1%2522%255D&mode=1`
    #[arg(long)]
    query: Option<String>,

    /// Gene to show (repeat for two-gene mode)
    #[arg(long = "gene")]
    genes: Vec<String>,

    /// Cell type to highlight (repeatable)
    #[arg(long = "celltype")]
    celltypes: Vec<String>,

    /// Gene mode: 1 single, 2 multi
    #[arg(long)]
    mode: Option<u8>,

    /// Normalisation percentile on a 0..100 scale
    #[arg(long)]
    percentile: Option<f64>,

    /// Fixed normalisation ceiling for the first gene
    #[arg(long)]
    ceiling: Option<f64>,

    /// Dot size
    #[arg(long)]
    dot_size: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a selection and print attribute and panel summaries
    Encode {
        #[command(flatten)]
        selection: Selection,

        /// Include per-point colors, sizes and alphas
        #[arg(long)]
        buffers: bool,
    },

    /// Hover and click at a canvas position
    Pick {
        #[command(flatten)]
        selection: Selection,

        /// Cursor x in pixels
        #[arg(long)]
        x: f64,

        /// Cursor y in pixels
        #[arg(long)]
        y: f64,

        #[arg(long, default_value_t = 1280.0)]
        width: f64,

        #[arg(long, default_value_t = 720.0)]
        height: f64,
    },

    /// Resolve a dataset menu entry to its prefix and reset query
    SelectPrefix {
        /// Display name from the prefix menu
        name: String,
    },

    /// Print a manifest describing the current configuration
    Manifest,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let manifest = cli.manifest.as_deref().map(config::load_manifest).transpose()?;
    let overrides = Overrides {
        api_url: cli.api_url,
        prefix: cli.prefix,
        dbname: cli.dbname,
        username: cli.username,
    };
    let api = config::api_state(overrides, manifest.as_ref());
    info!(
        prefix = %api.prefix,
        dataset = api.display_name_for(&api.prefix),
        url = %api.base_url,
        "configured"
    );

    let output = match cli.command {
        Command::Encode { selection, buffers } => {
            let session = run_selection(api, &selection, Viewport::default()).await?;
            encode_report(&session, buffers)
        }
        Command::Pick {
            selection,
            x,
            y,
            width,
            height,
        } => {
            let mut session = run_selection(api, &selection, Viewport::new(width, height)).await?;
            pick_report(&mut session, Vec2::new(x, y))?
        }
        Command::SelectPrefix { name } => {
            let Some(change) = api.select_prefix(&name) else {
                bail!("no dataset named {name:?}");
            };
            json!({
                "prefix": change.prefix,
                "reload": change.reload,
                "query": change.query.to_query_string(),
            })
        }
        Command::Manifest => {
            let mut manifest = manifest.unwrap_or_else(|| DatasetManifest::new(api.prefix.clone()));
            manifest.prefix = api.prefix.clone();
            manifest.api = Some(ApiEndpoint {
                base_url: api.base_url.clone(),
                dbname: api.dbname.clone(),
                username: api.username.clone(),
            });
            println!("{}", manifest.to_json_pretty()?);
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Loads the dataset, applies the selection through the stores and lets the
/// session react.
async fn run_selection(
    api: state::ApiState,
    selection: &Selection,
    viewport: Viewport,
) -> anyhow::Result<ViewerSession> {
    let query = QueryParams::from_query_string(selection.query.as_deref().unwrap_or_default());
    let stores = AppStores::from_query(api, &query);
    let source = Arc::new(HttpSource::new(stores.api.get()));
    let mut session = ViewerSession::new(stores, source, viewport).with_query(query);
    session.load().await.context("loading dataset")?;

    let stores = session.stores_mut();
    if let Some(n) = selection.mode {
        let Some(mode) = GeneMode::from_number(f64::from(n)) else {
            bail!("mode must be 1 or 2, got {n}");
        };
        stores.selected.update(|s| s.update_mode(mode));
    }
    if !selection.celltypes.is_empty() {
        let celltypes = selection.celltypes.clone();
        stores.selected.update(|s| s.update_celltypes(celltypes));
    }
    if !selection.genes.is_empty() {
        let genes = selection.genes.clone();
        stores.selected.update(|s: &mut SelectedState| {
            if let Some(first) = genes.first() {
                s.update_single_gene(first.clone());
            }
            s.update_genes(genes);
        });
    }
    if let Some(percent) = selection.percentile {
        stores.button.update(|b| b.update_gene_percentile(percent));
    }
    if let Some(size) = selection.dot_size {
        stores.button.update(|b| b.update_dot_size(size));
    }
    session.sync().await.context("encoding selection")?;

    if let Some(ceiling) = selection.ceiling {
        session
            .stores_mut()
            .button
            .update(|b| b.update_current_gene_value(ceiling));
        session.sync().await.context("applying ceiling")?;
    }
    Ok(session)
}

fn panel_json(panels: &PanelModel) -> Value {
    let badge = |b: &viewer::Badge| json!({ "label": b.label, "color": b.color.map(|c| c.to_css()) });
    let colorbars = match &panels.colorbars {
        Colorbars::Hidden => json!("hidden"),
        Colorbars::Single(labels) => json!({ "single": [labels.min, labels.max] }),
        Colorbars::Dual { green, magenta } => json!({
            "green": [green.min, green.max],
            "magenta": [magenta.min, magenta.max],
        }),
    };
    json!({
        "gene_badges": panels.gene_badges.iter().map(badge).collect::<Vec<_>>(),
        "celltype_badges": panels.celltype_badges.iter().map(badge).collect::<Vec<_>>(),
        "colorbars": colorbars,
        "percentile_enabled": panels.percentile_enabled,
        "gene_slider": panels.gene_slider.map(|s| json!({ "min": s.min, "max": s.max, "value": s.value })),
        "dot_size": panels.dot_size,
    })
}

fn metrics_json(metrics: &Metrics) -> Value {
    let snapshot = metrics.snapshot();
    let counters: serde_json::Map<String, Value> =
        snapshot.counters.into_iter().map(|(k, v)| (k, json!(v))).collect();
    let gauges: serde_json::Map<String, Value> = snapshot.gauges.into_iter().map(|(k, v)| (k, json!(v))).collect();
    let histograms: serde_json::Map<String, Value> = snapshot
        .histograms
        .into_iter()
        .map(|(k, h)| (k, json!({ "count": h.count, "sum": h.sum, "min": h.min, "max": h.max })))
        .collect();
    json!({ "counters": counters, "gauges": gauges, "histograms": histograms })
}

fn encode_report(session: &ViewerSession, buffers: bool) -> Value {
    let Some(scene) = session.scene() else {
        return Value::Null;
    };
    let layer = scene.cloud().main();
    let visible = (0..layer.len()).filter(|&i| layer.is_visible(i)).count();
    let mut report = json!({
        "prefix": session.stores().api.get().prefix,
        "points": layer.len(),
        "visible": visible,
        "showing": format!("{:?}", session.stores().selected.get().showing),
        "range": session.last_range().map(|r| json!({
            "min": r.min_value,
            "current": r.current,
            "max": r.max,
            "second_max": r.second_max,
        })),
        "query": session.query().to_query_string(),
        "panels": panel_json(&session.panels()),
        "events": session.events().kinds(),
        "metrics": {
            "session": metrics_json(session.metrics()),
            "scene": metrics_json(scene.metrics()),
        },
    });
    if buffers {
        report["buffers"] = json!({
            "colors": layer.colors.iter().map(|c| foundation::Rgb8::from_unit(*c).to_hex()).collect::<Vec<_>>(),
            "sizes": layer.sizes,
            "alphas": layer.alphas,
        });
    }
    report
}

fn pick_report(session: &mut ViewerSession, cursor_px: Vec2) -> anyhow::Result<Value> {
    let Some(scene) = session.scene_mut() else {
        bail!("no scene loaded");
    };
    scene.pointer_moved(cursor_px);
    let event = scene.tick(1.0 / 60.0);
    let tooltip = match &event {
        Some(HoverEvent::Entered { tooltip: Some(t), .. }) => {
            json!({ "x": t.x, "y": t.y, "label": t.label, "color": t.color.to_hex() })
        }
        _ => Value::Null,
    };
    let index = scene.hover().hovered();
    let size_px = index.and_then(|i| scene.point_size_px(i));
    Ok(json!({
        "hovered": index,
        "tooltip": tooltip,
        "clicked": scene.click(),
        "point_size_px": size_px,
        "camera": {
            "position": [scene.camera().position.x, scene.camera().position.y, scene.camera().position.z],
        },
    }))
}
