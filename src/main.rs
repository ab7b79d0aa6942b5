// Define data modules
mod error; // Error types and their HTTP mapping
mod logic; // Gap filling, library ranking, day stats
mod models; // Data structures (FixedEvent, ScheduledBlock, Db, etc.)
mod store; // In-memory state with optional JSON snapshot
mod suggest; // Task suggestions for gaps
mod time; // "HH:mm" <-> minutes
mod timeline; // Normalize, nest and gap-fill the day
mod validate; // Input checks for write handlers

mod routes_blocks; // HTTP handlers for scheduled blocks
mod routes_fixed; // HTTP handlers for fixed events
mod routes_library; // HTTP handlers for library, settings, suggestions
mod routes_timeline; // HTTP handlers for timeline & stats

#[cfg(test)]
mod test_support;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use clap::Parser;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::store::Store;
use crate::suggest::{LibrarySuggester, TaskSuggester};

#[derive(Parser, Debug)]
#[command(name = "day-planner", version)]
struct Args {
    /// Listen address (ip:port).
    #[arg(long, default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    /// JSON snapshot to load on start and rewrite after every change.
    /// Without it all state lives in memory only.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Directory with the static UI.
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,

    /// Seed sample fixed events, tasks and presets when no snapshot exists.
    #[arg(long)]
    starter_data: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub suggester: Arc<dyn TaskSuggester>,
}

fn api_router() -> Router<AppState> {
    Router::new()
        // timeline
        .route("/timeline", get(routes_timeline::get_timeline))
        .route("/stats", get(routes_timeline::get_stats))
        // fixed events
        .route(
            "/fixed-events",
            get(routes_fixed::get_fixed_events).post(routes_fixed::create_fixed_event),
        )
        .route(
            "/fixed-events/:id",
            put(routes_fixed::update_fixed_event).delete(routes_fixed::delete_fixed_event),
        )
        .route("/fixed-events/:id/toggle", post(routes_fixed::toggle_fixed_event))
        // blocks
        .route("/blocks", get(routes_blocks::get_blocks))
        .route("/blocks/fill", post(routes_blocks::fill_gap))
        .route("/blocks/:id", delete(routes_blocks::delete_block))
        .route("/blocks/:id/toggle", post(routes_blocks::toggle_block))
        .route("/blocks/:id/reflection", put(routes_blocks::put_reflection))
        // library
        .route(
            "/library/tasks",
            get(routes_library::get_tasks).post(routes_library::create_task),
        )
        .route(
            "/library/tasks/:id",
            put(routes_library::update_task).delete(routes_library::delete_task),
        )
        .route(
            "/library/presets",
            get(routes_library::get_presets).post(routes_library::create_preset),
        )
        .route(
            "/library/presets/:id",
            delete(routes_library::delete_preset),
        )
        .route("/suggest", post(routes_library::suggest))
        // settings
        .route(
            "/settings",
            get(routes_library::get_settings).put(routes_library::put_settings),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "day_planner=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let store = Store::open(args.snapshot.clone(), args.starter_data)
        .context("failed to open planner state")?;
    let state = AppState {
        store: Arc::new(store),
        suggester: Arc::new(LibrarySuggester),
    };

    let app = Router::new()
        .nest("/api", api_router())
        .fallback_service(ServeDir::new(&args.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("bind failed on {}", args.listen))?;

    info!("server running at http://{}", args.listen);
    info!("static files: {}", args.static_dir.display());
    match &args.snapshot {
        Some(path) => info!("snapshot: {}", path.display()),
        None => info!("snapshot: none, state is in memory only"),
    }

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
