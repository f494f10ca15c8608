//! `lemoncache` node binary.
//!
//! Runs one cache node: the peer endpoint under `/_lemoncache/`, plus an
//! optional front-end API listener (`/api?key=...`) for clients outside the
//! cluster. The demo group fronts a small in-process "slow" source so a
//! cluster can be exercised end to end:
//!
//! ```text
//! lemoncache-server --port 8001 &
//! lemoncache-server --port 8002 &
//! lemoncache-server --port 8003 --api &
//! curl "http://localhost:9999/api?key=Tom"
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use clap::Parser;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lemoncache_core::{Error, FnLoader, Group, Registry};
use lemoncache_server::HttpPool;

/// lemoncache node - one shard of a peer-to-peer cache cluster
#[derive(Parser, Debug)]
#[command(name = "lemoncache-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host this node binds and advertises
    #[arg(long, default_value = "localhost", env = "LEMONCACHE_HOST")]
    host: String,

    /// Port for the peer endpoint
    #[arg(short, long, default_value = "8001", env = "LEMONCACHE_PORT")]
    port: u16,

    /// Full peer set, this node included
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "http://localhost:8001,http://localhost:8002,http://localhost:8003",
        env = "LEMONCACHE_PEERS"
    )]
    peers: Vec<String>,

    /// Also start the front-end API listener
    #[arg(long, env = "LEMONCACHE_API")]
    api: bool,

    /// Address of the front-end API listener
    #[arg(long, default_value = "http://localhost:9999", env = "LEMONCACHE_API_ADDR")]
    api_addr: String,
}

fn demo_group() -> anyhow::Result<Group> {
    let db: HashMap<&str, &str> = HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]);
    let loader = FnLoader::new(move |key: &str| {
        tracing::info!(key, "slow source lookup");
        db.get(key)
            .map(|v| v.as_bytes().to_vec())
            .ok_or_else(|| Error::Loader(format!("{key} not exist")))
    });
    Ok(Group::new("scores", 2 << 10, Arc::new(loader))?)
}

#[derive(Deserialize)]
struct ApiParams {
    key: String,
}

/// Front-end lookup: raw value bytes, no envelope.
async fn api_get(State(group): State<Group>, Query(params): Query<ApiParams>) -> Response {
    match group.get(&params.key).await {
        Ok(view) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            view.to_vec(),
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let registry = Arc::new(Registry::new());
    let group = demo_group()?;
    registry.register(group.clone())?;

    let self_addr = format!("http://{}:{}", args.host, args.port);
    let pool = Arc::new(HttpPool::new(self_addr.clone(), Arc::clone(&registry)));
    pool.set_peers(args.peers.clone());
    group.register_peers(pool.clone())?;

    if args.api {
        let api_router = Router::new()
            .route("/api", get(api_get))
            .with_state(group.clone());
        let api_addr = args.api_addr.trim_start_matches("http://").to_owned();
        tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&api_addr)
                .await
                .expect("bind api listener");
            tracing::info!("front-end api listening on http://{api_addr}");
            axum::serve(listener, api_router).await.expect("api server");
        });
    }

    let app = pool.router().layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(self_addr.trim_start_matches("http://")).await?;
    tracing::info!("lemoncache node listening on {self_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
