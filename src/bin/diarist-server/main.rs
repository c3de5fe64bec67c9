use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, State};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info};
use uuid::Uuid;

mod metrics;

use diarist::opts::SUPPORTED_LANGUAGES;
use diarist::{AlignRequest, AlignResponse, Aligner, ServiceIdentity};

/// Annotation types this service consumes and produces, as named by the surrounding
/// document-annotation pipeline.
const INPUT_TYPES: &[&str] = &[
    "org.texttechnologylab.core.annotation.AudioWav",
    "org.texttechnologylab.core.annotation.Transcription",
];
const OUTPUT_TYPES: &[&str] = &[
    "org.texttechnologylab.core.annotation.RTTM",
    "org.texttechnologylab.core.annotation.Transcription",
];

#[derive(Parser, Debug)]
#[command(name = "diarist-server")]
#[command(about = "HTTP server for word-to-speaker alignment")]
struct Params {
    /// Host interface to bind to.
    #[arg(long = "host", default_value = "127.0.0.1")]
    host: String,

    /// TCP port to listen on.
    #[arg(long = "port", default_value_t = 8080)]
    port: u16,

    /// Maximum request body size (bytes).
    #[arg(long = "max-bytes", default_value_t = 100 * 1024 * 1024)]
    max_bytes: usize,

    /// Annotator name stamped into provenance output.
    #[arg(long = "annotator-name", default_value = "diarist")]
    annotator_name: String,
}

#[derive(Clone)]
struct AppState {
    aligner: Arc<Aligner>,
}

#[derive(Debug, Serialize)]
struct Capability {
    supported_languages: Vec<String>,
    reproducible: bool,
}

#[derive(Debug, Serialize)]
struct Documentation {
    annotator_name: String,
    version: String,
    implementation_lang: String,
    meta: BTreeMap<String, String>,
    parameters: BTreeMap<String, String>,
    capability: Capability,
}

#[derive(Debug, Serialize)]
struct InputOutput {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

#[tokio::main]
async fn main() {
    diarist::logging::init();

    if let Err(err) = run().await {
        error!(error = ?err, "diarist-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let params = Params::parse();

    metrics::init();

    let addr: SocketAddr = format!("{}:{}", params.host, params.port)
        .parse()
        .context("invalid host/port bind address")?;

    let identity = ServiceIdentity {
        name: params.annotator_name,
        version: env!("CARGO_PKG_VERSION").to_owned(),
    };
    info!(name = %identity.name, version = %identity.version, "starting annotator");

    let state = AppState {
        aligner: Arc::new(Aligner::new(identity)),
    };

    let app = Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/v1/documentation", get(documentation))
        .route("/v1/details/input_output", get(input_output))
        .route("/v1/process", post(process))
        .route_layer(from_fn(metrics::track_http_metrics))
        .with_state(state)
        .layer(DefaultBodyLimit::max(params.max_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        );

    let listener = TcpListener::bind(addr).await.context("bind failed")?;
    info!(%addr, "listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn root() -> &'static str {
    "diarist-server: POST /v1/process (JSON alignment request)"
}

async fn healthz() -> &'static str {
    "ok"
}

async fn documentation(State(state): State<AppState>) -> Json<Documentation> {
    let identity = state.aligner.identity();

    let mut meta = BTreeMap::new();
    meta.insert("crate".to_owned(), env!("CARGO_PKG_NAME").to_owned());
    meta.insert("crate_version".to_owned(), env!("CARGO_PKG_VERSION").to_owned());

    Json(Documentation {
        annotator_name: identity.name.clone(),
        version: identity.version.clone(),
        implementation_lang: "Rust".to_owned(),
        meta,
        parameters: BTreeMap::new(),
        capability: Capability {
            supported_languages: SUPPORTED_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            reproducible: true,
        },
    })
}

async fn input_output() -> Json<InputOutput> {
    Json(InputOutput {
        inputs: INPUT_TYPES.iter().map(|t| t.to_string()).collect(),
        outputs: OUTPUT_TYPES.iter().map(|t| t.to_string()).collect(),
    })
}

/// Run one alignment request.
///
/// Always answers 200 with a well-formed body: per-item failures are contained inside
/// the aligner, and a panicking worker yields an empty response instead of a fault.
async fn process(State(state): State<AppState>, Json(request): Json<AlignRequest>) -> Json<AlignResponse> {
    let request_id = Uuid::new_v4();
    info!(%request_id, items = request.items.len(), "processing alignment request");

    let aligner = state.aligner.clone();
    let outcome = tokio::task::spawn_blocking(move || aligner.process(&request)).await;

    match outcome {
        Ok(response) => {
            info!(%request_id, segments = response.segments.len(), "request done");
            Json(response)
        }
        Err(err) => {
            error!(%request_id, error = ?err, "alignment worker failed");
            Json(AlignResponse {
                segments: Vec::new(),
                modification_log: Vec::new(),
            })
        }
    }
}
