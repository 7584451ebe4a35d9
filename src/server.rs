use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;

use crate::cache::QueryParams;
use crate::domain::{GeneId, Species, VariantId, paths};
use crate::ensembl::EnsemblClient;
use crate::error::ProxyError;
use crate::fetch::Fetcher;
use crate::schema::{self, Schema};
use crate::shape::{self, ShapeError};
use crate::table::Record;
use crate::validate::{ValidationIssue, ValidationResult, validate};

pub struct AppState<C: EnsemblClient> {
    pub fetcher: Fetcher<C>,
}

pub fn build_router<C>(fetcher: Fetcher<C>) -> Router
where
    C: EnsemblClient + 'static,
{
    let state = Arc::new(AppState { fetcher });
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ensembl/gene-transcripts", get(gene_transcripts::<C>))
        .route("/ensembl/gene-annotation", get(gene_annotation::<C>))
        .route("/ensembl/variation", get(variation::<C>))
        .route("/ensembl/orthologs", get(orthologs::<C>))
        .with_state(state)
        .layer(middleware::from_fn(log_request))
}

pub async fn serve(router: Router, addr: SocketAddr) -> Result<(), ProxyError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ProxyError::Server(format!("failed to bind {addr}: {err}")))?;
    tracing::info!(%addr, "ensembl validator listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| ProxyError::Server(err.to_string()))?;
    tracing::info!("ensembl validator stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

async fn log_request(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let response = next.run(request).await;

    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
    tracing::info!(
        event = "request",
        %method,
        path,
        status = response.status().as_u16(),
        duration_ms = (duration_ms * 100.0).round() / 100.0,
        request_id = request_id.as_deref(),
        "request"
    );
    response
}

#[derive(Debug, Serialize)]
struct RootResponse {
    message: &'static str,
    endpoints: &'static str,
}

async fn root_handler() -> impl IntoResponse {
    Json(RootResponse {
        message: "Ensembl Validator API",
        endpoints: "/ensembl/gene-annotation, /ensembl/gene-transcripts, /ensembl/variation, /ensembl/orthologs",
    })
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
pub struct TranscriptsQuery {
    species: Option<String>,
    gene_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnnotationQuery {
    gene_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VariationQuery {
    species: Option<String>,
    variant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrthologsQuery {
    gene_id: Option<String>,
    target_species: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VariationResponse {
    pub summary: ValidationResult,
    pub mappings: ValidationResult,
}

async fn gene_transcripts<C: EnsemblClient + 'static>(
    State(state): State<Arc<AppState<C>>>,
    query: Result<Query<TranscriptsQuery>, QueryRejection>,
) -> Result<Json<ValidationResult>, ProxyError> {
    let Query(query) = query?;
    // lookup/id is species-agnostic; species is checked but not forwarded.
    let _species: Species = required("species", query.species)?.parse()?;
    let gene: GeneId = required("gene_id", query.gene_id)?.parse()?;
    let payload = state
        .fetcher
        .fetch(&paths::lookup(&gene), &QueryParams::new().with("expand", 1))
        .await?;
    Ok(Json(check(shape::transcripts(&payload), &schema::TRANSCRIPTS)))
}

async fn gene_annotation<C: EnsemblClient + 'static>(
    State(state): State<Arc<AppState<C>>>,
    query: Result<Query<AnnotationQuery>, QueryRejection>,
) -> Result<Json<ValidationResult>, ProxyError> {
    let Query(query) = query?;
    let gene: GeneId = required("gene_id", query.gene_id)?.parse()?;
    let payload = state
        .fetcher
        .fetch(&paths::lookup(&gene), &QueryParams::new())
        .await?;
    Ok(Json(check(
        shape::gene_annotation(&payload),
        &schema::GENE_ANNOTATION,
    )))
}

async fn variation<C: EnsemblClient + 'static>(
    State(state): State<Arc<AppState<C>>>,
    query: Result<Query<VariationQuery>, QueryRejection>,
) -> Result<Json<VariationResponse>, ProxyError> {
    let Query(query) = query?;
    let species: Species = required("species", query.species)?.parse()?;
    let variant: VariantId = required("variant_id", query.variant_id)?.parse()?;
    let payload = state
        .fetcher
        .fetch(&paths::variation(&species, &variant), &QueryParams::new())
        .await?;

    let response = match shape::variant(&payload) {
        Ok(tables) => VariationResponse {
            summary: validate(&tables.summary, &schema::VARIANT_SUMMARY),
            mappings: validate(&tables.mappings, &schema::VARIATION_MAPPINGS),
        },
        Err(err) => VariationResponse {
            summary: shape_failure(&schema::VARIANT_SUMMARY, &err),
            mappings: shape_failure(&schema::VARIATION_MAPPINGS, &err),
        },
    };
    Ok(Json(response))
}

async fn orthologs<C: EnsemblClient + 'static>(
    State(state): State<Arc<AppState<C>>>,
    query: Result<Query<OrthologsQuery>, QueryRejection>,
) -> Result<Json<ValidationResult>, ProxyError> {
    let Query(query) = query?;
    let gene: GeneId = required("gene_id", query.gene_id)?.parse()?;
    let target_species = query
        .target_species
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let payload = state
        .fetcher
        .fetch(
            &paths::homology(&gene),
            &QueryParams::new().with("type", "orthologues"),
        )
        .await?;
    let result = match shape::orthologs(&payload, target_species) {
        Ok(table) => {
            let mut result = validate(&table.rows, &schema::ORTHOLOGS);
            result.column_count = table.column_count;
            result
        }
        Err(err) => shape_failure(&schema::ORTHOLOGS, &err),
    };
    Ok(Json(result))
}

fn required(name: &'static str, value: Option<String>) -> Result<String, ProxyError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(ProxyError::MissingParameter(name))
}

fn check(shaped: Result<Vec<Record>, ShapeError>, schema: &Schema) -> ValidationResult {
    match shaped {
        Ok(records) => validate(&records, schema),
        Err(err) => shape_failure(schema, &err),
    }
}

fn shape_failure(schema: &Schema, err: &ShapeError) -> ValidationResult {
    tracing::warn!(schema = schema.name, error = %err, "upstream payload has unexpected shape");
    ValidationResult::from_issues(
        0,
        0,
        vec![ValidationIssue {
            schema: schema.name.to_string(),
            column: None,
            check: "shape".to_string(),
            index: None,
            failure_case: Value::Null,
            message: err.to_string(),
        }],
    )
}
