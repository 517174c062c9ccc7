use crate::config::Config;
use crate::errors::AppError;
use crate::filters::{LeadFilter, PageFilter, StatusFilter};
use crate::models::{BatchDeleteRequest, BulkResult, Lead, NewLead};
use crate::storage::LeadStorage;
use crate::viacep::{CepEndereco, ViaCepService};
use crate::{export, filters, geo, import, stats};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use moka::future::Cache;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
    /// Client for the ViaCEP postal-code API.
    pub viacep: ViaCepService,
    /// CEP lookup cache (24h TTL). Key: "cep:{cep}", value: checksummed JSON.
    pub cep_cache: Cache<String, String>,
}

impl AppState {
    fn storage(&self) -> LeadStorage {
        LeadStorage::new(self.db.clone())
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "aghora-leads-api",
            "version": "0.1.0"
        })),
    )
}

/// Query parameters shared by the listing, export and chart endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LeadListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<StatusFilter>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub page: Option<PageFilter>,
}

impl LeadListParams {
    fn to_filter(&self) -> LeadFilter {
        LeadFilter {
            search_term: self.search.clone().unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            estado: self.estado.clone(),
            page: self.page.unwrap_or_default(),
        }
    }
}

/// GET /api/v1/leads
///
/// Filtered lead listing. Result order follows storage order, except on the
/// open-leads page where hot leads float to the top.
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeadListParams>,
) -> Result<Json<Vec<Lead>>, AppError> {
    tracing::info!("GET /leads - params: {:?}", params);

    let leads = state.storage().list_all().await?;
    let mut filtered = params.to_filter().apply(leads);
    if params.page == Some(PageFilter::Leads) {
        filters::sort_quentes_first(&mut filtered);
    }
    Ok(Json(filtered))
}

/// GET /api/v1/leads/:id
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Lead>, AppError> {
    let lead = state
        .storage()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead with id {} not found", id)))?;
    Ok(Json(lead))
}

/// POST /api/v1/leads
///
/// Creates a lead. Validation failures reject the request before anything
/// reaches the database.
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewLead>,
) -> Result<(StatusCode, Json<Lead>), AppError> {
    new.validate()?;
    let lead = state.storage().insert(new).await?;
    tracing::info!("Lead {} created", lead.id);
    Ok((StatusCode::CREATED, Json(lead)))
}

/// PUT /api/v1/leads/:id
///
/// Full-field replace; last write wins.
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(new): Json<NewLead>,
) -> Result<Json<Lead>, AppError> {
    new.validate()?;
    let lead = state
        .storage()
        .update(id, new)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead with id {} not found", id)))?;
    tracing::info!("Lead {} updated", id);
    Ok(Json(lead))
}

/// DELETE /api/v1/leads/:id
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.storage().delete(id).await? {
        return Err(AppError::NotFound(format!("Lead with id {} not found", id)));
    }
    tracing::info!("Lead {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/leads/batch-delete
///
/// Deletes the given ids in one statement; the call either applies as a
/// whole or fails as a whole.
pub async fn batch_delete_leads(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchDeleteRequest>,
) -> Result<Json<BulkResult>, AppError> {
    if request.ids.is_empty() {
        return Err(AppError::BadRequest("No ids provided".to_string()));
    }
    let affected = state.storage().delete_many(&request.ids).await?;
    tracing::info!("Batch delete removed {} leads", affected);
    Ok(Json(BulkResult { affected }))
}

/// POST /api/v1/leads/import
///
/// CSV import. The whole file is parsed before anything is inserted and
/// the insert runs in one transaction, so there is no partial import.
pub async fn import_leads(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<(StatusCode, Json<BulkResult>), AppError> {
    let leads = import::parse_csv(body.as_bytes())?;
    let affected = state.storage().insert_many(&leads).await?;
    tracing::info!("Imported {} leads", affected);
    Ok((StatusCode::CREATED, Json(BulkResult { affected })))
}

/// Query parameters of the CSV export: the usual filters plus a
/// comma-separated field exclusion list.
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<StatusFilter>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub page: Option<PageFilter>,
    #[serde(default)]
    pub exclude: Option<String>,
}

impl ExportParams {
    fn to_filter(&self) -> LeadFilter {
        LeadFilter {
            search_term: self.search.clone().unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            estado: self.estado.clone(),
            page: self.page.unwrap_or_default(),
        }
    }

    fn excluded_fields(&self) -> Vec<String> {
        self.exclude
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// GET /api/v1/leads/export/csv
pub async fn export_leads_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, AppError> {
    let leads = state.storage().list_all().await?;
    let filtered = params.to_filter().apply(leads);
    let bytes = export::leads_to_csv(&filtered, &params.excluded_fields())?;
    tracing::info!("Exported {} leads as CSV", filtered.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leads.csv\"",
            ),
        ],
        bytes,
    ))
}

/// GET /api/v1/leads/export/pdf
pub async fn export_leads_pdf(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, AppError> {
    let leads = state.storage().list_all().await?;
    let filtered = params.to_filter().apply(leads);
    let bytes = export::leads_to_pdf(&filtered, &state.config.fonts_dir)?;
    tracing::info!("Exported {} leads as PDF", filtered.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"lista-leads.pdf\"",
            ),
        ],
        bytes,
    ))
}

/// GET /api/v1/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<crate::models::DashboardStats>, AppError> {
    let leads = state.storage().list_all().await?;
    Ok(Json(stats::aggregate(&leads)))
}

/// GET /api/v1/dashboard/charts/estados
pub async fn dashboard_chart_estados(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<stats::EstadoChartEntry>>, AppError> {
    let leads = state.storage().list_all().await?;
    Ok(Json(stats::estados_chart(&leads)))
}

/// GET /api/v1/dashboard/charts/regioes
pub async fn dashboard_chart_regioes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<stats::RegiaoChartEntry>>, AppError> {
    let leads = state.storage().list_all().await?;
    Ok(Json(stats::regioes_chart(&leads)))
}

/// GET /api/v1/dashboard/export/pdf
pub async fn export_dashboard_pdf(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let leads = state.storage().list_all().await?;
    let summary = stats::aggregate(&leads);
    let bytes = export::dashboard_to_pdf(&summary, &state.config.fonts_dir)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"dashboard.pdf\"",
            ),
        ],
        bytes,
    ))
}

/// GET /api/v1/map/markers
///
/// Lead markers with synthetic coordinates.
pub async fn map_markers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<geo::MapMarker>>, AppError> {
    let leads = state.storage().list_all().await?;
    Ok(Json(geo::markers(&leads)))
}

/// GET /api/v1/cep/:cep
///
/// Address prefill via ViaCEP, cache-first. Cached entries carry a checksum
/// and are refetched when validation fails.
pub async fn lookup_cep(
    State(state): State<Arc<AppState>>,
    Path(cep): Path<String>,
) -> Result<Json<CepEndereco>, AppError> {
    let clean: String = cep.chars().filter(|c| c.is_ascii_digit()).collect();
    if clean.len() != 8 {
        return Err(AppError::BadRequest(format!(
            "CEP must have exactly 8 digits, got '{}'",
            cep
        )));
    }

    let cache_key = format!("cep:{}", clean);

    // Check cache first with validation
    if let Some(cached) = state.cep_cache.get(&cache_key).await {
        if let Some(valid_data) =
            crate::cache_validator::ValidatedCacheEntry::deserialize_and_validate(&cached)
        {
            if let Ok(endereco) = serde_json::from_str::<CepEndereco>(&valid_data) {
                tracing::debug!("CEP cache HIT (validated) for {}", clean);
                return Ok(Json(endereco));
            }
        } else {
            tracing::warn!("Cache validation failed for {}, refetching from ViaCEP", clean);
        }
    }

    tracing::info!("CEP cache MISS - looking up {}", clean);
    let endereco = state.viacep.lookup(&clean).await?;

    // Cache successful response with checksum validation
    if let Ok(json_str) = serde_json::to_string(&endereco) {
        let validated_entry = crate::cache_validator::ValidatedCacheEntry::new(json_str);
        state
            .cep_cache
            .insert(cache_key, validated_entry.serialize())
            .await;
    }

    Ok(Json(endereco))
}
