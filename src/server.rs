/// HTTP server exposing collection views and attendance submission
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use log::{info, warn};
use std::sync::Arc;

use crate::aggregate::compute_aggregates;
use crate::attendance::{AttendanceSubmission, AttendanceSummary};
use crate::config::ServerConfig;
use crate::messages::{CollectionBody, ErrorBody, SubmissionReceipt, ViewRequest, ViewResponse};
use crate::preferences::Preferences;
use crate::record::Collection;
use crate::source::{CollectionKind, DataSource, SourceError};
use crate::view::TabularViewEngine;

/// Shared state for all workers
pub struct AppState {
    pub source: Arc<dyn DataSource>,
    pub preferences: &'static Preferences,
}

impl AppState {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        AppState {
            source,
            preferences: Preferences::global(),
        }
    }
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorBody::new(message))
}

fn parse_kind(raw: &str) -> Result<CollectionKind, HttpResponse> {
    CollectionKind::parse(raw).ok_or_else(|| {
        HttpResponse::NotFound().json(ErrorBody::new(format!("unknown collection '{}'", raw)))
    })
}

/// Fetch off the async workers; sources may do file I/O.
async fn load(state: &AppState, kind: CollectionKind) -> Result<Collection, HttpResponse> {
    let source = Arc::clone(&state.source);
    match web::block(move || source.fetch(kind)).await {
        Ok(Ok(collection)) => Ok(collection),
        Ok(Err(SourceError::NotFound(kind))) => Err(HttpResponse::NotFound()
            .json(ErrorBody::new(format!("collection '{}' not found", kind)))),
        Ok(Err(e)) => {
            warn!("data source failed: {}", e);
            Err(HttpResponse::InternalServerError().json(ErrorBody::new(e.to_string())))
        }
        Err(e) => Err(HttpResponse::InternalServerError().json(ErrorBody::new(e.to_string()))),
    }
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "attendview server is running"
    }))
}

async fn get_collection(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let kind = match parse_kind(&path) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };
    match load(&state, kind).await {
        Ok(collection) => HttpResponse::Ok().json(CollectionBody {
            name: collection.name().to_string(),
            fields: collection.schema().field_names().into_iter().map(String::from).collect(),
            rows: collection.records().to_vec(),
        }),
        Err(resp) => resp,
    }
}

async fn view_collection(
    path: web::Path<String>,
    body: web::Json<ViewRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let kind = match parse_kind(&path) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };
    let request = body.into_inner();
    let predicates = match request.predicates() {
        Ok(p) => p,
        Err(e) => return bad_request(e),
    };
    let specs = match request.aggregate_specs() {
        Ok(s) => s,
        Err(e) => return bad_request(e),
    };
    let collection = match load(&state, kind).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let engine = match &request.searchable_fields {
        Some(fields) => TabularViewEngine::new(fields.iter().cloned()),
        None => TabularViewEngine::new(kind.searchable_fields().iter().copied()),
    };
    let view = engine.apply_view(
        collection.records(),
        &request.query,
        &predicates,
        request.sort.as_ref(),
    );
    let aggregates = compute_aggregates(&view.rows, &specs);
    let population = compute_aggregates(collection.records(), &specs);

    HttpResponse::Ok().json(ViewResponse {
        rows: view.rows,
        total_count: view.total_count,
        filtered_count: view.filtered_count,
        aggregates,
        population,
    })
}

async fn submit_attendance(
    body: web::Json<AttendanceSubmission>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let submission = body.into_inner();
    let students = match load(&state, CollectionKind::Students).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    if let Err(e) = submission.validate(&students) {
        return bad_request(e);
    }

    let marked: Vec<_> = students
        .records()
        .iter()
        .map(|r| {
            let present = r.id().map_or(false, |id| submission.present.iter().any(|p| p == id));
            r.clone().with(crate::attendance::PRESENT_FIELD, present)
        })
        .collect();
    let summary = AttendanceSummary::from_flags(&marked);
    info!(
        "attendance recorded: course={} date={} present={}/{}",
        submission.course, submission.date, summary.present, summary.total
    );

    HttpResponse::Ok().json(SubmissionReceipt {
        course: submission.course,
        date: submission.date,
        present: summary.present,
        absent: summary.absent,
        percentage: summary.percentage,
    })
}

async fn get_preferences(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.preferences.snapshot())
}

async fn toggle_theme(state: web::Data<AppState>) -> HttpResponse {
    state.preferences.toggle_theme();
    HttpResponse::Ok().json(state.preferences.snapshot())
}

/// Register all routes; shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/api/collections/{kind}", web::get().to(get_collection))
        .route("/api/collections/{kind}/view", web::post().to(view_collection))
        .route("/api/attendance", web::post().to(submit_attendance))
        .route("/api/preferences", web::get().to(get_preferences))
        .route("/api/preferences/theme/toggle", web::post().to(toggle_theme));
}

/// Start the HTTP server
pub async fn run_server(config: &ServerConfig, source: Arc<dyn DataSource>) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(source));

    info!("attendview listening on http://{}:{}", config.host, config.port);
    match &config.data_dir {
        Some(dir) => info!("serving collections from {}", dir.display()),
        None => info!("serving built-in demo collections"),
    }

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            // CORS for the browser UI during development
            .wrap(
                actix_cors::Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
