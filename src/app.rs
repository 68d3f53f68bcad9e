#![cfg(feature = "web")]
//! HTTP surface of the dashboard.
//!
//! Every request is an event applied to the caller's [`Session`]; the page is
//! rendered from the resulting selection. The auto-advance timer runs as its
//! own task and only touches the session store, so no request ever waits on it.

use axum::{
    Form, Json, Router,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use handlebars::Handlebars;
use log::{debug, info, warn};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;

use crate::cache::DatasetCache;
use crate::config::DashboardConfig;
use crate::dataset::Dataset;
use crate::downloader;
use crate::error::{DashboardError, Result};
use crate::graph::{ChartOptions, achievement_chart};
use crate::selector::seller_count;
use crate::session::{SESSION_COOKIE, Session, SessionStore};
use crate::view::DashboardView;

const PAGE_TEMPLATE: &str = "dashboard";
const TICK: Duration = Duration::from_secs(1);
const EVICT_EVERY_TICKS: u64 = 60;

/// Shared server state: the memoized dataset, the sessions and the page template.
pub struct AppState {
    pub cache: DatasetCache,
    pub sessions: SessionStore,
    templates: Handlebars<'static>,
    chart: ChartOptions,
}

#[derive(Deserialize)]
struct BranchForm {
    branch: String,
}

impl AppState {
    pub fn new(cache: DatasetCache, sessions: SessionStore) -> Result<Self> {
        let mut templates = Handlebars::new();
        templates
            .register_template_string(PAGE_TEMPLATE, include_str!("./static/dashboard.hbs"))
            .map_err(|e| DashboardError::Template(e.to_string()))?;

        Ok(AppState {
            cache,
            sessions,
            templates,
            chart: ChartOptions::default(),
        })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        Self::new(
            DatasetCache::new(config.data_path.clone(), config.sheet.clone()),
            SessionStore::new(config.advance_interval(), config.session_ttl()),
        )
    }

    fn view_for(&self, data: &Result<Arc<Dataset>>, session: &Session) -> DashboardView {
        match data {
            Ok(data) => DashboardView::build(data, session.branch.as_deref(), session.cursor),
            Err(e) => DashboardView::failed(e),
        }
    }

    fn render_page(&self, view: &DashboardView, session: &Session) -> Result<String> {
        let refresh_secs = session
            .next_advance_at
            .saturating_duration_since(Instant::now())
            .as_secs()
            + 1;
        let context = serde_json::json!({
            "view": view,
            "refresh_secs": refresh_secs,
            "chart_url": format!("/chart.svg?v={}", chrono::Local::now().timestamp_millis()),
        });
        self.templates
            .render(PAGE_TEMPLATE, &context)
            .map_err(|e| DashboardError::Template(e.to_string()))
    }
}

/// Starts the dashboard server and the auto-advance timer.
///
/// # Arguments
/// * `config` - Data file, listen address and timing settings
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Returns when the server stops
pub async fn run(config: DashboardConfig) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::from_config(&config)?);

    // Read the file once up front so a bad path shows in the log at startup
    if let Err(e) = load_dataset(&state).await {
        warn!("Sales data not available yet: {}", e);
    }

    let _ticker = spawn_auto_advance(Arc::clone(&state));
    let app = router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the router with all dashboard routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/branch", post(select_branch))
        .route("/next", post(next_seller))
        .route("/chart.svg", get(chart_svg))
        .route("/export.csv", get(export_csv))
        .route("/export.xlsx", get(export_xlsx))
        .route("/api/view", get(view_json))
        .route("/api/reload", post(reload_data))
        .route("/health", get(|| async { "ok" }))
        .nest_service("/static", ServeDir::new("static"))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Spawns the timer that moves due sessions to their next seller.
///
/// Runs once per second; sessions carry their own deadline, so each one
/// advances a full interval after its last render-changing event.
pub fn spawn_auto_advance(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(TICK);
        let mut ticks: u64 = 0;
        loop {
            ticker.tick().await;
            ticks += 1;
            advance_tick(&state, Instant::now());
            if ticks % EVICT_EVERY_TICKS == 0 {
                let dropped = state.sessions.evict_expired(Instant::now());
                if dropped > 0 {
                    debug!("Evicted {} expired sessions", dropped);
                }
            }
        }
    })
}

/// One timer step. Only a dataset that is already cached is consulted; the
/// timer never triggers a file read.
pub fn advance_tick(state: &AppState, now: Instant) -> usize {
    let data = state.cache.peek();
    state.sessions.advance_due(now, |branch| {
        data.as_deref().map(|d| seller_count(d, branch)).unwrap_or(0)
    })
}

async fn load_dataset(state: &Arc<AppState>) -> Result<Arc<Dataset>> {
    let worker = Arc::clone(state);
    let path = state.cache.path().to_path_buf();
    tokio::task::spawn_blocking(move || worker.cache.get())
        .await
        .map_err(|e| DashboardError::load(path, e))?
}

fn session_cookie(id: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Looks up (or starts) the caller's session and makes sure the cookie is set.
fn open_session(state: &AppState, jar: CookieJar) -> (CookieJar, Session) {
    let id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let session = state.sessions.resolve(id.as_deref(), Instant::now());
    if id.as_deref() == Some(session.id.as_str()) {
        (jar, session)
    } else {
        let jar = jar.add(session_cookie(&session.id));
        (jar, session)
    }
}

async fn dashboard_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, session) = open_session(&state, jar);
    let data = load_dataset(&state).await;
    let view = state.view_for(&data, &session);

    match state.render_page(&view, &session) {
        Ok(html) => (jar, Html(html)).into_response(),
        Err(e) => (jar, (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())).into_response(),
    }
}

async fn select_branch(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<BranchForm>,
) -> Response {
    let (jar, session) = open_session(&state, jar);

    if let Ok(data) = load_dataset(&state).await {
        if !data.has_branch(&form.branch) {
            let err = DashboardError::UnknownBranch(form.branch);
            return (jar, (StatusCode::BAD_REQUEST, err.to_string())).into_response();
        }
    }

    state
        .sessions
        .select_branch(&session.id, form.branch, Instant::now());
    (jar, Redirect::to("/")).into_response()
}

async fn next_seller(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, session) = open_session(&state, jar);
    let count = match load_dataset(&state).await {
        Ok(data) => seller_count(&data, session.branch.as_deref()),
        Err(_) => 0,
    };

    state.sessions.advance(&session.id, count, Instant::now());
    (jar, Redirect::to("/")).into_response()
}

async fn view_json(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, session) = open_session(&state, jar);
    let data = load_dataset(&state).await;
    (jar, Json(state.view_for(&data, &session))).into_response()
}

async fn chart_svg(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, session) = open_session(&state, jar);
    let data = load_dataset(&state).await;
    let view = state.view_for(&data, &session);

    let Some(table) = view.table() else {
        return (jar, (StatusCode::NOT_FOUND, "No seller selected")).into_response();
    };

    match achievement_chart(&table.chart, &state.chart) {
        Ok(svg) => (
            jar,
            [
                (header::CONTENT_TYPE, "image/svg+xml"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            svg,
        )
            .into_response(),
        Err(e) => (jar, (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())).into_response(),
    }
}

async fn export_csv(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    export(state, jar, "csv", "text/csv; charset=utf-8", |table| {
        downloader::to_csv(table).map(String::into_bytes)
    })
    .await
}

async fn export_xlsx(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    export(
        state,
        jar,
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        downloader::to_xlsx,
    )
    .await
}

async fn export<F>(
    state: Arc<AppState>,
    jar: CookieJar,
    extension: &str,
    content_type: &'static str,
    encode: F,
) -> Response
where
    F: FnOnce(&crate::format::SellerTable) -> Result<Vec<u8>>,
{
    let (jar, session) = open_session(&state, jar);
    let data = load_dataset(&state).await;
    let view = state.view_for(&data, &session);

    let Some(table) = view.table() else {
        return (jar, (StatusCode::NOT_FOUND, "No seller selected")).into_response();
    };

    match encode(table) {
        Ok(bytes) => {
            let file_name = downloader::export_file_name(&table.seller, extension);
            let disposition = format!(
                "attachment; filename*=UTF-8''{}",
                urlencoding::encode(&file_name)
            );
            (
                jar,
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => (jar, (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())).into_response(),
    }
}

async fn reload_data(State(state): State<Arc<AppState>>) -> Response {
    state.cache.invalidate();
    match load_dataset(&state).await {
        Ok(data) => Json(serde_json::json!({
            "status": "ok",
            "rows": data.len(),
            "branches": data.branches().len(),
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "status": "error", "message": e.to_string() })),
        )
            .into_response(),
    }
}

// Simple request logger
async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    info!(
        "{} {} {} {}ms",
        response.status().as_u16(),
        method,
        path,
        start.elapsed().as_millis()
    );
    response
}
