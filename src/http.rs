//! HTTP front end: upload a schedule CSV or workbook, download the calendar
//! CSV or a JSON report of what was converted.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{
        HeaderMap, HeaderName, HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use jiff::{Zoned, civil::Date};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::convert::{Conversion, Converter};
use crate::error::Error;
use crate::event::TIME_FORMAT;
use crate::export::events_to_bytes;
use crate::timetable::SessionKind;
use crate::workbook::{InputKind, read_input};

const FAILED_ROWS: HeaderName = HeaderName::from_static("x-failed-rows");

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
}

pub fn router(config: Config) -> Router {
    let state = AppState {
        config: Arc::new(config),
    };
    Router::new()
        .route("/health", get(health))
        .route("/timetable", get(timetable))
        .route("/convert", post(convert))
        .route("/convert/report", post(report))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(_) | Error::Config(_) => AppError::Internal(err.to_string()),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn timetable() -> Json<Value> {
    let table = |kind: SessionKind| {
        kind.slots()
            .iter()
            .zip(1..)
            .map(|(slot, period): (_, u8)| {
                json!({
                    "period": period,
                    "start": slot.start.strftime(TIME_FORMAT).to_string(),
                    "end": slot.end.strftime(TIME_FORMAT).to_string(),
                })
            })
            .collect::<Vec<_>>()
    };
    Json(json!({
        "lecture": table(SessionKind::Lecture),
        "practice": table(SessionKind::Practice),
    }))
}

#[derive(Debug, Deserialize)]
struct ConvertParams {
    today: Option<Date>,
    #[serde(default)]
    all: bool,
    /// Worksheet to read when the body is a workbook.
    sheet: Option<String>,
}

fn run(config: &Config, params: ConvertParams, body: &[u8]) -> Result<Conversion, AppError> {
    let mut format = config.input.clone();
    if params.sheet.is_some() {
        format.sheet = params.sheet;
    }
    let records = read_input(body, InputKind::sniff(body), &format)?;

    let converter = if params.all {
        Converter::all(config.expander())
    } else {
        let today = params.today.unwrap_or_else(|| Zoned::now().date());
        Converter::upcoming(config.expander(), today)
    };
    Ok(converter.convert(records))
}

async fn convert(
    State(state): State<AppState>,
    Query(params): Query<ConvertParams>,
    body: Bytes,
) -> Result<Response, AppError> {
    let config = &state.config;
    let conversion = run(config, params, &body)?;
    let csv = events_to_bytes(&conversion.events, config.bom)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"my_google.csv\""),
    );
    if !conversion.failures.is_empty() {
        let rows = conversion
            .failures
            .iter()
            .map(|failure| failure.row.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let value =
            HeaderValue::from_str(&rows).map_err(|err| AppError::Internal(err.to_string()))?;
        headers.insert(FAILED_ROWS, value);
    }

    Ok((headers, csv).into_response())
}

/// Same conversion as `/convert`, answered with the event count and every
/// skipped row alongside the reason it was skipped.
async fn report(
    State(state): State<AppState>,
    Query(params): Query<ConvertParams>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let conversion = run(&state.config, params, &body)?;
    let failures = conversion
        .failures
        .iter()
        .map(|failure| json!({ "row": failure.row, "error": failure.error.to_string() }))
        .collect::<Vec<_>>();
    Ok(Json(json!({
        "events": conversion.events.len(),
        "failures": failures,
    })))
}
