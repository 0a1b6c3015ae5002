use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::batch::{self, EmployeeFilter};
use crate::db::{EmployeeStore, TimesheetStore};
use crate::error::TimesheetError;
use crate::holiday::HolidayCalendar;
use crate::month::refresh_block_flags;
use crate::pdf::{PdfOptions, TimesheetPdf};
use crate::timesheet_data::{DayEdit, DayRecord, Employee, MonthlyTimesheet};

/// Header set by the upstream gateway after authentication.
pub const ACCOUNT_HEADER: &str = "x-account-id";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub employees: Arc<dyn EmployeeStore>,
    pub timesheets: Arc<dyn TimesheetStore>,
    pub holidays: Arc<HolidayCalendar>,
    pub pdf_options: Arc<PdfOptions>,
}

/// Single-employee request (generation and PDF)
#[derive(Deserialize)]
pub struct TimesheetRequest {
    pub employee_id: String,
    pub year: i32,
    pub month: u32,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub employee_ids: Vec<String>,
    pub year: i32,
    pub month: u32,
}

/// Error body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct BatchItemResponse {
    pub employee_id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timesheet: Option<MonthlyTimesheet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct BatchResponse {
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResponse>,
}

/// Handler error: status plus JSON `{ "error": ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<TimesheetError> for ApiError {
    fn from(e: TimesheetError) -> Self {
        let status = match &e {
            TimesheetError::InvalidMonth { .. } | TimesheetError::Validation(_) => StatusCode::BAD_REQUEST,
            TimesheetError::EmployeeNotFound(_) | TimesheetError::TimesheetNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %e, "request failed");
        }
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

fn account_id(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(ACCOUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "missing X-Account-Id header"))
}

/// Run store and rendering work off the async runtime (the MySQL driver blocks).
async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("worker failed: {}", e)))?
        .map_err(ApiError::from)
}

fn pdf_response(bytes: Vec<u8>, file_name: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// All routes with CORS, sharing one `AppState`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/employees", get(list_employees))
        .route("/api/timesheets", post(generate_timesheet))
        .route("/api/timesheets/batch", post(generate_timesheet_batch))
        .route("/api/timesheets/:employee_id/:year/:month", get(get_timesheet))
        .route("/api/timesheets/:employee_id/:year/:month/days/:day", put(update_day))
        .route("/api/pdf", post(generate_pdf))
        .route("/api/pdf/batch", post(generate_pdf_batch))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn run(port: u16, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    tracing::info!(port, "server listening");
    axum::serve(listener, app).await
}

async fn health_check() -> &'static str {
    "OK"
}

async fn list_employees(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<EmployeeFilter>,
) -> ApiResult<Json<Vec<Employee>>> {
    let account = account_id(&headers)?;
    let employees = blocking(move || {
        let roster = state.employees.list_employees(&account)?;
        Ok(filter.apply(&roster).into_iter().cloned().collect())
    })
    .await?;
    Ok(Json(employees))
}

async fn generate_timesheet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TimesheetRequest>,
) -> ApiResult<Json<MonthlyTimesheet>> {
    let account = account_id(&headers)?;
    let timesheet = blocking(move || {
        let employee = state.employees.get_employee(&account, &req.employee_id)?;
        batch::generate_single(&employee, req.year, req.month, &state.holidays, state.timesheets.as_ref())
    })
    .await?;
    Ok(Json(timesheet))
}

async fn generate_timesheet_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<BatchRequest>,
) -> ApiResult<Response> {
    let account = account_id(&headers)?;
    if req.employee_ids.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "no employees selected"));
    }

    let outcome = blocking(move || {
        let roster = state.employees.list_employees(&account)?;
        Ok(batch::generate_batch(
            &req.employee_ids,
            &roster,
            req.year,
            req.month,
            &state.holidays,
            state.timesheets.as_ref(),
        ))
    })
    .await?;

    let status = if outcome.is_success() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let succeeded = outcome.successes().count();
    let failed = outcome.failures().count();
    let results = outcome
        .items
        .into_iter()
        .map(|item| match item.result {
            Ok(timesheet) => BatchItemResponse {
                employee_id: item.employee_id,
                ok: true,
                timesheet: Some(timesheet),
                error: None,
            },
            Err(e) => BatchItemResponse {
                employee_id: item.employee_id,
                ok: false,
                timesheet: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    Ok((
        status,
        Json(BatchResponse {
            succeeded,
            failed,
            results,
        }),
    )
        .into_response())
}

async fn get_timesheet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((employee_id, year, month)): Path<(String, i32, u32)>,
) -> ApiResult<Json<MonthlyTimesheet>> {
    let account = account_id(&headers)?;
    let timesheet = blocking(move || {
        let employee = state.employees.get_employee(&account, &employee_id)?;
        batch::load_timesheet(&employee, year, month, &state.holidays, state.timesheets.as_ref())
    })
    .await?;
    Ok(Json(timesheet))
}

async fn update_day(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((employee_id, year, month, day)): Path<(String, i32, u32, u32)>,
    Json(edit): Json<DayEdit>,
) -> ApiResult<Json<DayRecord>> {
    let account = account_id(&headers)?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ApiError::new(StatusCode::BAD_REQUEST, format!("invalid date {}-{:02}-{:02}", year, month, day))
    })?;

    let record = blocking(move || {
        let employee = state.employees.get_employee(&account, &employee_id)?;
        let mut days = state.timesheets.load_month(&account, &employee_id, year, month)?;
        refresh_block_flags(&employee, &mut days, &state.holidays);

        let mut record = days
            .into_iter()
            .find(|d| d.date == date)
            .ok_or_else(|| TimesheetError::TimesheetNotFound {
                employee_id: employee_id.clone(),
                year,
                month,
            })?;
        let blocked = record.block_time_entry;
        edit.apply(&mut record);
        if blocked && record.has_punches() {
            return Err(TimesheetError::Validation(format!("time entry is blocked on {}", date)));
        }

        let mut stored = state.timesheets.update_day(&account, &employee_id, year, month, &record)?;
        stored.block_time_entry = blocked;
        Ok(stored)
    })
    .await?;
    Ok(Json(record))
}

async fn generate_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TimesheetRequest>,
) -> ApiResult<Response> {
    let account = account_id(&headers)?;
    let (bytes, file_name) = blocking(move || {
        let employee = state.employees.get_employee(&account, &req.employee_id)?;
        let timesheet = batch::load_timesheet(&employee, req.year, req.month, &state.holidays, state.timesheets.as_ref())?;

        let mut pdf = TimesheetPdf::new(&state.pdf_options)?;
        pdf.render(&timesheet)?;
        Ok((pdf.save_to_bytes()?, timesheet.file_name()))
    })
    .await?;
    Ok(pdf_response(bytes, &file_name))
}

async fn generate_pdf_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<BatchRequest>,
) -> ApiResult<Response> {
    let account = account_id(&headers)?;
    let (year, month) = (req.year, req.month);

    let bytes = blocking(move || {
        let mut timesheets = Vec::new();
        for employee_id in &req.employee_ids {
            let loaded = state
                .employees
                .get_employee(&account, employee_id)
                .and_then(|e| batch::load_timesheet(&e, year, month, &state.holidays, state.timesheets.as_ref()));
            match loaded {
                Ok(timesheet) => timesheets.push(timesheet),
                Err(e) => tracing::warn!(employee_id = %employee_id, error = %e, "skipping timesheet in pdf batch"),
            }
        }
        if timesheets.is_empty() {
            return Err(TimesheetError::Validation("no stored timesheets for the selection".to_string()));
        }

        let mut pdf = TimesheetPdf::new(&state.pdf_options)?;
        pdf.render_all(&timesheets)?;
        pdf.save_to_bytes()
    })
    .await?;
    Ok(pdf_response(bytes, &format!("folhas_ponto_{}_{:02}.pdf", year, month)))
}
