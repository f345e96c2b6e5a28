//! REST API endpoints.
//!
//! Every response uses the same envelope: `{"success": true, "data": ...}` on
//! success and `{"success": false, "message": ..., "errors": [...]}` on
//! failure, where `errors` is present only for field validation failures.
//!
//! The generated routes are:
//!
//! - `GET /api/form-config` - configuration with active form types only
//! - `POST /api/form-config/submit` - validate and accept a filled form
//! - `GET /health` - liveness
//!
//! and, behind the admin token:
//!
//! - `GET /api/form-config/admin` - full configuration
//! - `PUT /api/form-config/{id}` - update global display text
//! - `POST /api/form-config/{id}/form-types` - add a form type
//! - `PUT /api/form-config/{id}/form-types/{ft_id}` - patch a form type
//! - `DELETE /api/form-config/{id}/form-types/{ft_id}` - delete a form type
//! - `POST /api/form-config/{id}/form-types/{ft_id}/toggle` - flip `isActive`
//! - `POST /api/form-config/{id}/form-types/{ft_id}/move` - reorder a form type
//! - `POST /api/form-config/{id}/form-types/{ft_id}/fields` - add a field
//! - `PUT /api/form-config/{id}/form-types/{ft_id}/fields/{index}` - replace a field
//! - `DELETE /api/form-config/{id}/form-types/{ft_id}/fields/{index}` - delete a field
//! - `POST /api/form-config/{id}/form-types/{ft_id}/fields/{index}/move` - reorder a field
//!
//! Write routes honour an optional `If-Match: <version>` header; a stale
//! version is rejected with 409.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use formconfig_admin::editor::{self, FormTypePatch, FormTypeSpec, MoveDirection, SettingsPatch};
use formconfig_admin::store::{apply, ConfigStore};
use formconfig_core::logging::submission_span;
use formconfig_core::{FormConfigError, FormConfigResult};
use formconfig_forms::validation::unknown_keys;
use formconfig_forms::value::retain_known_fields;
use formconfig_forms::{validate_form, Field, FormConfiguration, Submission};
use http::header::IF_MATCH;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::Instrument;

use crate::auth::require_admin_token;
use crate::sink::{SubmissionRecord, SubmissionSink};

/// Shared state for the handlers.
pub struct AppState {
    /// Where the configuration lives.
    pub store: Arc<dyn ConfigStore>,
    /// Where accepted submissions go.
    pub sink: Arc<dyn SubmissionSink>,
    /// Bearer token required on write routes; `None` leaves them open.
    pub admin_token: Option<String>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

/// A [`FormConfigError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub FormConfigError);

impl From<FormConfigError> for ApiError {
    fn from(err: FormConfigError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = match &self.0 {
            FormConfigError::FieldValidation(errors) => json!({
                "success": false,
                "message": "Please correct the highlighted fields",
                "errors": errors,
            }),
            other => json!({
                "success": false,
                "message": public_message(other),
            }),
        };
        (status, Json(body)).into_response()
    }
}

/// The text shown to the caller. Request-level errors carry a sentence meant
/// for users, so the variant prefix is dropped.
fn public_message(err: &FormConfigError) -> String {
    match err {
        FormConfigError::NotFound(message)
        | FormConfigError::Conflict(message)
        | FormConfigError::Unauthorized(message)
        | FormConfigError::BadRequest(message) => message.clone(),
        other => other.to_string(),
    }
}

type ApiResult = Result<Response, ApiError>;

/// The body of a "move" request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveRequest {
    /// `"up"` or `"down"`.
    pub direction: MoveDirection,
}

/// Builds the API router over `state`.
pub fn api_router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/api/form-config/admin", get(handle_admin_config))
        .route("/api/form-config/{id}", put(handle_update_settings))
        .route("/api/form-config/{id}/form-types", post(handle_add_form_type))
        .route(
            "/api/form-config/{id}/form-types/{ft_id}",
            put(handle_update_form_type).delete(handle_delete_form_type),
        )
        .route(
            "/api/form-config/{id}/form-types/{ft_id}/toggle",
            post(handle_toggle_form_type),
        )
        .route(
            "/api/form-config/{id}/form-types/{ft_id}/move",
            post(handle_move_form_type),
        )
        .route(
            "/api/form-config/{id}/form-types/{ft_id}/fields",
            post(handle_add_field),
        )
        .route(
            "/api/form-config/{id}/form-types/{ft_id}/fields/{index}",
            put(handle_update_field).delete(handle_delete_field),
        )
        .route(
            "/api/form-config/{id}/form-types/{ft_id}/fields/{index}/move",
            post(handle_move_field),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin_token,
        ));

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/form-config", get(handle_public_config))
        .route("/api/form-config/submit", post(handle_submit))
        .merge(admin)
        .with_state(state)
}

// ── Envelope helpers ───────────────────────────────────────────────

fn ok<T: Serialize>(data: &T) -> Response {
    Json(json!({"success": true, "data": data})).into_response()
}

fn ok_versioned<T: Serialize>(status: StatusCode, data: &T, version: u64) -> Response {
    (
        status,
        Json(json!({"success": true, "data": data, "version": version})),
    )
        .into_response()
}

fn body<T: DeserializeOwned>(payload: Result<Json<T>, JsonRejection>) -> FormConfigResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| FormConfigError::BadRequest(e.body_text()))
}

/// Parses `If-Match: 3` or `If-Match: "3"`.
fn expected_version(headers: &HeaderMap) -> FormConfigResult<Option<u64>> {
    let Some(value) = headers.get(IF_MATCH) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .map(|v| v.trim().trim_start_matches("W/").trim_matches('"'))
        .and_then(|v| v.parse::<u64>().ok())
        .map(Some)
        .ok_or_else(|| {
            FormConfigError::BadRequest("If-Match must hold a configuration version".into())
        })
}

fn ensure_config(config: &FormConfiguration, id: &str) -> FormConfigResult<()> {
    if config.id == id {
        Ok(())
    } else {
        Err(FormConfigError::NotFound(format!(
            "Form configuration '{id}' not found"
        )))
    }
}

// ── Public handlers ────────────────────────────────────────────────

/// Handler for `GET /health`.
async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Handler for `GET /api/form-config`.
async fn handle_public_config(State(state): State<Arc<AppState>>) -> ApiResult {
    let config = state.store.load().await?;
    Ok(ok(&config.public_view()))
}

/// Handler for `POST /api/form-config/submit`.
async fn handle_submit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> ApiResult {
    let submission = body(payload)?;
    let span = submission_span(&submission.form_type);
    accept_submission(&state, submission)
        .instrument(span)
        .await
}

async fn accept_submission(state: &AppState, submission: Submission) -> ApiResult {
    let config = state.store.load().await?;
    let form_type = config
        .form_type_by_name(&submission.form_type)
        .filter(|t| t.is_active)
        .ok_or_else(|| {
            FormConfigError::NotFound(format!(
                "Form type '{}' not found",
                submission.form_type
            ))
        })?;

    if let Some(version) = submission.schema_version {
        if version != config.version {
            tracing::info!(
                submitted = version,
                current = config.version,
                "rejected submission against a stale form"
            );
            return Err(FormConfigError::Conflict(
                "This form has changed since it was loaded. Please reload the page and try again."
                    .into(),
            )
            .into());
        }
    }

    let mut data = submission.form_data;
    let extra = unknown_keys(form_type, &data);
    if !extra.is_empty() {
        tracing::debug!(keys = ?extra, "dropping keys that are not fields of the form type");
        retain_known_fields(form_type, &mut data);
    }

    let errors = validate_form(form_type, &data);
    if !errors.is_empty() {
        tracing::info!(errors = errors.len(), "rejected submission");
        return Err(FormConfigError::FieldValidation(errors).into());
    }

    state
        .sink
        .accept(SubmissionRecord::new(&form_type.name, data, config.version))
        .await?;
    tracing::info!("submission accepted");

    Ok(Json(json!({
        "success": true,
        "message": form_type.success_message,
    }))
    .into_response())
}

// ── Admin handlers ─────────────────────────────────────────────────

/// Handler for `GET /api/form-config/admin`.
async fn handle_admin_config(State(state): State<Arc<AppState>>) -> ApiResult {
    let config = state.store.load().await?;
    Ok(ok(&config))
}

/// Handler for `PUT /api/form-config/{id}`.
async fn handle_update_settings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<SettingsPatch>, JsonRejection>,
) -> ApiResult {
    let patch = body(payload)?;
    let expected = expected_version(&headers)?;
    let ((), config) = apply(state.store.as_ref(), expected, |c| {
        ensure_config(c, &id)?;
        editor::update_settings(c, patch);
        Ok(())
    })
    .await?;
    tracing::info!(version = config.version, "form settings updated");
    Ok(ok(&config))
}

/// Handler for `POST /api/form-config/{id}/form-types`.
async fn handle_add_form_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<FormTypeSpec>, JsonRejection>,
) -> ApiResult {
    let spec = body(payload)?;
    let expected = expected_version(&headers)?;
    let (_, config) = apply(state.store.as_ref(), expected, |c| {
        ensure_config(c, &id)?;
        Ok(editor::add_form_type(c, spec)?)
    })
    .await?;
    Ok(ok_versioned(StatusCode::CREATED, &config, config.version))
}

/// Handler for `PUT /api/form-config/{id}/form-types/{ft_id}`.
async fn handle_update_form_type(
    State(state): State<Arc<AppState>>,
    Path((id, ft_id)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<Json<FormTypePatch>, JsonRejection>,
) -> ApiResult {
    let patch = body(payload)?;
    let expected = expected_version(&headers)?;
    let (form_type, config) = apply(state.store.as_ref(), expected, |c| {
        ensure_config(c, &id)?;
        Ok(editor::update_form_type(c, &ft_id, patch)?)
    })
    .await?;
    Ok(ok_versioned(StatusCode::OK, &form_type, config.version))
}

/// Handler for `DELETE /api/form-config/{id}/form-types/{ft_id}`.
async fn handle_delete_form_type(
    State(state): State<Arc<AppState>>,
    Path((id, ft_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult {
    let expected = expected_version(&headers)?;
    let (_, config) = apply(state.store.as_ref(), expected, |c| {
        ensure_config(c, &id)?;
        Ok(editor::delete_form_type(c, &ft_id)?)
    })
    .await?;
    Ok(ok(&config))
}

/// Handler for `POST /api/form-config/{id}/form-types/{ft_id}/toggle`.
async fn handle_toggle_form_type(
    State(state): State<Arc<AppState>>,
    Path((id, ft_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult {
    let expected = expected_version(&headers)?;
    let (form_type, config) = apply(state.store.as_ref(), expected, |c| {
        ensure_config(c, &id)?;
        Ok(editor::toggle_active(c, &ft_id)?)
    })
    .await?;
    Ok(ok_versioned(StatusCode::OK, &form_type, config.version))
}

/// Handler for `POST /api/form-config/{id}/form-types/{ft_id}/move`.
async fn handle_move_form_type(
    State(state): State<Arc<AppState>>,
    Path((id, ft_id)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> ApiResult {
    let MoveRequest { direction } = body(payload)?;
    let expected = expected_version(&headers)?;
    let (_, config) = apply(state.store.as_ref(), expected, |c| {
        ensure_config(c, &id)?;
        Ok(editor::move_form_type(c, &ft_id, direction)?)
    })
    .await?;
    Ok(ok(&config))
}

/// Handler for `POST /api/form-config/{id}/form-types/{ft_id}/fields`.
async fn handle_add_field(
    State(state): State<Arc<AppState>>,
    Path((id, ft_id)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<Json<Field>, JsonRejection>,
) -> ApiResult {
    let field = body(payload)?;
    let expected = expected_version(&headers)?;
    let (field, config) = apply(state.store.as_ref(), expected, |c| {
        ensure_config(c, &id)?;
        Ok(editor::add_field(c, &ft_id, field)?)
    })
    .await?;
    Ok(ok_versioned(StatusCode::CREATED, &field, config.version))
}

/// Handler for `PUT /api/form-config/{id}/form-types/{ft_id}/fields/{index}`.
async fn handle_update_field(
    State(state): State<Arc<AppState>>,
    Path((id, ft_id, index)): Path<(String, String, usize)>,
    headers: HeaderMap,
    payload: Result<Json<Field>, JsonRejection>,
) -> ApiResult {
    let field = body(payload)?;
    let expected = expected_version(&headers)?;
    let (field, config) = apply(state.store.as_ref(), expected, |c| {
        ensure_config(c, &id)?;
        Ok(editor::update_field(c, &ft_id, index, field)?)
    })
    .await?;
    Ok(ok_versioned(StatusCode::OK, &field, config.version))
}

/// Handler for `DELETE /api/form-config/{id}/form-types/{ft_id}/fields/{index}`.
async fn handle_delete_field(
    State(state): State<Arc<AppState>>,
    Path((id, ft_id, index)): Path<(String, String, usize)>,
    headers: HeaderMap,
) -> ApiResult {
    let expected = expected_version(&headers)?;
    let (_, config) = apply(state.store.as_ref(), expected, |c| {
        ensure_config(c, &id)?;
        Ok(editor::delete_field(c, &ft_id, index)?)
    })
    .await?;
    form_type_response(&config, &ft_id)
}

/// Handler for `POST /api/form-config/{id}/form-types/{ft_id}/fields/{index}/move`.
async fn handle_move_field(
    State(state): State<Arc<AppState>>,
    Path((id, ft_id, index)): Path<(String, String, usize)>,
    headers: HeaderMap,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> ApiResult {
    let MoveRequest { direction } = body(payload)?;
    let expected = expected_version(&headers)?;
    let (_, config) = apply(state.store.as_ref(), expected, |c| {
        ensure_config(c, &id)?;
        Ok(editor::move_field(c, &ft_id, index, direction)?)
    })
    .await?;
    form_type_response(&config, &ft_id)
}

fn form_type_response(config: &FormConfiguration, ft_id: &str) -> ApiResult {
    let form_type = config
        .form_type(ft_id)
        .ok_or_else(|| FormConfigError::NotFound(format!("Form type '{ft_id}' not found")))?;
    Ok(ok_versioned(StatusCode::OK, form_type, config.version))
}

#[cfg(test)]
mod tests {
    use super::*;

    use http::HeaderValue;

    #[test]
    fn test_expected_version_forms() {
        let mut headers = HeaderMap::new();
        assert_eq!(expected_version(&headers).unwrap(), None);

        headers.insert(IF_MATCH, HeaderValue::from_static("4"));
        assert_eq!(expected_version(&headers).unwrap(), Some(4));

        headers.insert(IF_MATCH, HeaderValue::from_static("\"5\""));
        assert_eq!(expected_version(&headers).unwrap(), Some(5));

        headers.insert(IF_MATCH, HeaderValue::from_static("W/\"6\""));
        assert_eq!(expected_version(&headers).unwrap(), Some(6));

        headers.insert(IF_MATCH, HeaderValue::from_static("latest"));
        assert!(matches!(
            expected_version(&headers),
            Err(FormConfigError::BadRequest(_))
        ));
    }

    #[test]
    fn test_api_error_status() {
        let response = ApiError(FormConfigError::Conflict("stale".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let response = ApiError(FormConfigError::FieldValidation(vec![])).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = ApiError(FormConfigError::Storage("disk".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_public_message_drops_variant_prefix() {
        let conflict = FormConfigError::Conflict("Please reload the page.".into());
        assert_eq!(public_message(&conflict), "Please reload the page.");
        let not_found = FormConfigError::NotFound("Form type 'x' not found".into());
        assert_eq!(public_message(&not_found), "Form type 'x' not found");
        let storage = FormConfigError::Storage("disk full".into());
        assert_eq!(public_message(&storage), "Storage error: disk full");
    }

    #[test]
    fn test_ensure_config() {
        let config = FormConfiguration::new("Contact", "");
        assert!(ensure_config(&config, &config.id).is_ok());
        assert_eq!(
            ensure_config(&config, "other").unwrap_err().status_code(),
            404
        );
    }
}
