//! The admin HTTP boundary (§6): bearer-token gated REST surface that
//! forwards every request onto the world thread's control mailbox and
//! `.await`s a `oneshot` reply, so the HTTP layer never touches the
//! `World` directly.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use thornkeep_data::UserId;
use tokio::sync::oneshot;

use crate::config::{GametimerConfig, MudConfig};
use crate::control::{AdminRequest, AdminResponse, ControlMessage};

#[derive(Clone)]
pub struct AdminState {
    pub control_tx: crossbeam_channel::Sender<ControlMessage>,
    pub token: Arc<Option<String>>,
}

pub fn router(state: AdminState) -> Router {
    let protected = Router::new()
        .route("/stats", get(stats))
        .route("/players", get(players))
        .route("/players/all", get(players))
        .route("/players/details/:user", get(player_details))
        .route("/players/update/:user", post(update_player))
        .route("/players/delete/:user", axum::routing::delete(delete_player))
        .route("/players/:user/kick", post(kick_player))
        .route("/players/:user/monitor", post(monitor_player))
        .route("/force-save", post(force_save))
        .route("/shutdown", post(shutdown))
        .route("/mud-config", get(get_mud_config).post(set_mud_config))
        .route("/gametimer-config", get(get_gametimer_config).post(set_gametimer_config))
        .route("/pipeline-metrics", get(pipeline_metrics))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new().nest("/admin", protected).with_state(state)
}

async fn require_token(
    State(state): State<AdminState>,
    headers: HeaderMap,
    request: axum::http::Request<axum::body::Body>,
    next: Next<axum::body::Body>,
) -> Response {
    let Some(expected) = state.token.as_ref() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "admin API disabled: no --admin-token configured").into_response();
    };
    let provided = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if provided != Some(expected.as_str()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    next.run(request).await
}

async fn dispatch(state: &AdminState, request: AdminRequest) -> AdminResponse {
    let (reply_tx, reply_rx) = oneshot::channel();
    if state.control_tx.send(ControlMessage::Admin { request, reply: reply_tx }).is_err() {
        return AdminResponse::Error("world thread is gone".to_string());
    }
    reply_rx.await.unwrap_or(AdminResponse::Error("world thread dropped the reply".to_string()))
}

fn into_response(response: AdminResponse) -> Response {
    match response {
        AdminResponse::Ok => Json(json!({ "ok": true })).into_response(),
        AdminResponse::Json(value) => Json(value).into_response(),
        AdminResponse::Error(message) => (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response(),
    }
}

async fn stats(State(state): State<AdminState>) -> Response {
    into_response(dispatch(&state, AdminRequest::Stats).await)
}

async fn players(State(state): State<AdminState>) -> Response {
    into_response(dispatch(&state, AdminRequest::Players).await)
}

async fn player_details(State(state): State<AdminState>, Path(user): Path<String>) -> Response {
    into_response(dispatch(&state, AdminRequest::PlayerDetails { user_id: UserId::new(&user) }).await)
}

async fn update_player(State(state): State<AdminState>, Path(user): Path<String>, Json(patch): Json<Value>) -> Response {
    into_response(dispatch(&state, AdminRequest::UpdatePlayer { user_id: UserId::new(&user), patch }).await)
}

async fn delete_player(State(state): State<AdminState>, Path(user): Path<String>) -> Response {
    into_response(dispatch(&state, AdminRequest::DeletePlayer { user_id: UserId::new(&user) }).await)
}

async fn kick_player(State(state): State<AdminState>, Path(user): Path<String>) -> Response {
    into_response(dispatch(&state, AdminRequest::Kick { target: UserId::new(&user) }).await)
}

#[derive(serde::Deserialize)]
struct MonitorBody {
    admin: String,
}

async fn monitor_player(State(state): State<AdminState>, Path(user): Path<String>, Json(body): Json<MonitorBody>) -> Response {
    into_response(
        dispatch(
            &state,
            AdminRequest::Monitor {
                admin: UserId::new(&body.admin),
                target: UserId::new(&user),
            },
        )
        .await,
    )
}

async fn force_save(State(state): State<AdminState>) -> Response {
    into_response(dispatch(&state, AdminRequest::ForceSave).await)
}

#[derive(serde::Deserialize)]
struct ShutdownBody {
    minutes: Option<u32>,
}

async fn shutdown(State(state): State<AdminState>, Json(body): Json<ShutdownBody>) -> Response {
    into_response(dispatch(&state, AdminRequest::Shutdown { minutes: body.minutes }).await)
}

async fn get_mud_config(State(state): State<AdminState>) -> Response {
    into_response(dispatch(&state, AdminRequest::GetMudConfig).await)
}

async fn set_mud_config(State(state): State<AdminState>, Json(config): Json<MudConfig>) -> Response {
    into_response(dispatch(&state, AdminRequest::SetMudConfig(config)).await)
}

async fn get_gametimer_config(State(state): State<AdminState>) -> Response {
    into_response(dispatch(&state, AdminRequest::GetGametimerConfig).await)
}

async fn set_gametimer_config(State(state): State<AdminState>, Json(config): Json<GametimerConfig>) -> Response {
    into_response(dispatch(&state, AdminRequest::SetGametimerConfig(config)).await)
}

async fn pipeline_metrics(State(state): State<AdminState>) -> Response {
    into_response(dispatch(&state, AdminRequest::PipelineMetrics).await)
}
