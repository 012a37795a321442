use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::page::{self, Notice};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubjectForm {
    #[serde(default)]
    pub subject: String,
}

pub async fn index() -> Html<String> {
    Html(page::render_form())
}

/// Runs one memo chat for the submitted subject.
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SubjectForm>,
) -> (StatusCode, Html<String>) {
    let outcome = state.server.on_submit(&form.subject).await;
    if let Ok(interaction) = &outcome {
        for result in &interaction.results {
            debug!(
                "chat {} ended after {} messages: {}",
                result.chat_id,
                result.transcript.len(),
                result.summary
            );
        }
    }

    match outcome {
        Ok(interaction) if interaction.elements.is_empty() => {
            warn!("chat finished without producing a memo");
            (
                StatusCode::OK,
                Html(page::render_notice(Notice::NoMemo, &form.subject)),
            )
        }
        Ok(interaction) => (
            StatusCode::OK,
            Html(page::render_elements(&interaction.elements, &form.subject)),
        ),
        Err(e) => {
            error!("memo chat failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Html(page::render_notice(Notice::Failed, &form.subject)),
            )
        }
    }
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "standby": state.server.standby().is_active() }))
}
