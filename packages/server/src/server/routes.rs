//! HTTP route handlers.
//!
//! Both generation endpoints return an acknowledgement immediately; the
//! pipelines run as deferred jobs and their real outcome is only observable
//! through the outbound webhooks.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::domains::character::workflows::{create_profile, CreateProfileRequest};
use crate::domains::webtoon::workflows::{create_webtoon, CreateWebtoonRequest};

use super::app::AxumAppState;

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// `POST /character` - multipart form with the member's photo.
///
/// Fields: `memberId`, `characterStyle`, `apiDomainUrl`, file `userImage`.
pub async fn start_character(
    State(state): State<AxumAppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    match accept_character(&state, multipart).await {
        Ok(()) => Json(json!({ "message": "Profile processing started" })),
        Err(e) => {
            error!(error = %format!("{e:#}"), "error in /character endpoint");
            Json(json!({ "message": "Failed to start profile processing" }))
        }
    }
}

async fn accept_character(state: &AxumAppState, mut multipart: Multipart) -> Result<()> {
    let mut member_id: Option<String> = None;
    let mut character_style: Option<String> = None;
    let mut callback_host: Option<String> = None;
    let mut image_path: Option<PathBuf> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .context("failed to read multipart field")?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("memberId") => member_id = Some(field.text().await?),
            Some("characterStyle") => character_style = Some(field.text().await?),
            Some("apiDomainUrl") => callback_host = Some(field.text().await?),
            Some("userImage") => {
                // Keep only the basename of whatever the client claims the
                // file is called.
                let filename = field
                    .file_name()
                    .and_then(|name| Path::new(name).file_name())
                    .map(|base| base.to_string_lossy().to_string())
                    .unwrap_or_else(|| "upload.webp".to_string());
                let bytes = field.bytes().await?;

                tokio::fs::create_dir_all(&state.upload_dir)
                    .await
                    .context("failed to create upload directory")?;
                let path = state.upload_dir.join(filename);
                tokio::fs::write(&path, &bytes)
                    .await
                    .with_context(|| format!("failed to save upload to {}", path.display()))?;
                info!("file saved to {}", path.display());
                image_path = Some(path);
            }
            _ => {}
        }
    }

    let request = CreateProfileRequest {
        member_id: member_id.context("memberId field is required")?,
        character_style: character_style.context("characterStyle field is required")?,
        image_path: image_path.context("userImage file is required")?,
        callback_host: callback_host.context("apiDomainUrl field is required")?,
    };

    info!(member_id = %request.member_id, "received /character request");

    let deps = state.deps.clone();
    state.jobs.spawn("create_profile", async move {
        create_profile::run(request, &deps).await
    });

    Ok(())
}

/// `POST /webtoon` - JSON body reusing a previously extracted profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWebtoonBody {
    pub member_id: String,
    pub date: String,
    /// Diary text the scenario is written from
    pub content: String,
    pub character_info: String,
    pub seed_num: i64,
    pub character_style: String,
    pub api_domain_url: String,
}

pub async fn start_webtoon(
    State(state): State<AxumAppState>,
    Json(body): Json<StartWebtoonBody>,
) -> impl IntoResponse {
    info!(
        member_id = %body.member_id,
        date = %body.date,
        "received /webtoon request"
    );

    let request = CreateWebtoonRequest {
        member_id: body.member_id,
        date: body.date,
        diary_text: body.content,
        character_info: body.character_info,
        seed_num: body.seed_num,
        character_style: body.character_style,
        callback_host: body.api_domain_url,
    };

    let deps = state.deps.clone();
    state.jobs.spawn("create_webtoon", async move {
        create_webtoon::run(request, &deps).await
    });

    Json(json!({ "message": "Webtoon processing started" }))
}
