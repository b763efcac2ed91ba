//! Character profile workflow.
//!
//! Received -> Extracting -> Synthesizing -> Fetching -> Publishing ->
//! Notifying. The chain is all-or-nothing: any stage that comes back absent
//! or failed abandons the job with a log line and no webhook. Success fires
//! exactly one webhook carrying the profile URL and the generation seed.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{error, info, warn};

use crate::common::utils::sanitize_member_id;
use crate::domains::character::types::CharacterPayload;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone)]
pub struct CreateProfileRequest {
    pub member_id: String,
    pub character_style: String,
    /// Saved upload of the member's photo
    pub image_path: PathBuf,
    pub callback_host: String,
}

/// Error returned when the extraction backend echoes a different member id
/// than the one requested.
#[derive(Debug, thiserror::Error)]
#[error("member id mismatch: requested {requested}, echoed {echoed}")]
pub struct MemberIdMismatchError {
    pub requested: String,
    pub echoed: String,
}

pub async fn run(request: CreateProfileRequest, deps: &ServerDeps) -> Result<()> {
    info!(member_id = %request.member_id, "processing profile");

    let image = tokio::fs::read(&request.image_path)
        .await
        .with_context(|| format!("failed to read uploaded photo {}", request.image_path.display()))?;

    // Extracting
    let extracted = deps.extractor.extract(&request.member_id, &image).await?;
    info!(member_id = %request.member_id, "character info: {}", extracted.profile);

    if extracted.subject_id != request.member_id {
        // Cross-talk guard: a response for some other member must never be
        // published under this member's key.
        error!(
            requested = %request.member_id,
            echoed = %extracted.subject_id,
            "member id mismatch from feature extraction"
        );
        return Err(MemberIdMismatchError {
            requested: request.member_id,
            echoed: extracted.subject_id,
        }
        .into());
    }

    // Synthesizing
    let profile_image = deps
        .synthesizer
        .synthesize_profile(&request.character_style, &extracted.profile)
        .await?;
    info!(seed = ?profile_image.seed, image = ?profile_image.image_url, "profile synthesized");

    let Some(image_url) = profile_image.image_url else {
        error!(member_id = %request.member_id, "no image URL returned from profile synthesis");
        bail!("profile synthesis produced no output");
    };

    // Fetching
    let local_path = deps
        .asset_relay
        .relay(&image_url, "temp_profile")
        .await
        .with_context(|| format!("failed to download profile image from {}", image_url))?;

    // Publishing
    let Some(s3_url) = deps
        .asset_relay
        .publish(&local_path, &request.member_id, None, true)
        .await
    else {
        bail!("failed to upload profile image to object storage");
    };
    info!(member_id = %request.member_id, "profile image uploaded to {}", s3_url);

    // The source photo is only needed for extraction; drop it once the
    // durable copy exists.
    if let Err(e) = tokio::fs::remove_file(&request.image_path).await {
        warn!(
            path = %request.image_path.display(),
            error = %e,
            "failed to delete uploaded source photo"
        );
    }

    // Notifying
    let payload = CharacterPayload {
        member_id: sanitize_member_id(&request.member_id),
        character_info: extracted.profile,
        character_style: request.character_style.clone(),
        seed_num: profile_image.seed,
        character_profile_image_url: s3_url,
    };

    if let Err(e) = deps
        .callbacks
        .post_character(&request.callback_host, &payload)
        .await
    {
        error!(error = %format!("{e:#}"), "error while posting profile data");
    }

    Ok(())
}
