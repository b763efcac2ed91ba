//! Character domain payload types.

use serde::{Deserialize, Serialize};

/// Webhook payload delivered when a profile job finishes.
///
/// `seed_num` carries the generation seed as the digit string parsed from the
/// backend's logs; it is what a later webtoon request sends back to keep the
/// character consistent across scenes. It is null when no seed could be
/// recovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterPayload {
    pub member_id: String,
    pub character_info: String,
    pub character_style: String,
    pub seed_num: Option<String>,
    pub character_profile_image_url: String,
}
