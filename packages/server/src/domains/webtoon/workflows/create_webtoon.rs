//! Webtoon workflow.
//!
//! Received -> Scripting -> per scene (Synthesizing -> Fetching ->
//! Publishing) -> Notifying. Unlike the profile workflow this one is
//! best-effort: scenes are independent, a failed scene is dropped from the
//! results, and the webhook fires with whatever survived.

use anyhow::Result;
use futures::future::join_all;
use tracing::{error, info};

use crate::domains::webtoon::types::{
    SceneOutcome, WebtoonImage, WebtoonPayload, SCENE_FAILURE_PLACEHOLDER,
};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone)]
pub struct CreateWebtoonRequest {
    pub member_id: String,
    pub date: String,
    pub diary_text: String,
    /// Character profile text extracted by an earlier profile job
    pub character_info: String,
    /// Seed from the same profile job, for a consistent character
    pub seed_num: i64,
    pub character_style: String,
    pub callback_host: String,
}

pub async fn run(request: CreateWebtoonRequest, deps: &ServerDeps) -> Result<()> {
    info!(member_id = %request.member_id, date = %request.date, "processing webtoon");

    // Scripting
    let (_, scenario) = deps
        .scenario_writer
        .write(&request.member_id, &request.diary_text)
        .await?;
    info!(member_id = %request.member_id, "scenario: {:?}", scenario.scenes);

    // Scenes share nothing but the seed and the member id, so they render
    // concurrently; join_all keeps the outcomes in scene-index order.
    let outcomes: Vec<SceneOutcome> = join_all(
        scenario
            .scenes
            .iter()
            .enumerate()
            .map(|(index, scene)| process_scene(index, scene, &request, deps)),
    )
    .await;

    let webtoon_images: Vec<WebtoonImage> = outcomes
        .iter()
        .flat_map(SceneOutcome::wire_images)
        .collect();
    info!(
        member_id = %request.member_id,
        rendered = webtoon_images.len(),
        attempted = outcomes.len(),
        "webtoon scenes settled"
    );

    // Notifying - fires even when some (or all) scenes failed.
    let payload = WebtoonPayload {
        member_id: request.member_id.clone(),
        date: request.date.clone(),
        webtoon_folder_url: deps.asset_relay.folder_url(&request.member_id, &request.date),
        webtoon_images,
    };

    if let Err(e) = deps
        .callbacks
        .post_webtoon(&request.callback_host, &payload)
        .await
    {
        error!(error = %format!("{e:#}"), "error while posting webtoon data");
    }

    Ok(())
}

/// Synthesize, fetch and publish one scene. Never fails the workflow: every
/// problem is logged and folded into a `Failed` outcome.
async fn process_scene(
    index: usize,
    scene: &str,
    request: &CreateWebtoonRequest,
    deps: &ServerDeps,
) -> SceneOutcome {
    let failed = |reason: String| SceneOutcome::Failed {
        scenario: scene.to_string(),
        reason,
    };

    if scene == SCENE_FAILURE_PLACEHOLDER {
        // The scenario writer already gave up on this slot.
        return failed("scene script unavailable".to_string());
    }

    info!(scene_index = index, "processing scenario: {}", scene);

    let urls = match deps
        .synthesizer
        .synthesize_scene(
            &request.character_style,
            &request.character_info,
            request.seed_num,
            scene,
        )
        .await
    {
        Ok(urls) if !urls.is_empty() => urls,
        Ok(_) => {
            error!(scene_index = index, "no output produced for scene");
            return failed("no output produced".to_string());
        }
        Err(e) => {
            error!(scene_index = index, error = %format!("{e:#}"), "scene synthesis failed");
            return failed(format!("{e:#}"));
        }
    };

    let name_hint = format!("{}", index + 1);
    let mut published = Vec::with_capacity(urls.len());
    for url in &urls {
        match deps.asset_relay.relay(url, &name_hint).await {
            Ok(local_path) => {
                match deps
                    .asset_relay
                    .publish(&local_path, &request.member_id, Some(&request.date), false)
                    .await
                {
                    Some(s3_url) => {
                        info!(scene_index = index, "webtoon image uploaded to {}", s3_url);
                        published.push(s3_url);
                    }
                    None => {
                        error!(scene_index = index, "failed to upload webtoon image to object storage");
                    }
                }
            }
            Err(e) => {
                error!(scene_index = index, error = %format!("{e:#}"), "failed to download image from {}", url);
            }
        }
    }

    if published.is_empty() {
        failed("no image published".to_string())
    } else {
        SceneOutcome::Rendered {
            scenario: scene.to_string(),
            images: published,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::webtoon::types::Scenario;
    use crate::kernel::test_dependencies::TestDependencies;

    fn request() -> CreateWebtoonRequest {
        CreateWebtoonRequest {
            member_id: "u1".to_string(),
            date: "2024-11-02".to_string(),
            diary_text: "walked in the rain".to_string(),
            character_info: "{\"hair\": \"short\"}".to_string(),
            seed_num: 777,
            character_style: "romance".to_string(),
            callback_host: "cb.local".to_string(),
        }
    }

    fn four_scenes() -> Scenario {
        Scenario::new(vec![
            "scene one".into(),
            "scene two".into(),
            "scene three".into(),
            "scene four".into(),
        ])
    }

    #[tokio::test]
    async fn test_all_scenes_survive() {
        let test_deps = TestDependencies::new();
        test_deps.scenario_writer.push_scenario(four_scenes());
        for i in 1..=4 {
            test_deps
                .synthesizer
                .push_scene_output(vec![format!("https://gen/{i}.webp")]);
        }

        let deps = test_deps.server_deps();
        run(request(), &deps).await.unwrap();

        let delivered = test_deps.callbacks.webtoon_deliveries();
        assert_eq!(delivered.len(), 1);
        let (_, payload) = &delivered[0];
        assert_eq!(payload.webtoon_images.len(), 4);
        assert_eq!(payload.webtoon_images[0].scenario, "scene one");
        assert!(payload.webtoon_folder_url.ends_with("webtoon-ai/u1/2024-11-02/"));
    }

    #[tokio::test]
    async fn test_one_failed_scene_is_omitted_and_order_preserved() {
        let test_deps = TestDependencies::new();
        test_deps.scenario_writer.push_scenario(four_scenes());
        test_deps
            .synthesizer
            .push_scene_output(vec!["https://gen/1.webp".to_string()]);
        test_deps.synthesizer.push_scene_failure("backend exploded");
        test_deps
            .synthesizer
            .push_scene_output(vec!["https://gen/3.webp".to_string()]);
        test_deps
            .synthesizer
            .push_scene_output(vec!["https://gen/4.webp".to_string()]);

        let deps = test_deps.server_deps();
        run(request(), &deps).await.unwrap();

        let delivered = test_deps.callbacks.webtoon_deliveries();
        assert_eq!(delivered.len(), 1);
        let (_, payload) = &delivered[0];

        let scenarios: Vec<&str> = payload
            .webtoon_images
            .iter()
            .map(|img| img.scenario.as_str())
            .collect();
        assert_eq!(scenarios, vec!["scene one", "scene three", "scene four"]);
    }

    #[tokio::test]
    async fn test_empty_synthesis_output_counts_as_scene_failure() {
        let test_deps = TestDependencies::new();
        test_deps.scenario_writer.push_scenario(four_scenes());
        for _ in 0..4 {
            test_deps.synthesizer.push_scene_output(Vec::new());
        }

        let deps = test_deps.server_deps();
        run(request(), &deps).await.unwrap();

        let delivered = test_deps.callbacks.webtoon_deliveries();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].1.webtoon_images.is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_scenes_are_not_synthesized() {
        let test_deps = TestDependencies::new();
        test_deps.scenario_writer.push_scenario(Scenario::new(vec![
            "scene one".into(),
            SCENE_FAILURE_PLACEHOLDER.into(),
            SCENE_FAILURE_PLACEHOLDER.into(),
            SCENE_FAILURE_PLACEHOLDER.into(),
        ]));
        test_deps
            .synthesizer
            .push_scene_output(vec!["https://gen/1.webp".to_string()]);

        let deps = test_deps.server_deps();
        run(request(), &deps).await.unwrap();

        assert_eq!(test_deps.synthesizer.scene_calls(), 1);
        let delivered = test_deps.callbacks.webtoon_deliveries();
        assert_eq!(delivered[0].1.webtoon_images.len(), 1);
    }

    #[tokio::test]
    async fn test_scenario_writer_failure_aborts_without_webhook() {
        let test_deps = TestDependencies::new();
        test_deps.scenario_writer.fail_next("model unavailable");

        let deps = test_deps.server_deps();
        assert!(run(request(), &deps).await.is_err());
        assert!(test_deps.callbacks.webtoon_deliveries().is_empty());
        assert_eq!(test_deps.synthesizer.scene_calls(), 0);
    }
}
