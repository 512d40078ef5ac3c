use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use super::*;
use crate::llm::capability::{
    parse_json_reply, AnalysisPayload, ChatRequest, PartialStudioConfig, SuggestedOption, TextRequest,
};

#[derive(Default)]
struct MockCapability {
    events: Mutex<Vec<String>>,
    calls: AtomicUsize,
    portrait_delays: Mutex<HashMap<PortraitView, Duration>>,
    failing_portraits: Mutex<HashSet<PortraitView>>,
    empty_portraits: Mutex<HashSet<PortraitView>>,
    fail_analysis: AtomicBool,
    fail_annotation: AtomicBool,
    fail_text: AtomicBool,
    scenario_replies: Mutex<HashMap<String, String>>,
    option_replies: Mutex<Vec<SuggestedOption>>,
    scenario_suggestions: Mutex<Vec<ScenarioPreset>>,
}

impl MockCapability {
    fn record(&self, event: String) {
        self.events.lock().push(event);
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.starts_with(prefix))
            .count()
    }

    fn position(&self, event: &str) -> usize {
        self.events
            .lock()
            .iter()
            .position(|recorded| recorded == event)
            .unwrap_or_else(|| panic!("event {event} not recorded"))
    }

    fn delay(&self, view: PortraitView, millis: u64) {
        self.portrait_delays
            .lock()
            .insert(view, Duration::from_millis(millis));
    }

    fn fail_portrait(&self, view: PortraitView, fail: bool) {
        let mut failing = self.failing_portraits.lock();
        if fail {
            failing.insert(view);
        } else {
            failing.remove(&view);
        }
    }

    fn text_failure(&self) -> Result<(), CapabilityError> {
        if self.fail_text.load(Ordering::SeqCst) {
            Err(CapabilityError::Request("503 unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AestheticCapability for MockCapability {
    async fn analyze_aesthetics(
        &self,
        _image: &[u8],
        _request: &TextRequest,
    ) -> Result<AnalysisPayload, CapabilityError> {
        self.record("analysis".to_string());
        if self.fail_analysis.load(Ordering::SeqCst) {
            return Err(CapabilityError::InvalidResponse("no data".to_string()));
        }
        Ok(serde_json::from_value(json!({
            "scores": {"eyes": 88, "cheeks": 80, "lips": 84, "brows": 79, "jawline": 90, "symmetry": 86, "total": 85},
            "summary": "照片中人物五官比例协调。",
            "keywords": ["清秀", "骨相优越"]
        }))
        .unwrap())
    }

    async fn generate_portrait(
        &self,
        _image: &[u8],
        request: &PortraitRequest,
    ) -> Result<Vec<u8>, CapabilityError> {
        let view = request.view;
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(format!("portrait:start:{view}"));
        let delay = self.portrait_delays.lock().get(&view).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_portraits.lock().contains(&view) {
            self.record(format!("portrait:fail:{view}"));
            return Err(CapabilityError::Request("403 forbidden".to_string()));
        }
        if self.empty_portraits.lock().contains(&view) {
            self.record(format!("portrait:empty:{view}"));
            return Ok(Vec::new());
        }
        self.record(format!("portrait:end:{view}"));
        Ok(format!("{view}-clean-{call}").into_bytes())
    }

    async fn generate_annotation(
        &self,
        clean_image: &[u8],
        request: &AnnotationRequest,
    ) -> Result<Vec<u8>, CapabilityError> {
        self.record(format!("annotation:start:{}", request.view));
        if self.fail_annotation.load(Ordering::SeqCst) {
            return Err(CapabilityError::NoImage);
        }
        let mut annotated = clean_image.to_vec();
        annotated.extend_from_slice(b"+annotated");
        Ok(annotated)
    }

    async fn suggest_options(
        &self,
        _request: &TextRequest,
    ) -> Result<Vec<SuggestedOption>, CapabilityError> {
        self.text_failure()?;
        Ok(self.option_replies.lock().clone())
    }

    async fn suggest_scenarios(
        &self,
        _request: &TextRequest,
    ) -> Result<Vec<ScenarioPreset>, CapabilityError> {
        self.text_failure()?;
        Ok(self.scenario_suggestions.lock().clone())
    }

    async fn resolve_scenario(
        &self,
        request: &TextRequest,
    ) -> Result<PartialStudioConfig, CapabilityError> {
        self.text_failure()?;
        let replies = self.scenario_replies.lock().clone();
        let reply = replies
            .iter()
            .find(|(name, _)| request.prompt.contains(name.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| "{}".to_string());
        parse_json_reply(&reply)
    }

    async fn explain_term(&self, request: &TextRequest) -> Result<String, CapabilityError> {
        self.text_failure()?;
        Ok(format!("解释: {}", request.prompt))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, CapabilityError> {
        self.text_failure()?;
        Ok(ChatReply {
            text: format!("第{}轮回答", request.history.len() / 2 + 1),
            suggested_questions: vec![
                "a".to_string(),
                " ".to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string(),
            ],
        })
    }
}

fn session_with(mock: &Arc<MockCapability>, options: SessionOptions) -> StudioSession {
    let session = StudioSession::new(mock.clone(), options);
    session.select_image(b"source-photo".to_vec()).unwrap();
    session
}

fn session(mock: &Arc<MockCapability>) -> StudioSession {
    session_with(
        mock,
        SessionOptions {
            seed: Some(7),
            ..SessionOptions::default()
        },
    )
}

fn clean_text(session: &StudioSession, view: PortraitView) -> String {
    let images = session.view_images(view).expect("view images");
    String::from_utf8(images.clean.to_vec()).unwrap()
}

#[tokio::test]
async fn analyze_seeds_the_front_view_and_annotates_it() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);

    let analysis = session.analyze().await.unwrap();
    assert_eq!(analysis.scores.total, 85);
    assert_eq!(session.phase(), Phase::Success);
    assert_eq!(session.active_view(), PortraitView::Front);

    let images = session.view_images(PortraitView::Front).unwrap();
    assert_eq!(&*images.clean, b"front-clean-1");
    assert_eq!(images.annotated.as_deref(), Some(&b"front-clean-1+annotated"[..]));
    assert_eq!(
        session.view_status(PortraitView::Front),
        ViewStatus {
            clean: SlotStatus::Ready,
            annotated: SlotStatus::Ready
        }
    );
    assert_eq!(session.view_status(PortraitView::Side45).clean, SlotStatus::Missing);
    assert_eq!(mock.count("analysis"), 1);
}

#[tokio::test]
async fn analyze_requires_a_selected_image() {
    let mock = Arc::new(MockCapability::default());
    let session = StudioSession::new(mock.clone(), SessionOptions::default());
    let err = session.analyze().await.unwrap_err();
    assert!(matches!(err, StudioError::NoImageSelected));
    assert_eq!(session.phase(), Phase::Idle);
    assert!(mock.events().is_empty());
}

#[tokio::test]
async fn failing_front_portrait_ends_in_error_and_can_be_retried() {
    let mock = Arc::new(MockCapability::default());
    mock.fail_portrait(PortraitView::Front, true);
    let session = session(&mock);

    let err = session.analyze().await.unwrap_err();
    assert!(matches!(
        err,
        StudioError::PortraitGenerationFailed {
            view: PortraitView::Front,
            ..
        }
    ));
    assert!(matches!(session.phase(), Phase::Error(_)));
    assert!(session.report().is_none());
    assert_eq!(session.view_status(PortraitView::Front).clean, SlotStatus::Missing);

    mock.fail_portrait(PortraitView::Front, false);
    session.analyze().await.unwrap();
    assert_eq!(session.phase(), Phase::Success);
}

#[tokio::test]
async fn failing_analysis_ends_in_error() {
    let mock = Arc::new(MockCapability::default());
    mock.fail_analysis.store(true, Ordering::SeqCst);
    let session = session(&mock);

    let err = session.analyze().await.unwrap_err();
    assert!(matches!(err, StudioError::AnalysisFailed(_)));
    match session.phase() {
        Phase::Error(message) => assert!(message.contains("no data")),
        other => panic!("unexpected phase {other:?}"),
    }
}

#[tokio::test]
async fn failing_annotation_still_succeeds_with_clean_only() {
    let mock = Arc::new(MockCapability::default());
    mock.fail_annotation.store(true, Ordering::SeqCst);
    let session = session(&mock);

    session.analyze().await.unwrap();
    assert_eq!(session.phase(), Phase::Success);
    let images = session.view_images(PortraitView::Front).unwrap();
    assert!(images.annotated.is_none());
    assert_eq!(session.view_status(PortraitView::Front).annotated, SlotStatus::Missing);
    assert_eq!(
        session.display_image(PortraitView::Front).as_deref(),
        Some(&b"front-clean-1"[..])
    );
}

#[tokio::test]
async fn disabled_annotations_issue_no_annotation_requests() {
    let mock = Arc::new(MockCapability::default());
    let session = session_with(
        &mock,
        SessionOptions {
            annotations_enabled: false,
            ..SessionOptions::default()
        },
    );
    session.analyze().await.unwrap();
    session.switch_view(PortraitView::Side45).await.unwrap();
    assert_eq!(mock.count("annotation"), 0);
}

#[tokio::test]
async fn hidden_annotations_send_no_annotation_requests() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();
    assert_eq!(mock.count("annotation:start:front"), 1);

    session.set_show_annotations(false);
    session.switch_view(PortraitView::Side45).await.unwrap();
    session.regenerate().await.unwrap();
    assert_eq!(mock.count("annotation:start:side45"), 0);
    assert!(session.view_images(PortraitView::Side45).unwrap().annotated.is_none());

    session.set_show_annotations(true);
    session.switch_view(PortraitView::Side90).await.unwrap();
    assert_eq!(mock.count("annotation:start:side90"), 1);
}

#[tokio::test]
async fn annotations_can_be_turned_on_after_startup() {
    let mock = Arc::new(MockCapability::default());
    let session = session_with(
        &mock,
        SessionOptions {
            annotations_enabled: false,
            ..SessionOptions::default()
        },
    );
    assert!(!session.show_annotations());
    session.analyze().await.unwrap();
    assert_eq!(mock.count("annotation"), 0);

    session.set_show_annotations(true);
    session.switch_view(PortraitView::Side90).await.unwrap();
    assert_eq!(mock.count("annotation:start:side90"), 1);
    assert_eq!(
        session.display_image(PortraitView::Side90).as_deref(),
        Some(&b"side90-clean-2+annotated"[..])
    );
}

#[tokio::test]
async fn empty_portrait_reply_is_reported_without_touching_other_views() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();
    session.switch_view(PortraitView::Side45).await.unwrap();
    let front = session.view_images(PortraitView::Front).unwrap();
    let side45 = session.view_images(PortraitView::Side45).unwrap();

    mock.empty_portraits.lock().insert(PortraitView::Side90);
    let err = session.switch_view(PortraitView::Side90).await.unwrap_err();
    assert!(matches!(
        err,
        StudioError::NoImageGenerated {
            view: PortraitView::Side90
        }
    ));
    assert_eq!(session.phase(), Phase::Success);
    assert_eq!(session.view_status(PortraitView::Side90).clean, SlotStatus::Missing);
    assert_eq!(mock.count("annotation:start:side90"), 0);

    let front_after = session.view_images(PortraitView::Front).unwrap();
    let side45_after = session.view_images(PortraitView::Side45).unwrap();
    assert!(Arc::ptr_eq(&front.clean, &front_after.clean));
    assert!(Arc::ptr_eq(&side45.clean, &side45_after.clean));
    assert!(Arc::ptr_eq(
        side45.annotated.as_ref().unwrap(),
        side45_after.annotated.as_ref().unwrap()
    ));
}

#[tokio::test]
async fn regenerate_targets_the_view_active_when_it_starts() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();
    mock.delay(PortraitView::Front, 20);

    let (regenerated, switched) = tokio::join!(
        session.regenerate(),
        session.switch_view(PortraitView::Side45)
    );
    assert_eq!(regenerated.unwrap(), ViewOutcome::Generated);
    assert_eq!(switched.unwrap(), ViewOutcome::Generated);
    assert_eq!(clean_text(&session, PortraitView::Front), "front-clean-2");
    assert_eq!(clean_text(&session, PortraitView::Side45), "side45-clean-3");
    assert_eq!(session.active_view(), PortraitView::Side45);
}

#[tokio::test]
async fn switching_to_a_cached_view_issues_no_request() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();
    assert_eq!(mock.count("portrait:start"), 1);

    assert_eq!(
        session.switch_view(PortraitView::Front).await.unwrap(),
        ViewOutcome::Cached
    );
    assert_eq!(mock.count("portrait:start"), 1);

    assert_eq!(
        session.switch_view(PortraitView::Side45).await.unwrap(),
        ViewOutcome::Generated
    );
    assert_eq!(mock.count("portrait:start"), 2);

    assert_eq!(
        session.switch_view(PortraitView::Side45).await.unwrap(),
        ViewOutcome::Cached
    );
    assert_eq!(mock.count("portrait:start"), 2);
    assert_eq!(mock.count("annotation:start:side45"), 1);
}

#[tokio::test]
async fn switching_views_requires_a_report() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    let err = session.switch_view(PortraitView::Side90).await.unwrap_err();
    assert!(matches!(
        err,
        StudioError::InvalidTransition {
            operation: "switch_view",
            phase: "idle"
        }
    ));
}

#[tokio::test]
async fn annotation_is_requested_only_after_the_clean_image_resolves() {
    let mock = Arc::new(MockCapability::default());
    mock.delay(PortraitView::Front, 20);
    mock.delay(PortraitView::Side90, 30);
    let session = session(&mock);

    session.analyze().await.unwrap();
    session.switch_view(PortraitView::Side90).await.unwrap();

    for view in [PortraitView::Front, PortraitView::Side90] {
        let clean_done = mock.position(&format!("portrait:end:{view}"));
        let annotation = mock.position(&format!("annotation:start:{view}"));
        assert!(clean_done < annotation, "{view}: {:?}", mock.events());
    }
}

#[tokio::test]
async fn regenerate_only_touches_the_active_view() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();
    session.switch_view(PortraitView::Side45).await.unwrap();
    session.switch_view(PortraitView::Front).await.unwrap();

    let side_before = session.view_images(PortraitView::Side45).unwrap();
    let front_before = session.view_images(PortraitView::Front).unwrap();

    assert_eq!(session.regenerate().await.unwrap(), ViewOutcome::Generated);

    let side_after = session.view_images(PortraitView::Side45).unwrap();
    assert!(Arc::ptr_eq(&side_before.clean, &side_after.clean));
    assert!(Arc::ptr_eq(
        side_before.annotated.as_ref().unwrap(),
        side_after.annotated.as_ref().unwrap()
    ));

    let front_after = session.view_images(PortraitView::Front).unwrap();
    assert_ne!(front_before.clean, front_after.clean);
    assert_eq!(&*front_after.clean, b"front-clean-3");
    assert_eq!(
        front_after.annotated.as_deref(),
        Some(&b"front-clean-3+annotated"[..])
    );
    assert!(session.view_images(PortraitView::Side90).is_none());
}

#[tokio::test]
async fn regenerate_drops_the_previous_annotation() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();
    mock.fail_annotation.store(true, Ordering::SeqCst);

    session.regenerate().await.unwrap();
    let images = session.view_images(PortraitView::Front).unwrap();
    assert_eq!(&*images.clean, b"front-clean-2");
    assert!(images.annotated.is_none());
}

#[tokio::test]
async fn failed_regenerate_keeps_the_cached_image() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();
    mock.fail_portrait(PortraitView::Front, true);

    let err = session.regenerate().await.unwrap_err();
    assert!(matches!(
        err,
        StudioError::PortraitGenerationFailed {
            view: PortraitView::Front,
            ..
        }
    ));
    assert_eq!(session.phase(), Phase::Success);
    assert_eq!(clean_text(&session, PortraitView::Front), "front-clean-1");
    assert_eq!(session.view_status(PortraitView::Front).clean, SlotStatus::Ready);
}

#[tokio::test]
async fn concurrent_switches_write_their_own_slots() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();
    mock.delay(PortraitView::Side45, 40);
    mock.delay(PortraitView::Side90, 5);

    let (side45, side90) = tokio::join!(
        session.switch_view(PortraitView::Side45),
        session.switch_view(PortraitView::Side90)
    );
    assert_eq!(side45.unwrap(), ViewOutcome::Generated);
    assert_eq!(side90.unwrap(), ViewOutcome::Generated);

    assert!(clean_text(&session, PortraitView::Side45).starts_with("side45-clean-"));
    assert!(clean_text(&session, PortraitView::Side90).starts_with("side90-clean-"));
    assert_eq!(clean_text(&session, PortraitView::Front), "front-clean-1");
    assert_eq!(session.active_view(), PortraitView::Side90);
}

#[tokio::test]
async fn switching_to_a_loading_view_does_not_duplicate_the_request() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();
    mock.delay(PortraitView::Side45, 20);

    let (first, second) = tokio::join!(
        session.switch_view(PortraitView::Side45),
        session.switch_view(PortraitView::Side45)
    );
    assert_eq!(first.unwrap(), ViewOutcome::Generated);
    assert_eq!(second.unwrap(), ViewOutcome::AlreadyLoading);
    assert_eq!(mock.count("portrait:start:side45"), 1);
}

#[tokio::test]
async fn superseded_regeneration_is_dropped() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();
    mock.delay(PortraitView::Front, 20);

    let (first, second) = tokio::join!(session.regenerate(), session.regenerate());
    let mut outcomes = vec![first.unwrap(), second.unwrap()];
    outcomes.sort_by_key(|outcome| outcome.as_str());
    assert_eq!(outcomes, vec![ViewOutcome::Generated, ViewOutcome::Superseded]);
    assert_eq!(clean_text(&session, PortraitView::Front), "front-clean-3");
}

#[tokio::test]
async fn image_selection_is_rejected_while_analyzing() {
    let mock = Arc::new(MockCapability::default());
    mock.delay(PortraitView::Front, 20);
    let session = session(&mock);

    let (analysis, selection) = tokio::join!(session.analyze(), async {
        session.select_image(b"another".to_vec())
    });
    assert!(analysis.is_ok());
    assert!(matches!(
        selection,
        Err(StudioError::InvalidTransition {
            operation: "select_image",
            ..
        })
    ));
}

fn boss_reply() -> &'static str {
    r#"{"beauty": {"smooth": 40, "highClass": 85},
        "style": {"category": "status", "subOption": "executive", "intensity": 75},
        "fashion": {"clothing": "c_suit", "earrings": "e_pearl"},
        "background": {"lighting": "cinematic", "environment": "indoor"}}"#
}

fn princess_reply() -> &'static str {
    r#"{"beauty": {"pure": 70, "whiten": 60},
        "style": {"category": "mood", "subOption": "sweet", "intensity": 65},
        "fashion": {"headwear": "hw_tiara"},
        "background": {"lighting": "warm", "environment": "artistic"}}"#
}

fn scenario_mock() -> Arc<MockCapability> {
    let mock = Arc::new(MockCapability::default());
    {
        let mut replies = mock.scenario_replies.lock();
        replies.insert("职场大女主".to_string(), boss_reply().to_string());
        replies.insert("在逃公主".to_string(), princess_reply().to_string());
    }
    mock
}

#[tokio::test]
async fn scenario_application_replaces_all_configs_without_generating() {
    let mock = scenario_mock();
    let session = session(&mock);
    session.analyze().await.unwrap();
    let portraits_before = mock.count("portrait:start");

    let config = session.apply_scenario("boss").await.unwrap();
    assert_eq!(config.beauty.high_class, 85);
    assert_eq!(config.beauty.whiten, 30);
    assert_eq!(config.style, StyleConfig::new(StyleCategory::Status, "executive", 75));
    assert_eq!(config.fashion.get(FashionSlot::Clothing), Some("c_suit"));
    assert_eq!(config.background.environment, "indoor");
    assert_eq!(session.config(), config);
    assert_eq!(mock.count("portrait:start"), portraits_before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_observers_never_see_a_mixed_scenario() {
    let mock = scenario_mock();
    let session = session(&mock);
    let empty = CustomPrompts::new();
    let boss = config_from_partial(&parse_json_reply(boss_reply()).unwrap(), &empty);
    let princess = config_from_partial(&parse_json_reply(princess_reply()).unwrap(), &empty);
    let initial = session.config();

    let stop = Arc::new(AtomicBool::new(false));
    let started = Arc::new(AtomicBool::new(false));
    let observer = {
        let session = session.clone();
        let stop = Arc::clone(&stop);
        let started = Arc::clone(&started);
        let allowed = vec![initial, boss.clone(), princess.clone()];
        std::thread::spawn(move || {
            let mut observed = 0usize;
            started.store(true, Ordering::SeqCst);
            while !stop.load(Ordering::SeqCst) {
                let snapshot = session.config();
                if !allowed.contains(&snapshot) {
                    return Err(snapshot);
                }
                observed += 1;
            }
            Ok(observed)
        })
    };

    while !started.load(Ordering::SeqCst) {
        std::thread::yield_now();
    }
    for round in 0..40 {
        let id = if round % 2 == 0 { "boss" } else { "princess" };
        session.apply_scenario(id).await.unwrap();
    }
    stop.store(true, Ordering::SeqCst);

    observer.join().unwrap().expect("observer saw a mixed config");
    assert_eq!(session.config(), princess);
}

#[tokio::test]
async fn unknown_or_failing_scenarios_leave_the_config_alone() {
    let mock = scenario_mock();
    let session = session(&mock);
    let before = session.config();

    let err = session.apply_scenario("astronaut").await.unwrap_err();
    assert!(matches!(err, StudioError::UnknownScenario(id) if id == "astronaut"));

    mock.fail_text.store(true, Ordering::SeqCst);
    let err = session.apply_scenario("boss").await.unwrap_err();
    assert!(matches!(err, StudioError::ScenarioResolutionFailed { .. }));
    assert_eq!(session.config(), before);
}

#[tokio::test]
async fn on_change_policy_regenerates_the_active_view() {
    let mock = Arc::new(MockCapability::default());
    let session = session_with(
        &mock,
        SessionOptions {
            regeneration_policy: RegenerationPolicy::OnChange,
            ..SessionOptions::default()
        },
    );

    assert!(!session.set_beauty_dial(BeautyDial::Jawline, 40).await.unwrap());
    session.analyze().await.unwrap();

    assert!(session.set_beauty_dial(BeautyDial::Jawline, 60).await.unwrap());
    assert_eq!(clean_text(&session, PortraitView::Front), "front-clean-2");
    assert!(!session.set_beauty_dial(BeautyDial::Jawline, 60).await.unwrap());
    assert_eq!(mock.count("portrait:start"), 2);
}

#[tokio::test]
async fn manual_policy_never_regenerates_on_edit() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();

    assert!(!session
        .select_style(StyleCategory::Classical, "xionghun", 80)
        .await
        .unwrap());
    assert_eq!(mock.count("portrait:start"), 1);
    let prompt = session.portrait_prompt(PortraitView::Front);
    assert!(prompt.contains("an extremely intense, dominant"));
}

#[tokio::test]
async fn unresolvable_style_edits_fall_back_to_clinical() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session
        .select_style(StyleCategory::Tweak, "not_in_lexicon", 90)
        .await
        .unwrap();
    let style = session.config().style;
    assert_eq!(style.category, StyleCategory::Clinical);
    assert_eq!(style.intensity, 90);
}

#[tokio::test]
async fn fashion_toggles_through_the_session() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.toggle_fashion(FashionSlot::Necklace, "n_pearl").await.unwrap();
    assert_eq!(session.config().fashion.get(FashionSlot::Necklace), Some("n_pearl"));
    session.toggle_fashion(FashionSlot::Necklace, "n_pearl").await.unwrap();
    assert_eq!(session.config().fashion.get(FashionSlot::Necklace), None);
}

#[tokio::test]
async fn seeded_hairstyle_randomisation_is_deterministic() {
    let picks = |seed: u64| async move {
        let mock = Arc::new(MockCapability::default());
        let session = session_with(
            &mock,
            SessionOptions {
                seed: Some(seed),
                ..SessionOptions::default()
            },
        );
        let mut ids = Vec::new();
        for _ in 0..6 {
            let pick = session.randomize_hairstyle().await.unwrap().unwrap();
            assert_eq!(
                session.config().fashion.get(FashionSlot::Hairstyle),
                Some(pick.id.as_str())
            );
            ids.push(pick.id);
        }
        ids
    };

    let first = picks(42).await;
    let second = picks(42).await;
    assert_eq!(first, second);
    let hairstyles: Vec<String> = default_fashion_options()[&FashionSlot::Hairstyle]
        .iter()
        .map(|item| item.id.clone())
        .collect();
    assert!(first.iter().all(|id| hairstyles.contains(id)));
}

#[tokio::test]
async fn suggested_options_extend_lists_and_custom_prompts() {
    let mock = Arc::new(MockCapability::default());
    *mock.option_replies.lock() = vec![
        SuggestedOption {
            id: "h_mermaid".to_string(),
            label: "人鱼卷".to_string(),
            tip: Some("海边度假".to_string()),
            prompt: "Hairstyle: Long mermaid waves, glossy.".to_string(),
        },
        SuggestedOption {
            id: "h_bob".to_string(),
            label: "重复".to_string(),
            tip: None,
            prompt: "duplicate".to_string(),
        },
        SuggestedOption {
            id: " ".to_string(),
            label: "空".to_string(),
            tip: None,
            prompt: "ignored".to_string(),
        },
    ];
    let session = session(&mock);
    let before = session.fashion_options(FashionSlot::Hairstyle).len();

    let added = session
        .refresh_options(OptionKind::Fashion, "hairstyle")
        .await
        .unwrap();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].id, "h_mermaid");
    assert_eq!(session.fashion_options(FashionSlot::Hairstyle).len(), before + 1);
    assert_eq!(
        session.custom_prompts().get("h_mermaid").map(String::as_str),
        Some("Hairstyle: Long mermaid waves, glossy.")
    );
    assert!(!session.custom_prompts().contains_key("h_bob"));

    session.toggle_fashion(FashionSlot::Hairstyle, "h_mermaid").await.unwrap();
    assert!(session
        .portrait_prompt(PortraitView::Side45)
        .contains("Long mermaid waves"));
}

#[tokio::test]
async fn option_suggestion_failures_add_nothing() {
    let mock = Arc::new(MockCapability::default());
    mock.fail_text.store(true, Ordering::SeqCst);
    let session = session(&mock);
    let added = session.refresh_options(OptionKind::Style, "mood").await.unwrap();
    assert!(added.is_empty());

    let err = session
        .refresh_options(OptionKind::Style, "clinical")
        .await
        .unwrap_err();
    assert!(matches!(err, StudioError::UnknownCategory { kind: "style", .. }));
}

#[tokio::test]
async fn scenario_suggestions_replace_presets_only_when_non_empty() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    let defaults = session.scenario_presets();

    assert_eq!(session.refresh_scenarios().await, defaults);

    *mock.scenario_suggestions.lock() = vec![
        ScenarioPreset {
            id: "cyber_rebel".to_string(),
            name: "赛博叛客".to_string(),
            icon: "🤖".to_string(),
            description: "霓虹、机能、冷酷".to_string(),
        },
        ScenarioPreset {
            id: "cyber_rebel".to_string(),
            name: "重复".to_string(),
            icon: String::new(),
            description: String::new(),
        },
    ];
    let presets = session.refresh_scenarios().await;
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[0].name, "赛博叛客");

    mock.fail_text.store(true, Ordering::SeqCst);
    assert_eq!(session.refresh_scenarios().await, presets);
}

#[tokio::test]
async fn chat_keeps_history_and_falls_back_on_failure() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);

    let reply = session.chat("下颌线怎么改善？").await;
    assert_eq!(reply.text, "第1轮回答");
    assert_eq!(reply.suggested_questions, vec!["a", "b", "c"]);

    let reply = session.chat("还有别的吗").await;
    assert_eq!(reply.text, "第2轮回答");
    assert_eq!(session.chat_history().len(), 4);

    mock.fail_text.store(true, Ordering::SeqCst);
    let reply = session.chat("再说一次").await;
    assert_eq!(reply.text, CHAT_FALLBACK_REPLY);
    let history = session.chat_history();
    assert_eq!(history.len(), 6);
    assert_eq!(history[5].role, ChatRole::Model);

    assert_eq!(session.chat("   ").await, ChatReply::default());
    assert_eq!(session.chat_history().len(), 6);
}

#[tokio::test]
async fn explanations_fall_back_to_fixed_texts() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    assert!(session.explain(" 法兰克福平面 ").await.contains("法兰克福平面"));
    assert_eq!(session.explain("").await, EXPLAIN_EMPTY_TEXT);
    mock.fail_text.store(true, Ordering::SeqCst);
    assert_eq!(session.explain("E-line").await, EXPLAIN_FAILED_TEXT);
}

#[tokio::test]
async fn saved_presets_restore_a_configuration() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.set_beauty_dial(BeautyDial::Rich, 70).await.unwrap();
    let saved = session.save_preset("  约会妆 ");
    assert_eq!(saved.name, "约会妆");
    assert_eq!(session.saved_presets()[0].id, saved.id);

    session.set_beauty_dial(BeautyDial::Rich, 0).await.unwrap();
    let restored = session.apply_saved_preset(&saved.id).unwrap();
    assert_eq!(restored.beauty.rich, 70);
    assert_eq!(session.config().beauty.rich, 70);

    session.delete_preset(&saved.id).unwrap();
    assert!(session.saved_presets().is_empty());
    assert!(matches!(
        session.delete_preset(&saved.id),
        Err(StudioError::UnknownPreset(_))
    ));
    assert!(matches!(
        session.apply_saved_preset("missing"),
        Err(StudioError::UnknownPreset(_))
    ));
}

#[tokio::test]
async fn clearing_the_image_discards_the_report() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();
    assert!(session.report().is_some());

    session.clear_image().unwrap();
    assert_eq!(session.phase(), Phase::Idle);
    assert!(session.report().is_none());
    assert!(matches!(
        session.analyze().await,
        Err(StudioError::NoImageSelected)
    ));
}

#[tokio::test]
async fn hiding_annotations_displays_the_clean_image() {
    let mock = Arc::new(MockCapability::default());
    let session = session(&mock);
    session.analyze().await.unwrap();
    assert_eq!(
        session.display_image(PortraitView::Front).as_deref(),
        Some(&b"front-clean-1+annotated"[..])
    );
    session.set_show_annotations(false);
    assert_eq!(
        session.display_image(PortraitView::Front).as_deref(),
        Some(&b"front-clean-1"[..])
    );
}
