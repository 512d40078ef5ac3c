//! The studio session: one explicit state record plus the named operations that
//! move it between `Idle`, `Analyzing`, `Success` and `Error`.
//!
//! State sits behind a single `parking_lot::Mutex` that is never held across an
//! `.await`. Every portrait request carries its view and a ticket; a completion
//! writes only to its own view's slot and only while its ticket is the newest one
//! for that view. Superseded requests are not cancelled, their results are dropped.

mod scenario;
pub mod state;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::error::{StudioError, StudioResult};
use crate::llm::capability::{
    AestheticCapability, AnnotationRequest, CapabilityError, ChatMessage, ChatReply, ChatRole,
    ImageBytes, PortraitRequest,
};
use crate::portrait::consult;
use crate::portrait::lexicon::{
    default_fashion_options, default_scenario_presets, default_style_options,
};
use crate::portrait::types::{
    AnalysisResult, BeautyDial, CustomPrompts, FashionSlot, OptionItem, OptionKind, PortraitView,
    SavedPreset, ScenarioPreset, StudioConfig, StyleCategory, StyleConfig, ToneSettings,
};
use crate::portrait::{compile_annotation_prompt, compile_portrait_prompt};
use crate::utils::timing::{complete_operation_timer, start_operation_timer, OperationTimer};

pub use scenario::{config_from_partial, normalize_config, normalize_style};
pub use state::{Phase, ReportData, SlotStatus, ViewImages, ViewStatus};

use state::SessionState;

pub const CHAT_FALLBACK_REPLY: &str = "抱歉，我遇到了一点问题。";
pub const EXPLAIN_FAILED_TEXT: &str = "解释失败。";
pub const EXPLAIN_EMPTY_TEXT: &str = "无法解释。";
const MAX_SUGGESTED_QUESTIONS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegenerationPolicy {
    /// Config edits never trigger generation.
    #[default]
    Manual,
    /// A config edit in the success phase regenerates the active view.
    OnChange,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Initial value of the annotation toggle.
    pub annotations_enabled: bool,
    pub regeneration_policy: RegenerationPolicy,
    pub tone: ToneSettings,
    pub scenario_presets: Vec<ScenarioPreset>,
    pub seed: Option<u64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            annotations_enabled: true,
            regeneration_policy: RegenerationPolicy::Manual,
            tone: ToneSettings::default(),
            scenario_presets: default_scenario_presets(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOutcome {
    /// The view was already cached; nothing was requested.
    Cached,
    Generated,
    /// A request for the view is already in flight.
    AlreadyLoading,
    /// A newer request for the same view replaced this one before it finished.
    Superseded,
}

impl ViewOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            ViewOutcome::Cached => "cached",
            ViewOutcome::Generated => "generated",
            ViewOutcome::AlreadyLoading => "already_loading",
            ViewOutcome::Superseded => "superseded",
        }
    }
}

struct ViewJob {
    view: PortraitView,
    ticket: u64,
    source: ImageBytes,
    request: PortraitRequest,
}

#[derive(Debug, Clone, Copy)]
enum OptionTarget {
    Style(StyleCategory),
    Fashion(FashionSlot),
}

fn close_timer<T>(timer: &mut OperationTimer, result: &StudioResult<T>, status: &str) {
    match result {
        Ok(_) => complete_operation_timer(timer, status, None),
        Err(err) => complete_operation_timer(timer, "error", Some(err.to_string())),
    }
}

fn portrait_bytes(
    view: PortraitView,
    result: Result<Vec<u8>, CapabilityError>,
) -> StudioResult<ImageBytes> {
    match result {
        Ok(bytes) if bytes.is_empty() => Err(StudioError::NoImageGenerated { view }),
        Ok(bytes) => Ok(Arc::from(bytes)),
        Err(err) => Err(StudioError::portrait(view, err)),
    }
}

#[derive(Clone)]
pub struct StudioSession {
    state: Arc<Mutex<SessionState>>,
    capability: Arc<dyn AestheticCapability>,
    rng: Arc<Mutex<StdRng>>,
    regeneration_policy: RegenerationPolicy,
}

impl StudioSession {
    pub fn new(capability: Arc<dyn AestheticCapability>, options: SessionOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scenario_presets = if options.scenario_presets.is_empty() {
            default_scenario_presets()
        } else {
            options.scenario_presets
        };
        let state = SessionState::new(
            scenario_presets,
            default_style_options(),
            default_fashion_options(),
            options.tone,
            options.annotations_enabled,
        );
        StudioSession {
            state: Arc::new(Mutex::new(state)),
            capability,
            rng: Arc::new(Mutex::new(rng)),
            regeneration_policy: options.regeneration_policy,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase.clone()
    }

    pub fn active_view(&self) -> PortraitView {
        self.state.lock().active_view
    }

    /// Snapshot of all four config objects, read under one lock.
    pub fn config(&self) -> StudioConfig {
        self.state.lock().config.clone()
    }

    pub fn custom_prompts(&self) -> CustomPrompts {
        self.state.lock().custom_prompts.clone()
    }

    pub fn analysis(&self) -> Option<AnalysisResult> {
        self.state.lock().analysis.clone()
    }

    pub fn report(&self) -> Option<ReportData> {
        self.state.lock().report()
    }

    pub fn view_images(&self, view: PortraitView) -> Option<ViewImages> {
        self.state
            .lock()
            .slot(view)
            .and_then(|slot| slot.images.clone())
    }

    pub fn view_status(&self, view: PortraitView) -> ViewStatus {
        self.state
            .lock()
            .slot(view)
            .map(|slot| slot.status())
            .unwrap_or(ViewStatus {
                clean: SlotStatus::Missing,
                annotated: SlotStatus::Missing,
            })
    }

    /// Annotated image when annotations are shown and present, otherwise the clean image.
    pub fn display_image(&self, view: PortraitView) -> Option<ImageBytes> {
        self.state.lock().display_image(view)
    }

    pub fn show_annotations(&self) -> bool {
        self.state.lock().show_annotations
    }

    /// Also decides whether new clean images get an annotation request.
    pub fn set_show_annotations(&self, show: bool) {
        self.state.lock().show_annotations = show;
    }

    pub fn tone(&self) -> ToneSettings {
        self.state.lock().tone
    }

    pub fn set_tone(&self, tone: ToneSettings) {
        self.state.lock().tone = tone;
    }

    pub fn scenario_presets(&self) -> Vec<ScenarioPreset> {
        self.state.lock().scenario_presets.clone()
    }

    pub fn saved_presets(&self) -> Vec<SavedPreset> {
        self.state.lock().saved_presets.clone()
    }

    pub fn style_options(&self, category: StyleCategory) -> Vec<OptionItem> {
        self.state
            .lock()
            .style_options
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }

    pub fn fashion_options(&self, slot: FashionSlot) -> Vec<OptionItem> {
        self.state
            .lock()
            .fashion_options
            .get(&slot)
            .cloned()
            .unwrap_or_default()
    }

    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.state.lock().chat_history.clone()
    }

    /// The instruction a portrait request for `view` would carry right now.
    pub fn portrait_prompt(&self, view: PortraitView) -> String {
        let state = self.state.lock();
        compile_portrait_prompt(view, &state.config, &state.custom_prompts)
    }

    pub fn select_image(&self, bytes: Vec<u8>) -> StudioResult<()> {
        if bytes.is_empty() {
            return Err(StudioError::NoImageSelected);
        }
        let mut state = self.state.lock();
        Self::ensure_not_analyzing(&state, "select_image")?;
        state.source_image = Some(Arc::from(bytes));
        state.clear_report();
        state.chat_history.clear();
        state.phase = Phase::Idle;
        Ok(())
    }

    pub fn clear_image(&self) -> StudioResult<()> {
        let mut state = self.state.lock();
        Self::ensure_not_analyzing(&state, "clear_image")?;
        state.source_image = None;
        state.clear_report();
        state.chat_history.clear();
        state.phase = Phase::Idle;
        Ok(())
    }

    /// Back to `Idle` keeping the selected image, so a failed analysis can be retried.
    pub fn reset(&self) -> StudioResult<()> {
        let mut state = self.state.lock();
        Self::ensure_not_analyzing(&state, "reset")?;
        state.clear_report();
        state.phase = Phase::Idle;
        Ok(())
    }

    fn ensure_not_analyzing(state: &SessionState, operation: &'static str) -> StudioResult<()> {
        if state.phase == Phase::Analyzing {
            return Err(StudioError::InvalidTransition {
                operation,
                phase: state.phase.name(),
            });
        }
        Ok(())
    }

    fn ensure_success(state: &SessionState, operation: &'static str) -> StudioResult<()> {
        if state.phase != Phase::Success {
            return Err(StudioError::InvalidTransition {
                operation,
                phase: state.phase.name(),
            });
        }
        Ok(())
    }

    fn issue_view_job(state: &mut SessionState, view: PortraitView) -> StudioResult<ViewJob> {
        let source = state
            .source_image
            .clone()
            .ok_or(StudioError::NoImageSelected)?;
        let instruction = compile_portrait_prompt(view, &state.config, &state.custom_prompts);
        let ticket = state.issue_ticket();
        state.slot_mut(view).clean_pending = Some(ticket);
        Ok(ViewJob {
            view,
            ticket,
            source,
            request: PortraitRequest { view, instruction },
        })
    }

    /// Runs whole-image analysis and the front portrait concurrently. Both must
    /// succeed; the front annotation follows best-effort.
    pub async fn analyze(&self) -> StudioResult<AnalysisResult> {
        let mut timer = start_operation_timer("analyze", Some(PortraitView::Front.as_str()));
        let result = self.run_analysis().await;
        close_timer(&mut timer, &result, "success");
        result
    }

    async fn run_analysis(&self) -> StudioResult<AnalysisResult> {
        let (analysis_request, job) = {
            let mut state = self.state.lock();
            match state.phase {
                Phase::Idle | Phase::Error(_) => {}
                Phase::Analyzing | Phase::Success => {
                    return Err(StudioError::InvalidTransition {
                        operation: "analyze",
                        phase: state.phase.name(),
                    });
                }
            }
            if state.source_image.is_none() {
                return Err(StudioError::NoImageSelected);
            }
            state.clear_report();
            let job = Self::issue_view_job(&mut state, PortraitView::Front)?;
            state.phase = Phase::Analyzing;
            (consult::analysis_request(&state.tone), job)
        };

        let analysis = async {
            self.capability
                .analyze_aesthetics(&job.source, &analysis_request)
                .await
                .map_err(|err| StudioError::AnalysisFailed(err.to_string()))
        };
        let portrait = async {
            let result = self
                .capability
                .generate_portrait(&job.source, &job.request)
                .await;
            portrait_bytes(job.view, result)
        };

        let (payload, clean) = match tokio::try_join!(analysis, portrait) {
            Ok(joined) => joined,
            Err(err) => {
                warn!("Analysis failed: {err}");
                let mut state = self.state.lock();
                state.fail_clean(job.view, job.ticket);
                state.phase = Phase::Error(err.to_string());
                return Err(err);
            }
        };

        let analysis = payload.into_result(Utc::now().timestamp_millis());
        {
            let mut state = self.state.lock();
            state.analysis = Some(analysis.clone());
            state.complete_clean(job.view, job.ticket, Arc::clone(&clean));
            state.phase = Phase::Success;
        }
        info!(
            "Analysis complete: total={} keywords={}",
            analysis.scores.total,
            analysis.keywords.len()
        );

        self.annotate(job.view, clean).await;
        Ok(analysis)
    }

    /// Shows `view`, generating its clean image (then annotation) only when not cached.
    pub async fn switch_view(&self, view: PortraitView) -> StudioResult<ViewOutcome> {
        let mut timer = start_operation_timer("switch_view", Some(view.as_str()));
        let result = self.run_switch_view(view).await;
        let status = result.as_ref().map(|outcome| outcome.as_str()).unwrap_or("error");
        close_timer(&mut timer, &result, status);
        result
    }

    async fn run_switch_view(&self, view: PortraitView) -> StudioResult<ViewOutcome> {
        let job = {
            let mut state = self.state.lock();
            Self::ensure_success(&state, "switch_view")?;
            state.active_view = view;
            let (cached, loading) = state
                .slot(view)
                .map(|slot| (slot.images.is_some(), slot.clean_pending.is_some()))
                .unwrap_or((false, false));
            if cached {
                debug!("View {view} served from cache");
                return Ok(ViewOutcome::Cached);
            }
            if loading {
                return Ok(ViewOutcome::AlreadyLoading);
            }
            Self::issue_view_job(&mut state, view)?
        };
        self.run_view_job(job).await
    }

    /// Fresh clean image for the active view regardless of cache. Other views are untouched.
    pub async fn regenerate(&self) -> StudioResult<ViewOutcome> {
        let job = {
            let mut state = self.state.lock();
            match Self::ensure_success(&state, "regenerate") {
                Ok(()) => {
                    let view = state.active_view;
                    Self::issue_view_job(&mut state, view)
                }
                Err(err) => Err(err),
            }
        };
        let view = job.as_ref().ok().map(|job| job.view.as_str());
        let mut timer = start_operation_timer("regenerate", view);
        let result = match job {
            Ok(job) => self.run_view_job(job).await,
            Err(err) => Err(err),
        };
        let status = result.as_ref().map(|outcome| outcome.as_str()).unwrap_or("error");
        close_timer(&mut timer, &result, status);
        result
    }

    async fn run_view_job(&self, job: ViewJob) -> StudioResult<ViewOutcome> {
        let result = self
            .capability
            .generate_portrait(&job.source, &job.request)
            .await;
        let clean = match portrait_bytes(job.view, result) {
            Ok(clean) => clean,
            Err(err) => {
                warn!("Portrait generation failed for {}: {err}", job.view);
                self.state.lock().fail_clean(job.view, job.ticket);
                return Err(err);
            }
        };

        let written = self
            .state
            .lock()
            .complete_clean(job.view, job.ticket, Arc::clone(&clean));
        if !written {
            info!(
                "Dropping superseded {} portrait (ticket {})",
                job.view, job.ticket
            );
            return Ok(ViewOutcome::Superseded);
        }

        self.annotate(job.view, clean).await;
        Ok(ViewOutcome::Generated)
    }

    /// Best-effort overlay derived from `clean`, requested only while annotations are shown.
    /// Failures are logged and swallowed.
    async fn annotate(&self, view: PortraitView, clean: ImageBytes) {
        let (ticket, request) = {
            let mut state = self.state.lock();
            if !state.show_annotations {
                return;
            }
            let current = state
                .slot(view)
                .is_some_and(|slot| slot.holds_clean(&clean));
            if !current {
                return;
            }
            let ticket = state.issue_ticket();
            state.slot_mut(view).annotation_pending = Some(ticket);
            let scores = state.analysis.as_ref().map(|analysis| analysis.scores);
            let request = AnnotationRequest {
                view,
                instruction: compile_annotation_prompt(view, scores.as_ref()),
            };
            (ticket, request)
        };

        let failure = match self.capability.generate_annotation(&clean, &request).await {
            Ok(bytes) if !bytes.is_empty() => {
                let attached =
                    self.state
                        .lock()
                        .complete_annotation(view, ticket, &clean, Arc::from(bytes));
                if !attached {
                    debug!("Dropping stale {view} annotation (ticket {ticket})");
                }
                None
            }
            Ok(_) => Some(StudioError::annotation(view, CapabilityError::NoImage)),
            Err(err) => Some(StudioError::annotation(view, err)),
        };
        if let Some(err) = failure {
            warn!("{err}");
            self.state.lock().fail_annotation(view, ticket);
        }
    }

    /// Resolves a named preset through the capability and replaces all four configs at once.
    /// Never triggers generation.
    pub async fn apply_scenario(&self, scenario_id: &str) -> StudioResult<StudioConfig> {
        let mut timer = start_operation_timer("apply_scenario", None);
        let result = self.run_apply_scenario(scenario_id.trim()).await;
        close_timer(&mut timer, &result, "success");
        result
    }

    async fn run_apply_scenario(&self, scenario_id: &str) -> StudioResult<StudioConfig> {
        let preset = self
            .state
            .lock()
            .scenario_presets
            .iter()
            .find(|preset| preset.id == scenario_id)
            .cloned();
        let Some(preset) = preset else {
            return Err(StudioError::UnknownScenario(scenario_id.to_string()));
        };

        let request = consult::scenario_config_request(&preset.name);
        let partial = self
            .capability
            .resolve_scenario(&request)
            .await
            .map_err(|err| StudioError::ScenarioResolutionFailed {
                name: preset.name.clone(),
                message: err.to_string(),
            })?;

        let config = {
            let mut state = self.state.lock();
            let config = config_from_partial(&partial, &state.custom_prompts);
            state.config = config.clone();
            config
        };
        info!("Applied scenario {} ({})", preset.id, preset.name);
        Ok(config)
    }

    pub fn apply_saved_preset(&self, preset_id: &str) -> StudioResult<StudioConfig> {
        let mut state = self.state.lock();
        let preset = state
            .saved_presets
            .iter()
            .find(|preset| preset.id == preset_id)
            .cloned()
            .ok_or_else(|| StudioError::UnknownPreset(preset_id.to_string()))?;
        let config = normalize_config(preset.config, &state.custom_prompts);
        state.config = config.clone();
        Ok(config)
    }

    /// Stores the current configuration under `name`, newest first.
    pub fn save_preset(&self, name: &str) -> SavedPreset {
        let mut state = self.state.lock();
        let timestamp = Utc::now().timestamp_millis();
        let ticket = state.issue_ticket();
        let name = match name.trim() {
            "" => format!("Preset {}", state.saved_presets.len() + 1),
            trimmed => trimmed.to_string(),
        };
        let preset = SavedPreset {
            id: format!("preset-{timestamp}-{ticket}"),
            name,
            timestamp,
            config: state.config.clone(),
        };
        state.saved_presets.insert(0, preset.clone());
        preset
    }

    pub fn delete_preset(&self, preset_id: &str) -> StudioResult<()> {
        let mut state = self.state.lock();
        let before = state.saved_presets.len();
        state.saved_presets.retain(|preset| preset.id != preset_id);
        if state.saved_presets.len() == before {
            return Err(StudioError::UnknownPreset(preset_id.to_string()));
        }
        Ok(())
    }

    /// Replaces the scenario list with fresh suggestions. Keeps the current list on failure.
    pub async fn refresh_scenarios(&self) -> Vec<ScenarioPreset> {
        let request = consult::scenario_suggestion_request();
        match self.capability.suggest_scenarios(&request).await {
            Ok(suggested) => {
                let mut presets: Vec<ScenarioPreset> = Vec::new();
                for preset in suggested {
                    let id = preset.id.trim();
                    let name = preset.name.trim();
                    if id.is_empty() || name.is_empty() || presets.iter().any(|p| p.id == id) {
                        continue;
                    }
                    presets.push(ScenarioPreset {
                        id: id.to_string(),
                        name: name.to_string(),
                        icon: preset.icon.trim().to_string(),
                        description: preset.description.trim().to_string(),
                    });
                }
                if presets.is_empty() {
                    warn!("Scenario suggestions were empty; keeping current presets");
                } else {
                    self.state.lock().scenario_presets = presets;
                }
            }
            Err(err) => warn!("{}", StudioError::ScenarioSuggestionFailed(err.to_string())),
        }
        self.scenario_presets()
    }

    /// Asks for new options in one style category or fashion slot. New items are appended
    /// to the display list and their prompt fragments recorded as custom prompts.
    /// Returns only the items that were added.
    pub async fn refresh_options(
        &self,
        kind: OptionKind,
        category: &str,
    ) -> StudioResult<Vec<OptionItem>> {
        let target = match kind {
            OptionKind::Style => StyleCategory::from_str(category)
                .filter(|parsed| *parsed != StyleCategory::Clinical)
                .map(OptionTarget::Style),
            OptionKind::Fashion => FashionSlot::from_str(category).map(OptionTarget::Fashion),
        }
        .ok_or_else(|| StudioError::UnknownCategory {
            kind: match kind {
                OptionKind::Style => "style",
                OptionKind::Fashion => "fashion",
            },
            category: category.trim().to_string(),
        })?;

        let (label, existing) = match target {
            OptionTarget::Style(category) => (category.as_str(), self.style_options(category)),
            OptionTarget::Fashion(slot) => (slot.as_str(), self.fashion_options(slot)),
        };
        let request = consult::option_suggestion_request(label, &existing);
        let suggestions = match self.capability.suggest_options(&request).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                warn!("{}", StudioError::OptionSuggestionFailed(err.to_string()));
                return Ok(Vec::new());
            }
        };

        let mut state = self.state.lock();
        let state = &mut *state;
        let list = match target {
            OptionTarget::Style(category) => state.style_options.entry(category).or_default(),
            OptionTarget::Fashion(slot) => state.fashion_options.entry(slot).or_default(),
        };
        let mut added = Vec::new();
        for suggestion in suggestions {
            let mut item = suggestion.option_item();
            item.id = item.id.trim().to_string();
            item.label = item.label.trim().to_string();
            let prompt = suggestion.prompt.trim();
            if item.id.is_empty() || item.label.is_empty() || prompt.is_empty() {
                debug!("Skipping incomplete option suggestion {:?}", suggestion.id);
                continue;
            }
            if list.iter().any(|existing| existing.id == item.id) {
                continue;
            }
            state
                .custom_prompts
                .insert(item.id.clone(), prompt.to_string());
            list.push(item.clone());
            added.push(item);
        }
        info!(
            "Added {} option(s) to {label} ({} total)",
            added.len(),
            list.len()
        );
        Ok(added)
    }

    pub async fn explain(&self, selection: &str) -> String {
        let selection = selection.trim();
        if selection.is_empty() {
            return EXPLAIN_EMPTY_TEXT.to_string();
        }
        let request = consult::explain_request(selection, &self.tone());
        match self.capability.explain_term(&request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => EXPLAIN_EMPTY_TEXT.to_string(),
            Err(err) => {
                warn!("Explanation failed: {err}");
                EXPLAIN_FAILED_TEXT.to_string()
            }
        }
    }

    /// One chat turn. The exchange is appended to the history; failures yield the fallback reply.
    pub async fn chat(&self, message: &str) -> ChatReply {
        let message = message.trim();
        if message.is_empty() {
            return ChatReply::default();
        }
        let request = {
            let state = self.state.lock();
            consult::chat_request(&state.chat_history, message, &state.tone)
        };
        let reply = match self.capability.chat(&request).await {
            Ok(reply) if !reply.text.trim().is_empty() => ChatReply {
                text: reply.text.trim().to_string(),
                suggested_questions: reply
                    .suggested_questions
                    .into_iter()
                    .map(|question| question.trim().to_string())
                    .filter(|question| !question.is_empty())
                    .take(MAX_SUGGESTED_QUESTIONS)
                    .collect(),
            },
            Ok(_) => {
                warn!("Chat reply was empty");
                ChatReply {
                    text: CHAT_FALLBACK_REPLY.to_string(),
                    suggested_questions: Vec::new(),
                }
            }
            Err(err) => {
                warn!("Chat failed: {err}");
                ChatReply {
                    text: CHAT_FALLBACK_REPLY.to_string(),
                    suggested_questions: Vec::new(),
                }
            }
        };

        let mut state = self.state.lock();
        state.chat_history.push(ChatMessage {
            role: ChatRole::User,
            text: message.to_string(),
        });
        state.chat_history.push(ChatMessage {
            role: ChatRole::Model,
            text: reply.text.clone(),
        });
        reply
    }

    /// Applies `edit` to the configuration and re-normalises it. Under
    /// `RegenerationPolicy::OnChange` a real change in the success phase regenerates
    /// the active view. Returns whether a regeneration ran.
    ///
    /// `edit` runs while the session is locked and must not call back into the session.
    pub async fn edit_config<F>(&self, edit: F) -> StudioResult<bool>
    where
        F: FnOnce(&mut StudioConfig) + Send,
    {
        let regenerate = {
            let mut state = self.state.lock();
            let mut next = state.config.clone();
            edit(&mut next);
            let next = normalize_config(next, &state.custom_prompts);
            if next == state.config {
                return Ok(false);
            }
            state.config = next;
            self.regeneration_policy == RegenerationPolicy::OnChange
                && state.phase == Phase::Success
        };
        if regenerate {
            self.regenerate().await?;
        }
        Ok(regenerate)
    }

    pub async fn set_beauty_dial(&self, dial: BeautyDial, value: i64) -> StudioResult<bool> {
        self.edit_config(move |config| config.beauty.set(dial, value))
            .await
    }

    pub async fn select_style(
        &self,
        category: StyleCategory,
        sub_option: &str,
        intensity: i64,
    ) -> StudioResult<bool> {
        let style = StyleConfig::new(category, sub_option, intensity);
        self.edit_config(move |config| config.style = style).await
    }

    /// Toggle semantics: selecting the current option again clears the slot.
    pub async fn toggle_fashion(&self, slot: FashionSlot, option_id: &str) -> StudioResult<bool> {
        let option_id = option_id.to_string();
        self.edit_config(move |config| config.fashion.toggle(slot, &option_id))
            .await
    }

    pub async fn set_background(&self, lighting: &str, environment: &str) -> StudioResult<bool> {
        let lighting = lighting.trim().to_string();
        let environment = environment.trim().to_string();
        self.edit_config(move |config| {
            config.background.lighting = lighting;
            config.background.environment = environment;
        })
        .await
    }

    /// Picks a hairstyle from the current options with the session's seedable RNG.
    pub async fn randomize_hairstyle(&self) -> StudioResult<Option<OptionItem>> {
        let options = self.fashion_options(FashionSlot::Hairstyle);
        let choice = {
            let mut rng = self.rng.lock();
            options.choose(&mut *rng).cloned()
        };
        let Some(choice) = choice else {
            return Ok(None);
        };
        let option_id = choice.id.clone();
        self.edit_config(move |config| config.fashion.set(FashionSlot::Hairstyle, &option_id))
            .await?;
        Ok(Some(choice))
    }
}
