use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::llm::capability::{ChatMessage, ImageBytes};
use crate::portrait::types::{
    AnalysisResult, CustomPrompts, FashionSlot, OptionItem, PortraitView, SavedPreset,
    ScenarioPreset, StudioConfig, StyleCategory, ToneSettings,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Analyzing,
    Success,
    Error(String),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Analyzing => "analyzing",
            Phase::Success => "success",
            Phase::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Missing,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewStatus {
    pub clean: SlotStatus,
    pub annotated: SlotStatus,
}

/// One view's images. Always replaced as a whole record.
#[derive(Debug, Clone)]
pub struct ViewImages {
    pub clean: ImageBytes,
    pub annotated: Option<ImageBytes>,
}

impl ViewImages {
    pub fn clean(clean: ImageBytes) -> Self {
        ViewImages {
            clean,
            annotated: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportData {
    pub analysis: AnalysisResult,
    pub images: HashMap<PortraitView, ViewImages>,
}

#[derive(Debug, Default)]
pub(crate) struct ViewSlot {
    pub images: Option<ViewImages>,
    /// Ticket of the newest clean request; older completions are dropped.
    pub clean_pending: Option<u64>,
    pub annotation_pending: Option<u64>,
}

impl ViewSlot {
    pub fn status(&self) -> ViewStatus {
        let clean = if self.clean_pending.is_some() {
            SlotStatus::Loading
        } else if self.images.is_some() {
            SlotStatus::Ready
        } else {
            SlotStatus::Missing
        };
        let annotated = if self.annotation_pending.is_some() {
            SlotStatus::Loading
        } else if self
            .images
            .as_ref()
            .is_some_and(|images| images.annotated.is_some())
        {
            SlotStatus::Ready
        } else {
            SlotStatus::Missing
        };
        ViewStatus { clean, annotated }
    }

    /// True when `clean` is still the image this slot displays.
    pub fn holds_clean(&self, clean: &ImageBytes) -> bool {
        self.images
            .as_ref()
            .is_some_and(|images| Arc::ptr_eq(&images.clean, clean))
    }
}

pub(crate) struct SessionState {
    pub phase: Phase,
    pub source_image: Option<ImageBytes>,
    pub active_view: PortraitView,
    pub config: StudioConfig,
    pub custom_prompts: CustomPrompts,
    pub style_options: BTreeMap<StyleCategory, Vec<OptionItem>>,
    pub fashion_options: BTreeMap<FashionSlot, Vec<OptionItem>>,
    pub scenario_presets: Vec<ScenarioPreset>,
    pub saved_presets: Vec<SavedPreset>,
    pub analysis: Option<AnalysisResult>,
    pub slots: HashMap<PortraitView, ViewSlot>,
    pub show_annotations: bool,
    pub tone: ToneSettings,
    pub chat_history: Vec<ChatMessage>,
    next_ticket: u64,
}

impl SessionState {
    pub fn new(
        scenario_presets: Vec<ScenarioPreset>,
        style_options: BTreeMap<StyleCategory, Vec<OptionItem>>,
        fashion_options: BTreeMap<FashionSlot, Vec<OptionItem>>,
        tone: ToneSettings,
        show_annotations: bool,
    ) -> Self {
        SessionState {
            phase: Phase::Idle,
            source_image: None,
            active_view: PortraitView::Front,
            config: StudioConfig::default(),
            custom_prompts: CustomPrompts::new(),
            style_options,
            fashion_options,
            scenario_presets,
            saved_presets: Vec::new(),
            analysis: None,
            slots: HashMap::new(),
            show_annotations,
            tone,
            chat_history: Vec::new(),
            next_ticket: 0,
        }
    }

    pub fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    pub fn slot(&self, view: PortraitView) -> Option<&ViewSlot> {
        self.slots.get(&view)
    }

    pub fn slot_mut(&mut self, view: PortraitView) -> &mut ViewSlot {
        self.slots.entry(view).or_default()
    }

    /// Drops the report and every per-view slot. Pending completions no longer match a ticket.
    pub fn clear_report(&mut self) {
        self.analysis = None;
        self.slots.clear();
        self.active_view = PortraitView::Front;
    }

    pub fn report(&self) -> Option<ReportData> {
        let analysis = self.analysis.clone()?;
        let images = self
            .slots
            .iter()
            .filter_map(|(view, slot)| slot.images.clone().map(|images| (*view, images)))
            .collect();
        Some(ReportData { analysis, images })
    }

    /// Writes a finished clean image if `ticket` is still the newest request for the view.
    pub fn complete_clean(&mut self, view: PortraitView, ticket: u64, clean: ImageBytes) -> bool {
        let slot = self.slot_mut(view);
        if slot.clean_pending != Some(ticket) {
            return false;
        }
        slot.clean_pending = None;
        slot.annotation_pending = None;
        slot.images = Some(ViewImages::clean(clean));
        true
    }

    pub fn fail_clean(&mut self, view: PortraitView, ticket: u64) -> bool {
        let slot = self.slot_mut(view);
        if slot.clean_pending != Some(ticket) {
            return false;
        }
        slot.clean_pending = None;
        true
    }

    /// Attaches an annotation only to the clean image it was derived from.
    pub fn complete_annotation(
        &mut self,
        view: PortraitView,
        ticket: u64,
        clean: &ImageBytes,
        annotated: ImageBytes,
    ) -> bool {
        let Some(slot) = self.slots.get_mut(&view) else {
            return false;
        };
        if slot.annotation_pending != Some(ticket) || !slot.holds_clean(clean) {
            return false;
        }
        slot.annotation_pending = None;
        slot.images = Some(ViewImages {
            clean: Arc::clone(clean),
            annotated: Some(annotated),
        });
        true
    }

    pub fn fail_annotation(&mut self, view: PortraitView, ticket: u64) {
        if let Some(slot) = self.slots.get_mut(&view) {
            if slot.annotation_pending == Some(ticket) {
                slot.annotation_pending = None;
            }
        }
    }

    pub fn display_image(&self, view: PortraitView) -> Option<ImageBytes> {
        let images = self.slot(view)?.images.as_ref()?;
        match (&images.annotated, self.show_annotations) {
            (Some(annotated), true) => Some(Arc::clone(annotated)),
            _ => Some(Arc::clone(&images.clean)),
        }
    }
}
