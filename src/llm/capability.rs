use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::portrait::types::{
    clamp_dial, AestheticScores, AnalysisResult, OptionItem, PortraitView, ScenarioPreset,
};

/// Shared, immutable image payload. Cloning never copies the bytes.
pub type ImageBytes = Arc<[u8]>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CapabilityError {
    #[error("AI request failed: {0}")]
    Request(String),
    #[error("AI response contained no image")]
    NoImage,
    #[error("AI response could not be parsed: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    pub system_instruction: Option<String>,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortraitRequest {
    pub view: PortraitView,
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRequest {
    pub view: PortraitView,
    pub instruction: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub system_instruction: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    #[serde(default, rename = "response")]
    pub text: String,
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawScores {
    #[serde(default)]
    pub eyes: f64,
    #[serde(default)]
    pub cheeks: f64,
    #[serde(default)]
    pub lips: f64,
    #[serde(default)]
    pub brows: f64,
    #[serde(default)]
    pub jawline: f64,
    #[serde(default)]
    pub symmetry: f64,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisPayload {
    #[serde(default)]
    pub scores: RawScores,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn score(value: f64) -> u8 {
    if value.is_finite() {
        clamp_dial(value.round() as i64)
    } else {
        0
    }
}

impl AnalysisPayload {
    pub fn into_result(self, timestamp: i64) -> AnalysisResult {
        let raw = self.scores;
        AnalysisResult {
            scores: AestheticScores {
                eyes: score(raw.eyes),
                cheeks: score(raw.cheeks),
                lips: score(raw.lips),
                brows: score(raw.brows),
                jawline: score(raw.jawline),
                symmetry: score(raw.symmetry),
                total: score(raw.total),
            },
            summary: self.summary.trim().to_string(),
            keywords: self
                .keywords
                .into_iter()
                .map(|keyword| keyword.trim().to_string())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuggestedOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub tip: Option<String>,
    #[serde(default)]
    pub prompt: String,
}

impl SuggestedOption {
    pub fn option_item(&self) -> OptionItem {
        OptionItem {
            id: self.id.clone(),
            label: self.label.clone(),
            tip: self.tip.clone().filter(|tip| !tip.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialStyle {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "subOption", alias = "sub_option")]
    pub sub_option: Option<String>,
    #[serde(default)]
    pub intensity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialBackground {
    #[serde(default)]
    pub lighting: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
}

/// A scenario configuration as returned by the model. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialStudioConfig {
    #[serde(default)]
    pub beauty: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub style: Option<PartialStyle>,
    #[serde(default)]
    pub fashion: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub background: Option<PartialBackground>,
}

/// Port to the generative-AI service.
#[async_trait]
pub trait AestheticCapability: Send + Sync {
    async fn analyze_aesthetics(
        &self,
        image: &[u8],
        request: &TextRequest,
    ) -> Result<AnalysisPayload, CapabilityError>;

    async fn generate_portrait(
        &self,
        image: &[u8],
        request: &PortraitRequest,
    ) -> Result<Vec<u8>, CapabilityError>;

    async fn generate_annotation(
        &self,
        clean_image: &[u8],
        request: &AnnotationRequest,
    ) -> Result<Vec<u8>, CapabilityError>;

    async fn suggest_options(
        &self,
        request: &TextRequest,
    ) -> Result<Vec<SuggestedOption>, CapabilityError>;

    async fn suggest_scenarios(
        &self,
        request: &TextRequest,
    ) -> Result<Vec<ScenarioPreset>, CapabilityError>;

    async fn resolve_scenario(
        &self,
        request: &TextRequest,
    ) -> Result<PartialStudioConfig, CapabilityError>;

    async fn explain_term(&self, request: &TextRequest) -> Result<String, CapabilityError>;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, CapabilityError>;
}

static JSON_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("valid json fence regex")
});

/// Parses a JSON reply, tolerating a surrounding markdown code fence.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, CapabilityError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CapabilityError::InvalidResponse("empty reply".to_string()));
    }
    let body = JSON_FENCE_RE
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str())
        .unwrap_or(trimmed);
    serde_json::from_str(body).map_err(|err| CapabilityError::InvalidResponse(err.to_string()))
}
