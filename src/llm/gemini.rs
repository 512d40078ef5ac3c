use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::llm::capability::{
    parse_json_reply, AestheticCapability, AnalysisPayload, AnnotationRequest, CapabilityError,
    ChatReply, ChatRequest, PartialStudioConfig, PortraitRequest, SuggestedOption, TextRequest,
};
use crate::llm::media::{decode_base64_image, detect_mime_type, prepare_image, JPEG_MIME};
use crate::portrait::types::ScenarioPreset;
use crate::utils::http::get_http_client;
use crate::utils::timing::log_llm_timing;

const GEMINI_PROVIDER: &str = "gemini";
const GEMINI_RETRY_BASE_DELAY_MS: u64 = 900;
const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub text_model: String,
    pub image_model: String,
    pub temperature: f32,
    pub safety_settings: String,
    pub max_retry_attempts: usize,
    pub upload_max_dimension: u32,
    pub analysis_jpeg_quality: u8,
    pub portrait_jpeg_quality: u8,
}

impl GeminiSettings {
    pub fn from_config(config: &Config) -> Self {
        GeminiSettings {
            api_key: config.gemini_api_key.clone(),
            text_model: config.gemini_text_model.clone(),
            image_model: config.gemini_image_model.clone(),
            temperature: config.gemini_temperature,
            safety_settings: config.gemini_safety_settings.clone(),
            max_retry_attempts: config.gemini_max_retry_attempts,
            upload_max_dimension: config.upload_max_dimension,
            analysis_jpeg_quality: config.analysis_jpeg_quality,
            portrait_jpeg_quality: config.portrait_jpeg_quality,
        }
    }
}

/// `AestheticCapability` backed by the Gemini `generateContent` REST endpoint.
#[derive(Debug, Clone)]
pub struct GeminiStudioClient {
    settings: GeminiSettings,
}

fn gemini_should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn gemini_should_retry_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

fn gemini_retry_delay(attempt: usize) -> Duration {
    let attempt = attempt.max(1) as u64;
    Duration::from_millis(GEMINI_RETRY_BASE_DELAY_MS.saturating_mul(attempt))
}

fn build_safety_settings(profile: &str) -> Vec<Value> {
    let threshold = match profile {
        "standard" => "BLOCK_MEDIUM_AND_ABOVE",
        "permissive" => "OFF",
        _ => {
            warn!(
                "Unknown GEMINI_SAFETY_SETTINGS value '{}', using permissive defaults.",
                profile
            );
            "OFF"
        }
    };

    vec![
        json!({ "category": "HARM_CATEGORY_HARASSMENT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": threshold }),
    ]
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn summarize_gemini_parts(parts: &[Value]) -> Vec<Value> {
    parts
        .iter()
        .map(|part| {
            if let Some(text) = part.get("text").and_then(|value| value.as_str()) {
                json!({ "text": truncate_for_log(text, 200) })
            } else if let Some(inline_data) = part.get("inlineData") {
                let mime_type = inline_data
                    .get("mimeType")
                    .and_then(|value| value.as_str())
                    .unwrap_or("unknown");
                let data_len = inline_data
                    .get("data")
                    .and_then(|value| value.as_str())
                    .map(|value| value.len())
                    .unwrap_or(0);
                json!({ "inlineData": { "mimeType": mime_type, "dataLen": data_len } })
            } else {
                json!({ "unknownPart": true })
            }
        })
        .collect()
}

fn summarize_gemini_payload(payload: &Value) -> Value {
    let mut summary = Map::new();

    if let Some(text) = payload
        .pointer("/systemInstruction/parts/0/text")
        .and_then(|value| value.as_str())
    {
        summary.insert(
            "systemInstruction".to_string(),
            Value::String(truncate_for_log(text, 120)),
        );
    }

    if let Some(contents) = payload.get("contents").and_then(|value| value.as_array()) {
        let summarized_contents = contents
            .iter()
            .map(|content| {
                let role = content
                    .get("role")
                    .and_then(|value| value.as_str())
                    .unwrap_or("user");
                let parts = content
                    .get("parts")
                    .and_then(|value| value.as_array())
                    .map(|parts| summarize_gemini_parts(parts))
                    .unwrap_or_default();
                json!({ "role": role, "parts": parts })
            })
            .collect();
        summary.insert("contents".to_string(), Value::Array(summarized_contents));
    }

    if let Some(config) = payload.get("generationConfig") {
        let mut config = config.clone();
        if let Some(object) = config.as_object_mut() {
            if object.remove("responseSchema").is_some() {
                object.insert("responseSchema".to_string(), json!("<schema>"));
            }
        }
        summary.insert("generationConfig".to_string(), config);
    }

    if let Some(safety) = payload
        .get("safetySettings")
        .and_then(|value| value.as_array())
    {
        summary.insert("safetySettingsCount".to_string(), json!(safety.len()));
    }

    Value::Object(summary)
}

fn summarize_gemini_response(response: &GeminiResponse) -> Value {
    let mut text_parts = 0usize;
    let mut image_parts = 0usize;
    let mut text_preview = None;

    let candidates = response.candidates.as_deref().unwrap_or(&[]);
    for candidate in candidates {
        let parts = candidate
            .content
            .as_ref()
            .and_then(|content| content.parts.as_deref())
            .unwrap_or(&[]);
        for part in parts {
            match part {
                GeminiPart::Text { text } => {
                    text_parts += 1;
                    if text_preview.is_none() && !text.trim().is_empty() {
                        text_preview = Some(truncate_for_log(text, 200));
                    }
                }
                GeminiPart::InlineData { inline_data } => {
                    if inline_data.mime_type.starts_with("image/") {
                        image_parts += 1;
                    }
                }
            }
        }
    }

    json!({
        "candidates": candidates.len(),
        "textParts": text_parts,
        "imageParts": image_parts,
        "textPreview": text_preview
    })
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string())
            });
        return (message, truncate_for_log(&value.to_string(), 2000));
    }

    (None, truncate_for_log(trimmed, 2000))
}

fn inline_image_part(bytes: &[u8], mime_type: &str) -> Value {
    json!({
        "inlineData": {
            "mimeType": mime_type,
            "data": general_purpose::STANDARD.encode(bytes)
        }
    })
}

fn text_part(text: &str) -> Value {
    json!({ "text": text })
}

fn extract_text_from_response(response: GeminiResponse) -> String {
    let mut text_parts = Vec::new();
    for candidate in response.candidates.unwrap_or_default() {
        let parts = candidate
            .content
            .and_then(|content| content.parts)
            .unwrap_or_default();
        for part in parts {
            if let GeminiPart::Text { text } = part {
                if !text.trim().is_empty() {
                    text_parts.push(text);
                }
            }
        }
    }
    text_parts.join("\n")
}

/// First inline image of the first candidate that carries one.
fn extract_first_image_from_response(response: GeminiResponse) -> Option<Vec<u8>> {
    response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .filter_map(|candidate| candidate.content.and_then(|content| content.parts))
        .flatten()
        .find_map(|part| match part {
            GeminiPart::InlineData { inline_data } if inline_data.mime_type.starts_with("image/") => {
                decode_base64_image(&inline_data.data)
            }
            _ => None,
        })
}

fn string_schema() -> Value {
    json!({ "type": "STRING" })
}

fn number_schema() -> Value {
    json!({ "type": "NUMBER" })
}

fn analysis_schema() -> Value {
    let score_keys = ["eyes", "cheeks", "lips", "brows", "jawline", "symmetry", "total"];
    let scores: Map<String, Value> = score_keys
        .iter()
        .map(|key| (key.to_string(), number_schema()))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "scores": { "type": "OBJECT", "properties": scores, "required": score_keys },
            "summary": string_schema(),
            "keywords": { "type": "ARRAY", "items": string_schema() }
        },
        "required": ["scores", "summary", "keywords"]
    })
}

fn options_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": string_schema(),
                "label": string_schema(),
                "tip": string_schema(),
                "prompt": string_schema()
            },
            "required": ["id", "label", "prompt"]
        }
    })
}

fn scenarios_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": string_schema(),
                "name": string_schema(),
                "description": string_schema(),
                "icon": string_schema()
            },
            "required": ["id", "name"]
        }
    })
}

fn fields_schema(keys: &[&str], field: fn() -> Value) -> Map<String, Value> {
    keys.iter().map(|key| (key.to_string(), field())).collect()
}

fn integer_schema() -> Value {
    json!({ "type": "INTEGER" })
}

fn scenario_config_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "beauty": {
                "type": "OBJECT",
                "properties": fields_schema(
                    &["smooth", "whiten", "highClass", "rich", "pure", "darkCircles", "nasolabial", "jawline"],
                    integer_schema,
                )
            },
            "style": {
                "type": "OBJECT",
                "properties": {
                    "category": {
                        "type": "STRING",
                        "enum": ["clinical", "classical", "mood", "status", "tweak"]
                    },
                    "subOption": string_schema(),
                    "intensity": integer_schema()
                }
            },
            "fashion": {
                "type": "OBJECT",
                "properties": fields_schema(
                    &["hairstyle", "headwear", "earrings", "necklace", "clothing", "outerwear", "footwear", "accessories"],
                    string_schema,
                )
            },
            "background": {
                "type": "OBJECT",
                "properties": fields_schema(&["lighting", "environment"], string_schema)
            }
        }
    })
}

fn chat_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "response": string_schema(),
            "suggested_questions": { "type": "ARRAY", "items": string_schema() }
        }
    })
}

impl GeminiStudioClient {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(anyhow!("GEMINI_API_KEY is required"));
        }
        Ok(GeminiStudioClient { settings })
    }

    fn redact_api_key(&self, text: &str) -> String {
        let key = self.settings.api_key.trim();
        if key.is_empty() {
            return text.to_string();
        }
        text.replace(key, "[redacted]")
    }

    fn build_payload(
        &self,
        system_instruction: Option<&str>,
        contents: Vec<Value>,
        generation_config: Value,
    ) -> Value {
        let mut payload = json!({
            "contents": contents,
            "generationConfig": generation_config,
            "safetySettings": build_safety_settings(&self.settings.safety_settings),
        });
        if let (Some(text), Some(object)) = (
            system_instruction.filter(|text| !text.trim().is_empty()),
            payload.as_object_mut(),
        ) {
            object.insert(
                "systemInstruction".to_string(),
                json!({ "parts": [text_part(text)] }),
            );
        }
        payload
    }

    fn json_generation_config(&self, schema: Option<Value>) -> Value {
        let mut config = json!({
            "temperature": self.settings.temperature,
            "responseMimeType": "application/json",
        });
        if let (Some(schema), Some(object)) = (schema, config.as_object_mut()) {
            object.insert("responseSchema".to_string(), schema);
        }
        config
    }

    fn image_generation_config() -> Value {
        json!({ "responseModalities": ["TEXT", "IMAGE"] })
    }

    async fn call_gemini_api(&self, model: &str, payload: &Value) -> Result<GeminiResponse> {
        let client = get_http_client();
        let url = format!(
            "{GEMINI_ENDPOINT}/{}:generateContent?key={}",
            model, self.settings.api_key
        );

        if tracing::enabled!(tracing::Level::DEBUG) {
            let payload_summary = summarize_gemini_payload(payload);
            debug!(target: "llm.gemini", model = model, payload = %payload_summary);
        }

        let max_attempts = self.settings.max_retry_attempts.max(1);
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            let response = match client.post(&url).json(payload).send().await {
                Ok(response) => response,
                Err(err) => {
                    let err_text = self.redact_api_key(&err.to_string());
                    let should_retry = gemini_should_retry_error(&err) && attempt < max_attempts;
                    warn!(
                        "Gemini request failed to send: {} (timeout={}, connect={}, status={:?}, retrying={})",
                        err_text,
                        err.is_timeout(),
                        err.is_connect(),
                        err.status(),
                        should_retry
                    );
                    if should_retry {
                        tokio::time::sleep(gemini_retry_delay(attempt)).await;
                        continue;
                    }
                    return Err(anyhow!("Gemini request failed: {}", err_text));
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let (message, body_summary) = summarize_error_body(&body);
                let should_retry = gemini_should_retry_status(status) && attempt < max_attempts;
                warn!(
                    "Gemini API error: status={}, body={}, retrying={}",
                    status, body_summary, should_retry
                );
                if should_retry {
                    tokio::time::sleep(gemini_retry_delay(attempt)).await;
                    continue;
                }
                let detail = message.unwrap_or(body_summary);
                return Err(anyhow!(
                    "Gemini request failed with status {}: {}",
                    status,
                    detail
                ));
            }

            let value = response
                .json::<GeminiResponse>()
                .await
                .map_err(|err| anyhow!(self.redact_api_key(&err.to_string())))?;
            if tracing::enabled!(tracing::Level::DEBUG) {
                let response_summary = summarize_gemini_response(&value);
                debug!(target: "llm.gemini", model = model, response = %response_summary);
            }
            return Ok(value);
        }
    }

    async fn generate_text(
        &self,
        operation: &str,
        payload: Value,
    ) -> Result<String, CapabilityError> {
        let model = self.settings.text_model.as_str();
        log_llm_timing(GEMINI_PROVIDER, model, operation, None, || async {
            let response = self.call_gemini_api(model, &payload).await?;
            Ok::<_, anyhow::Error>(extract_text_from_response(response))
        })
        .await
        .map_err(|err| CapabilityError::Request(err.to_string()))
    }

    async fn generate_json<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        request: &TextRequest,
        image: Option<&[u8]>,
        schema: Option<Value>,
    ) -> Result<T, CapabilityError> {
        let mut parts = Vec::new();
        if let Some(image) = image {
            let prepared = prepare_image(
                image,
                self.settings.upload_max_dimension,
                self.settings.analysis_jpeg_quality,
            );
            parts.push(inline_image_part(&prepared.bytes, &prepared.mime_type));
        }
        parts.push(text_part(&request.prompt));
        let payload = self.build_payload(
            request.system_instruction.as_deref(),
            vec![json!({ "role": "user", "parts": parts })],
            self.json_generation_config(schema),
        );
        let text = self.generate_text(operation, payload).await?;
        parse_json_reply(&text)
    }

    async fn generate_image(
        &self,
        operation: &str,
        view: &str,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> Result<Vec<u8>, CapabilityError> {
        let model = self.settings.image_model.as_str();
        let payload = self.build_payload(
            None,
            vec![json!({
                "role": "user",
                "parts": [inline_image_part(image, mime_type), text_part(instruction)]
            })],
            Self::image_generation_config(),
        );
        let response = log_llm_timing(
            GEMINI_PROVIDER,
            model,
            operation,
            Some(json!({ "view": view })),
            || async { self.call_gemini_api(model, &payload).await },
        )
        .await
        .map_err(|err| CapabilityError::Request(err.to_string()))?;

        extract_first_image_from_response(response).ok_or_else(|| {
            warn!("Gemini returned no image for {operation} (view={view}, model={model})");
            CapabilityError::NoImage
        })
    }
}

#[async_trait]
impl AestheticCapability for GeminiStudioClient {
    async fn analyze_aesthetics(
        &self,
        image: &[u8],
        request: &TextRequest,
    ) -> Result<AnalysisPayload, CapabilityError> {
        self.generate_json("analyze_aesthetics", request, Some(image), Some(analysis_schema()))
            .await
    }

    async fn generate_portrait(
        &self,
        image: &[u8],
        request: &PortraitRequest,
    ) -> Result<Vec<u8>, CapabilityError> {
        let prepared = prepare_image(
            image,
            self.settings.upload_max_dimension,
            self.settings.portrait_jpeg_quality,
        );
        self.generate_image(
            "generate_portrait",
            request.view.as_str(),
            &prepared.bytes,
            &prepared.mime_type,
            &request.instruction,
        )
        .await
    }

    async fn generate_annotation(
        &self,
        clean_image: &[u8],
        request: &AnnotationRequest,
    ) -> Result<Vec<u8>, CapabilityError> {
        let mime_type = detect_mime_type(clean_image).unwrap_or_else(|| JPEG_MIME.to_string());
        self.generate_image(
            "generate_annotation",
            request.view.as_str(),
            clean_image,
            &mime_type,
            &request.instruction,
        )
        .await
    }

    async fn suggest_options(
        &self,
        request: &TextRequest,
    ) -> Result<Vec<SuggestedOption>, CapabilityError> {
        self.generate_json("suggest_options", request, None, Some(options_schema()))
            .await
    }

    async fn suggest_scenarios(
        &self,
        request: &TextRequest,
    ) -> Result<Vec<ScenarioPreset>, CapabilityError> {
        self.generate_json("suggest_scenarios", request, None, Some(scenarios_schema()))
            .await
    }

    async fn resolve_scenario(
        &self,
        request: &TextRequest,
    ) -> Result<PartialStudioConfig, CapabilityError> {
        self.generate_json(
            "resolve_scenario",
            request,
            None,
            Some(scenario_config_schema()),
        )
        .await
    }

    async fn explain_term(&self, request: &TextRequest) -> Result<String, CapabilityError> {
        let payload = self.build_payload(
            request.system_instruction.as_deref(),
            vec![json!({ "role": "user", "parts": [text_part(&request.prompt)] })],
            json!({ "temperature": self.settings.temperature }),
        );
        self.generate_text("explain_term", payload).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, CapabilityError> {
        let mut contents: Vec<Value> = request
            .history
            .iter()
            .map(|message| json!({ "role": message.role.as_str(), "parts": [text_part(&message.text)] }))
            .collect();
        contents.push(json!({ "role": "user", "parts": [text_part(&request.message)] }));
        let payload = self.build_payload(
            Some(&request.system_instruction),
            contents,
            self.json_generation_config(Some(chat_schema())),
        );
        let text = self.generate_text("chat", payload).await?;
        parse_json_reply(&text)
    }
}
