use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::{info, warn};

use crate::portrait::lexicon::default_scenario_presets;
use crate::portrait::types::{AiLength, AiTone, ScenarioPreset, ToneSettings};
use crate::session::{RegenerationPolicy, SessionOptions};

#[derive(Debug, Clone, Deserialize)]
struct ScenarioPresetsFile {
    scenarios: Vec<ScenarioPresetEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct ScenarioPresetEntry {
    id: String,
    name: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub log_dir: String,
    pub gemini_api_key: String,
    pub gemini_text_model: String,
    pub gemini_image_model: String,
    pub gemini_temperature: f32,
    pub gemini_safety_settings: String,
    pub gemini_request_timeout_seconds: u64,
    pub gemini_max_retry_attempts: usize,
    pub annotations_enabled: bool,
    pub regeneration_policy: RegenerationPolicy,
    pub ai_tone: AiTone,
    pub ai_length: AiLength,
    pub upload_max_dimension: u32,
    pub analysis_jpeg_quality: u8,
    pub portrait_jpeg_quality: u8,
    pub scenarios_path: PathBuf,
    pub scenario_presets: Vec<ScenarioPreset>,
    pub random_seed: Option<u64>,
    pub output_dir: PathBuf,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Failed to load configuration"));

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|value| value.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<f32>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_quality(name: &str, default: u8) -> u8 {
    let value = env_u64(name, default as u64);
    if (1..=100).contains(&value) {
        value as u8
    } else {
        warn!("{name}={value} is outside 1..=100; using {default}.");
        default
    }
}

fn normalize_gemini_safety_settings(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "permissive".to_string();
    }

    let lowered = trimmed.to_lowercase();
    match lowered.as_str() {
        "permissive" | "off" | "none" => "permissive".to_string(),
        "standard" => "standard".to_string(),
        _ => {
            warn!(
                "Unknown GEMINI_SAFETY_SETTINGS value '{}'; defaulting to permissive.",
                value
            );
            "permissive".to_string()
        }
    }
}

fn normalize_regeneration_policy(value: &str) -> RegenerationPolicy {
    match value.trim().to_lowercase().replace('-', "_").as_str() {
        "" | "manual" => RegenerationPolicy::Manual,
        "on_change" | "onchange" | "auto" => RegenerationPolicy::OnChange,
        other => {
            warn!("Unknown STUDIO_REGENERATION_POLICY value '{other}'; defaulting to manual.");
            RegenerationPolicy::Manual
        }
    }
}

fn normalize_ai_tone(value: &str) -> AiTone {
    match value.trim().to_lowercase().as_str() {
        "" | "standard" => AiTone::Standard,
        "humorous" | "humor" => AiTone::Humorous,
        "scientific" | "science" => AiTone::Scientific,
        other => {
            warn!("Unknown STUDIO_AI_TONE value '{other}'; defaulting to standard.");
            AiTone::Standard
        }
    }
}

fn normalize_ai_length(value: &str) -> AiLength {
    match value.trim().to_lowercase().as_str() {
        "" | "standard" => AiLength::Standard,
        "detailed" => AiLength::Detailed,
        "concise" => AiLength::Concise,
        other => {
            warn!("Unknown STUDIO_AI_LENGTH value '{other}'; defaulting to standard.");
            AiLength::Standard
        }
    }
}

fn resolve_scenarios_path() -> PathBuf {
    let path = PathBuf::from(env_string("STUDIO_SCENARIOS_PATH", "scenarios.json"));
    if path.is_absolute() {
        return path;
    }
    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

fn load_scenario_presets_from_path(path: &Path) -> Vec<ScenarioPreset> {
    if !path.exists() {
        info!("Scenario preset file not found at {}", path.display());
        return Vec::new();
    }

    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            info!(
                "Failed to read scenario preset file at {}: {}",
                path.display(),
                err
            );
            return Vec::new();
        }
    };

    let parsed: ScenarioPresetsFile = match serde_json::from_str(&raw) {
        Ok(data) => data,
        Err(err) => {
            info!(
                "Failed to parse scenario preset file at {}: {}",
                path.display(),
                err
            );
            return Vec::new();
        }
    };

    let mut presets = Vec::new();
    for entry in parsed.scenarios {
        let id = entry.id.trim();
        let name = entry.name.trim();
        if id.is_empty() || name.is_empty() {
            continue;
        }
        presets.push(ScenarioPreset {
            id: id.to_string(),
            name: name.to_string(),
            icon: entry.icon.unwrap_or_default().trim().to_string(),
            description: entry.description.unwrap_or_default().trim().to_string(),
        });
    }
    presets
}

fn build_scenario_presets(path: &Path) -> Vec<ScenarioPreset> {
    let presets = load_scenario_presets_from_path(path);
    if !presets.is_empty() {
        info!(
            "Loaded {} scenario preset(s) from {}",
            presets.len(),
            path.display()
        );
        return presets;
    }
    info!("Using built-in scenario presets");
    default_scenario_presets()
}

impl Config {
    pub fn load() -> Result<Self> {
        let random_seed = match env::var("STUDIO_RANDOM_SEED") {
            Ok(value) if !value.trim().is_empty() => Some(
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|err| anyhow::anyhow!("STUDIO_RANDOM_SEED must be a u64: {err}"))?,
            ),
            _ => None,
        };

        let upload_max_dimension = env_u64("STUDIO_UPLOAD_MAX_DIMENSION", 1024);
        if upload_max_dimension == 0 || upload_max_dimension > u32::MAX as u64 {
            return Err(anyhow::anyhow!(
                "STUDIO_UPLOAD_MAX_DIMENSION must be a positive pixel count"
            ));
        }

        let scenarios_path = resolve_scenarios_path();
        let scenario_presets = build_scenario_presets(&scenarios_path);

        Ok(Config {
            log_level: env_string("LOG_LEVEL", "info"),
            log_dir: env_string("LOG_DIR", "logs"),
            gemini_api_key: env_string("GEMINI_API_KEY", "").trim().to_string(),
            gemini_text_model: env_string("GEMINI_TEXT_MODEL", "gemini-2.5-flash"),
            gemini_image_model: env_string("GEMINI_IMAGE_MODEL", "gemini-2.5-flash-image"),
            gemini_temperature: env_f32("GEMINI_TEMPERATURE", 0.7),
            gemini_safety_settings: normalize_gemini_safety_settings(env_string(
                "GEMINI_SAFETY_SETTINGS",
                "permissive",
            )),
            gemini_request_timeout_seconds: env_u64("GEMINI_REQUEST_TIMEOUT_SECONDS", 90).max(1),
            gemini_max_retry_attempts: env_usize("GEMINI_MAX_RETRY_ATTEMPTS", 2).max(1),
            annotations_enabled: env_bool("STUDIO_ANNOTATIONS", true),
            regeneration_policy: normalize_regeneration_policy(&env_string(
                "STUDIO_REGENERATION_POLICY",
                "manual",
            )),
            ai_tone: normalize_ai_tone(&env_string("STUDIO_AI_TONE", "standard")),
            ai_length: normalize_ai_length(&env_string("STUDIO_AI_LENGTH", "standard")),
            upload_max_dimension: upload_max_dimension as u32,
            analysis_jpeg_quality: env_quality("STUDIO_ANALYSIS_JPEG_QUALITY", 70),
            portrait_jpeg_quality: env_quality("STUDIO_PORTRAIT_JPEG_QUALITY", 80),
            scenarios_path,
            scenario_presets,
            random_seed,
            output_dir: PathBuf::from(env_string("STUDIO_OUTPUT_DIR", "output")),
        })
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            annotations_enabled: self.annotations_enabled,
            regeneration_policy: self.regeneration_policy,
            tone: ToneSettings {
                tone: self.ai_tone,
                length: self.ai_length,
            },
            scenario_presets: self.scenario_presets.clone(),
            seed: self.random_seed,
        }
    }
}
