use serde_json::Value;
use tracing::debug;

use crate::llm::capability::PartialStudioConfig;
use crate::portrait::lexicon::style_entry;
use crate::portrait::types::{
    clamp_dial, BackgroundConfig, BeautyConfig, BeautyDial, CustomPrompts, FashionConfig,
    FashionSlot, StudioConfig, StyleCategory, StyleConfig, STANDARD_SUB_OPTION,
};

const DEFAULT_STYLE_INTENSITY: i64 = 50;

fn dial_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v.round() as i64)),
        Value::String(text) => text.trim().parse::<f64>().ok().map(|v| v.round() as i64),
        _ => None,
    }
}

fn option_id(value: &Value) -> Option<&str> {
    let id = value.as_str()?.trim();
    if id.is_empty() || id.eq_ignore_ascii_case("none") || id.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(id)
    }
}

/// Keeps a sub option only if it resolves for its category; otherwise falls back to clinical.
pub fn normalize_style(style: StyleConfig, custom_prompts: &CustomPrompts) -> StyleConfig {
    if style.category == StyleCategory::Clinical {
        return StyleConfig {
            sub_option: STANDARD_SUB_OPTION.to_string(),
            ..style
        };
    }
    let resolves = custom_prompts.contains_key(&style.sub_option)
        || style_entry(style.category, &style.sub_option).is_some();
    if resolves {
        style
    } else {
        debug!(
            "Style sub option '{}' does not resolve for {}; using clinical",
            style.sub_option, style.category
        );
        StyleConfig {
            category: StyleCategory::Clinical,
            sub_option: STANDARD_SUB_OPTION.to_string(),
            intensity: style.intensity,
        }
    }
}

pub fn normalize_config(config: StudioConfig, custom_prompts: &CustomPrompts) -> StudioConfig {
    StudioConfig {
        beauty: config.beauty.clamped(),
        style: normalize_style(config.style, custom_prompts),
        fashion: config.fashion,
        background: config.background,
    }
}

/// Builds a full configuration from a possibly partial model reply.
/// Missing sections take the documented defaults; missing dials inside a present
/// beauty section keep their default value.
pub fn config_from_partial(partial: &PartialStudioConfig, custom_prompts: &CustomPrompts) -> StudioConfig {
    let mut beauty = BeautyConfig::default();
    if let Some(dials) = &partial.beauty {
        for (key, value) in dials {
            match (BeautyDial::from_key(key), dial_value(value)) {
                (Some(dial), Some(value)) => beauty.set(dial, value),
                _ => debug!("Ignoring scenario beauty entry {key}={value}"),
            }
        }
    }

    let style = match &partial.style {
        Some(style) => StyleConfig {
            category: style
                .category
                .as_deref()
                .and_then(StyleCategory::from_str)
                .unwrap_or(StyleCategory::Clinical),
            sub_option: style
                .sub_option
                .as_deref()
                .map(str::trim)
                .filter(|sub| !sub.is_empty())
                .unwrap_or(STANDARD_SUB_OPTION)
                .to_string(),
            intensity: clamp_dial(
                style
                    .intensity
                    .filter(|v| v.is_finite())
                    .map(|v| v.round() as i64)
                    .unwrap_or(DEFAULT_STYLE_INTENSITY),
            ),
        },
        None => StyleConfig::default(),
    };

    let mut fashion = FashionConfig::default();
    if let Some(slots) = &partial.fashion {
        for (key, value) in slots {
            if let (Some(slot), Some(id)) = (FashionSlot::from_str(key), option_id(value)) {
                fashion.set(slot, id);
            }
        }
    }

    let mut background = BackgroundConfig::default();
    if let Some(partial_background) = &partial.background {
        if let Some(lighting) = partial_background
            .lighting
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
        {
            background.lighting = lighting.to_string();
        }
        if let Some(environment) = partial_background
            .environment
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
        {
            background.environment = environment.to_string();
        }
    }

    normalize_config(
        StudioConfig {
            beauty,
            style,
            fashion,
            background,
        },
        custom_prompts,
    )
}
