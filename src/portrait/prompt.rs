//! Compiles studio configuration into instruction text for the image model.
//!
//! Compilation is lenient: a lookup that cannot be resolved drops its clause
//! instead of failing, so every configuration produces a prompt.

use crate::portrait::lexicon::{
    environment_entry, fashion_entry, lighting_entry, style_entry, DEFAULT_ENVIRONMENT,
    DEFAULT_LIGHTING,
};
use crate::portrait::types::{
    AestheticScores, BackgroundConfig, BeautyConfig, BeautyDial, CustomPrompts, FashionConfig,
    PortraitView, StudioConfig, StyleCategory, StyleConfig,
};

const CROP_DIRECTIVE: &str = "CROP: Head, Neck, Upper Chest. Center face.";
const ASPECT_DIRECTIVE: &str = "ASPECT: 1:1.";
const QUALITY_DIRECTIVE: &str = "QUALITY: Photorealistic, 8k.";
const CLEAN_DIRECTIVE: &str = "CLEAN: No text/lines.";
const REGENERATE_DIRECTIVE: &str =
    "INSTRUCTION: Completely regenerate the portrait based on the prompt. Do NOT simply copy the original.";
pub const FRONT_BACKGROUND_DIRECTIVE: &str = "BACKGROUND: SOLID WHITE OR LIGHT GREY. STUDIO LIGHTING.";
const CLINICAL_STYLE_CLAUSE: &str = "Style: Clinical Standard.";

/// Buckets a 0..=100 dial into one of five fixed tiers.
pub fn intensity_adverb(value: u8) -> &'static str {
    match value {
        0..=19 => "a slight hint of",
        20..=39 => "a mild touch of",
        40..=59 => "a moderate amount of",
        60..=79 => "a strong presence of",
        _ => "an extremely intense, dominant",
    }
}

fn dial_phrase(dial: BeautyDial) -> &'static str {
    match dial {
        BeautyDial::Smooth => "skin smoothing",
        BeautyDial::Whiten => "skin brightening",
        BeautyDial::HighClass => "'High Class' (GaoJiGan) vibe",
        BeautyDial::Rich => "'Wealthy' (FuGuiGan) vibe",
        BeautyDial::Pure => "'Pure/Innocent' (QuFengChen) vibe",
        BeautyDial::DarkCircles => "remove dark circles under eyes",
        BeautyDial::Nasolabial => "reduce nasolabial folds",
        BeautyDial::Jawline => "sharpen jawline definition",
    }
}

fn view_directive(view: PortraitView) -> &'static str {
    match view {
        PortraitView::Front => "View: Frontal ID Photo style. Subject MUST be facing strictly forward, centered, ears visible, neutral or slight smile. Perfect symmetry.",
        PortraitView::Side45 => "ACTION: ROTATE subject face to a 45-degree oblique angle. GENERATIVE TRANSFORMATION REQUIRED. Do NOT return original image. Highlight jawline.",
        PortraitView::Side90 => "ACTION: ROTATE subject face to a 90-degree side profile. GENERATIVE TRANSFORMATION REQUIRED. Do NOT return original image. Focus on E-line.",
    }
}

pub fn beauty_clause(beauty: &BeautyConfig) -> Option<String> {
    let parts: Vec<String> = BeautyDial::ALL
        .into_iter()
        .filter_map(|dial| {
            let value = beauty.get(dial);
            if value == 0 {
                return None;
            }
            Some(format!("{} {}", intensity_adverb(value), dial_phrase(dial)))
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(format!("Beautification: {}.", parts.join(", ")))
    }
}

pub fn style_clause(style: &StyleConfig, custom_prompts: &CustomPrompts) -> Option<String> {
    if style.category == StyleCategory::Clinical {
        return Some(CLINICAL_STYLE_CLAUSE.to_string());
    }

    let adverb = intensity_adverb(style.intensity);
    if let Some(custom) = custom_prompts.get(&style.sub_option) {
        let custom = custom.trim();
        if !custom.is_empty() {
            return Some(format!("Style: {custom}. Intensity: {adverb}."));
        }
    }

    style_entry(style.category, &style.sub_option)
        .map(|entry| format!("Style: {entry} Intensity: {adverb}."))
}

pub fn fashion_clause(fashion: &FashionConfig, custom_prompts: &CustomPrompts) -> Option<String> {
    let parts: Vec<String> = fashion
        .iter()
        .filter_map(|(slot, option_id)| {
            if let Some(custom) = custom_prompts.get(option_id) {
                let custom = custom.trim();
                if !custom.is_empty() {
                    return Some(format!("Fashion ({slot}): {custom}"));
                }
            }
            fashion_entry(option_id).map(str::to_string)
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(format!("Fashion: {}", parts.join(". ")))
    }
}

pub fn background_clause(view: PortraitView, background: &BackgroundConfig) -> String {
    if view == PortraitView::Front {
        return FRONT_BACKGROUND_DIRECTIVE.to_string();
    }

    let lighting = lighting_entry(background.lighting.trim())
        .or_else(|| lighting_entry(DEFAULT_LIGHTING))
        .unwrap_or_default();
    let environment = environment_entry(background.environment.trim())
        .or_else(|| environment_entry(DEFAULT_ENVIRONMENT))
        .unwrap_or_default();

    [lighting, environment]
        .into_iter()
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn numbered(sections: Vec<String>) -> String {
    sections
        .into_iter()
        .filter(|section| !section.trim().is_empty())
        .enumerate()
        .map(|(index, section)| format!("{}. {}", index + 1, section))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn compile_portrait_prompt(
    view: PortraitView,
    config: &StudioConfig,
    custom_prompts: &CustomPrompts,
) -> String {
    let sections = vec![
        CROP_DIRECTIVE.to_string(),
        ASPECT_DIRECTIVE.to_string(),
        view_directive(view).to_string(),
        beauty_clause(&config.beauty).unwrap_or_default(),
        style_clause(&config.style, custom_prompts).unwrap_or_default(),
        fashion_clause(&config.fashion, custom_prompts).unwrap_or_default(),
        background_clause(view, &config.background),
        QUALITY_DIRECTIVE.to_string(),
        CLEAN_DIRECTIVE.to_string(),
        REGENERATE_DIRECTIVE.to_string(),
    ];

    format!("Portrait Task.\n{}", numbered(sections))
}

pub fn compile_annotation_prompt(view: PortraitView, scores: Option<&AestheticScores>) -> String {
    let labels = match view {
        PortraitView::Front => "Horizontal lines for Symmetry, Vertical center line.",
        PortraitView::Side45 | PortraitView::Side90 => "E-Line, Frankfort Plane.",
    };

    let mut rules = vec![
        "STRICTLY NO DIMMING. NO DARK OVERLAY. NO BACKGROUND CHANGE.".to_string(),
        "The image MUST remain as bright as the original.".to_string(),
        "Draw thin white lines only.".to_string(),
        format!("Add small English labels: Aesthetic Geometry, Labels: {labels}"),
    ];
    if let Some(scores) = scores {
        rules.push(format!(
            "Add text: Eyes {}%, Total {}%",
            scores.eyes, scores.total
        ));
    }

    format!(
        "Aesthetic Geometry Analysis.\nInput: Photo.\nTask: Draw minimal white geometric lines OVER the image to show facial proportions.\n\nCRITICAL RULES:\n{}",
        numbered(rules)
    )
}
