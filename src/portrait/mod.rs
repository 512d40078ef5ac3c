pub mod consult;
pub mod lexicon;
pub mod prompt;
pub mod types;

pub use prompt::{compile_annotation_prompt, compile_portrait_prompt, intensity_adverb};
pub use types::{
    AnalysisResult, BackgroundConfig, BeautyConfig, BeautyDial, CustomPrompts, FashionConfig,
    FashionSlot, OptionItem, PortraitView, SavedPreset, ScenarioPreset, StudioConfig,
    StyleCategory, StyleConfig,
};
