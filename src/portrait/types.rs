use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

pub type CustomPrompts = HashMap<String, String>;

pub const DIAL_MAX: u8 = 100;

pub fn clamp_dial(value: i64) -> u8 {
    value.clamp(0, DIAL_MAX as i64) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortraitView {
    Front,
    Side45,
    Side90,
}

impl PortraitView {
    pub const ALL: [PortraitView; 3] = [PortraitView::Front, PortraitView::Side45, PortraitView::Side90];

    pub const fn as_str(self) -> &'static str {
        match self {
            PortraitView::Front => "front",
            PortraitView::Side45 => "side45",
            PortraitView::Side90 => "side90",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "front" => Some(PortraitView::Front),
            "side45" | "45" => Some(PortraitView::Side45),
            "side90" | "90" | "profile" => Some(PortraitView::Side90),
            _ => None,
        }
    }
}

impl fmt::Display for PortraitView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeautyDial {
    Smooth,
    Whiten,
    HighClass,
    Rich,
    Pure,
    DarkCircles,
    Nasolabial,
    Jawline,
}

impl BeautyDial {
    pub const ALL: [BeautyDial; 8] = [
        BeautyDial::Smooth,
        BeautyDial::Whiten,
        BeautyDial::HighClass,
        BeautyDial::Rich,
        BeautyDial::Pure,
        BeautyDial::DarkCircles,
        BeautyDial::Nasolabial,
        BeautyDial::Jawline,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            BeautyDial::Smooth => "smooth",
            BeautyDial::Whiten => "whiten",
            BeautyDial::HighClass => "highClass",
            BeautyDial::Rich => "rich",
            BeautyDial::Pure => "pure",
            BeautyDial::DarkCircles => "darkCircles",
            BeautyDial::Nasolabial => "nasolabial",
            BeautyDial::Jawline => "jawline",
        }
    }

    pub fn from_key(value: &str) -> Option<Self> {
        let normalized = value.trim().replace(['_', '-'], "").to_ascii_lowercase();
        BeautyDial::ALL
            .into_iter()
            .find(|dial| dial.key().to_ascii_lowercase() == normalized)
    }
}

/// Eight beautification dials, each kept within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeautyConfig {
    pub smooth: u8,
    pub whiten: u8,
    pub high_class: u8,
    pub rich: u8,
    pub pure: u8,
    pub dark_circles: u8,
    pub nasolabial: u8,
    pub jawline: u8,
}

impl Default for BeautyConfig {
    fn default() -> Self {
        BeautyConfig {
            smooth: 50,
            whiten: 30,
            high_class: 0,
            rich: 0,
            pure: 0,
            dark_circles: 0,
            nasolabial: 0,
            jawline: 0,
        }
    }
}

impl BeautyConfig {
    pub fn zeroed() -> Self {
        BeautyConfig {
            smooth: 0,
            whiten: 0,
            high_class: 0,
            rich: 0,
            pure: 0,
            dark_circles: 0,
            nasolabial: 0,
            jawline: 0,
        }
    }

    pub fn get(&self, dial: BeautyDial) -> u8 {
        match dial {
            BeautyDial::Smooth => self.smooth,
            BeautyDial::Whiten => self.whiten,
            BeautyDial::HighClass => self.high_class,
            BeautyDial::Rich => self.rich,
            BeautyDial::Pure => self.pure,
            BeautyDial::DarkCircles => self.dark_circles,
            BeautyDial::Nasolabial => self.nasolabial,
            BeautyDial::Jawline => self.jawline,
        }
    }

    pub fn set(&mut self, dial: BeautyDial, value: i64) {
        let value = clamp_dial(value);
        let slot = match dial {
            BeautyDial::Smooth => &mut self.smooth,
            BeautyDial::Whiten => &mut self.whiten,
            BeautyDial::HighClass => &mut self.high_class,
            BeautyDial::Rich => &mut self.rich,
            BeautyDial::Pure => &mut self.pure,
            BeautyDial::DarkCircles => &mut self.dark_circles,
            BeautyDial::Nasolabial => &mut self.nasolabial,
            BeautyDial::Jawline => &mut self.jawline,
        };
        *slot = value;
    }

    /// Returns a copy with every dial re-clamped; deserialised values may exceed the range.
    pub fn clamped(mut self) -> Self {
        for dial in BeautyDial::ALL {
            let value = self.get(dial) as i64;
            self.set(dial, value);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleCategory {
    Clinical,
    Classical,
    Mood,
    Status,
    Tweak,
}

impl StyleCategory {
    pub const ALL: [StyleCategory; 5] = [
        StyleCategory::Clinical,
        StyleCategory::Classical,
        StyleCategory::Mood,
        StyleCategory::Status,
        StyleCategory::Tweak,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            StyleCategory::Clinical => "clinical",
            StyleCategory::Classical => "classical",
            StyleCategory::Mood => "mood",
            StyleCategory::Status => "status",
            StyleCategory::Tweak => "tweak",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        let lowered = value.trim().to_ascii_lowercase();
        StyleCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == lowered)
    }
}

impl fmt::Display for StyleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const STANDARD_SUB_OPTION: &str = "standard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    pub category: StyleCategory,
    pub sub_option: String,
    pub intensity: u8,
}

impl Default for StyleConfig {
    fn default() -> Self {
        StyleConfig {
            category: StyleCategory::Clinical,
            sub_option: STANDARD_SUB_OPTION.to_string(),
            intensity: 50,
        }
    }
}

impl StyleConfig {
    pub fn new(category: StyleCategory, sub_option: &str, intensity: i64) -> Self {
        StyleConfig {
            category,
            sub_option: sub_option.trim().to_string(),
            intensity: clamp_dial(intensity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FashionSlot {
    Hairstyle,
    Headwear,
    Earrings,
    Necklace,
    Clothing,
    Outerwear,
    Footwear,
    Accessories,
}

impl FashionSlot {
    pub const ALL: [FashionSlot; 8] = [
        FashionSlot::Hairstyle,
        FashionSlot::Headwear,
        FashionSlot::Earrings,
        FashionSlot::Necklace,
        FashionSlot::Clothing,
        FashionSlot::Outerwear,
        FashionSlot::Footwear,
        FashionSlot::Accessories,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            FashionSlot::Hairstyle => "hairstyle",
            FashionSlot::Headwear => "headwear",
            FashionSlot::Earrings => "earrings",
            FashionSlot::Necklace => "necklace",
            FashionSlot::Clothing => "clothing",
            FashionSlot::Outerwear => "outerwear",
            FashionSlot::Footwear => "footwear",
            FashionSlot::Accessories => "accessories",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        let lowered = value.trim().to_ascii_lowercase();
        FashionSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == lowered)
    }
}

impl fmt::Display for FashionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sparse slot selection. The map is ordered by `FashionSlot` declaration order,
/// which fixes the clause order in compiled prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FashionConfig {
    selected: BTreeMap<FashionSlot, String>,
}

impl FashionConfig {
    pub fn get(&self, slot: FashionSlot) -> Option<&str> {
        self.selected.get(&slot).map(String::as_str)
    }

    pub fn set(&mut self, slot: FashionSlot, option_id: &str) {
        let trimmed = option_id.trim();
        if trimmed.is_empty() {
            self.clear(slot);
        } else {
            self.selected.insert(slot, trimmed.to_string());
        }
    }

    pub fn clear(&mut self, slot: FashionSlot) {
        self.selected.remove(&slot);
    }

    /// Selecting the already-selected id clears the slot.
    pub fn toggle(&mut self, slot: FashionSlot, option_id: &str) {
        if self.get(slot) == Some(option_id.trim()) {
            self.clear(slot);
        } else {
            self.set(slot, option_id);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FashionSlot, &str)> {
        self.selected.iter().map(|(slot, id)| (*slot, id.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    pub lighting: String,
    pub environment: String,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        BackgroundConfig {
            lighting: "studio".to_string(),
            environment: "solid".to_string(),
        }
    }
}

/// The four configuration objects, always replaced together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioConfig {
    pub beauty: BeautyConfig,
    pub style: StyleConfig,
    pub fashion: FashionConfig,
    pub background: BackgroundConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

impl OptionItem {
    pub fn new(id: &str, label: &str, tip: &str) -> Self {
        OptionItem {
            id: id.to_string(),
            label: label.to_string(),
            tip: if tip.is_empty() {
                None
            } else {
                Some(tip.to_string())
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioPreset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPreset {
    pub id: String,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub config: StudioConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AestheticScores {
    pub eyes: u8,
    pub cheeks: u8,
    pub lips: u8,
    pub brows: u8,
    pub jawline: u8,
    pub symmetry: u8,
    pub total: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub scores: AestheticScores,
    pub summary: String,
    pub keywords: Vec<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiTone {
    Humorous,
    #[default]
    Standard,
    Scientific,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiLength {
    Detailed,
    #[default]
    Standard,
    Concise,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneSettings {
    pub tone: AiTone,
    pub length: AiLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Style,
    Fashion,
}
