use crate::llm::capability::CapabilityError;
use crate::portrait::types::PortraitView;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StudioError {
    #[error("面部分析失败: {0}")]
    AnalysisFailed(String),
    #[error("无法生成{view}视图: {message}")]
    PortraitGenerationFailed { view: PortraitView, message: String },
    #[error("{view} view returned no image")]
    NoImageGenerated { view: PortraitView },
    #[error("无法生成美学标注 ({view}): {message}")]
    AnnotationFailed { view: PortraitView, message: String },
    #[error("option suggestion failed: {0}")]
    OptionSuggestionFailed(String),
    #[error("scenario suggestion failed: {0}")]
    ScenarioSuggestionFailed(String),
    #[error("scenario '{name}' could not be resolved: {message}")]
    ScenarioResolutionFailed { name: String, message: String },
    #[error("no image selected")]
    NoImageSelected,
    #[error("{operation} is not allowed while {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: &'static str,
    },
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("unknown {kind} category '{category}'")]
    UnknownCategory { kind: &'static str, category: String },
}

impl StudioError {
    pub fn portrait(view: PortraitView, err: CapabilityError) -> Self {
        match err {
            CapabilityError::NoImage => StudioError::NoImageGenerated { view },
            other => StudioError::PortraitGenerationFailed {
                view,
                message: other.to_string(),
            },
        }
    }

    pub fn annotation(view: PortraitView, err: CapabilityError) -> Self {
        StudioError::AnnotationFailed {
            view,
            message: err.to_string(),
        }
    }
}

pub type StudioResult<T> = Result<T, StudioError>;
