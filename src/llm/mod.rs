pub mod capability;
pub mod gemini;
pub mod media;

pub use capability::{AestheticCapability, CapabilityError, ImageBytes};
pub use gemini::{GeminiSettings, GeminiStudioClient};
