use std::fmt;

use wasm_bindgen::JsValue;

/// Every failure the crate can report. All of them are contained to a
/// single effect; none is ever surfaced to the page as a visible error.
#[derive(Debug, Clone, PartialEq)]
pub enum FxError {
    /// Host could not hand out a drawing context for the canvas.
    MissingRenderContext,
    UnsupportedCanvasMode(String),
    InvalidConfig(String),
    /// Accelerated numeric backend failed to load or self-check.
    BackendUnavailable(String),
    /// Pool at max capacity with the `Refuse` exhaustion policy.
    PoolExhausted { capacity: usize },
    InvalidSkillData(String),
    /// Anything the browser host reported (missing window, element, ...).
    Host(String),
}

impl fmt::Display for FxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FxError::MissingRenderContext => write!(f, "render context unavailable"),
            FxError::UnsupportedCanvasMode(mode) => write!(f, "unsupported canvas mode: {}", mode),
            FxError::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            FxError::BackendUnavailable(msg) => write!(f, "numeric backend unavailable: {}", msg),
            FxError::PoolExhausted { capacity } => {
                write!(f, "object pool exhausted (max capacity {})", capacity)
            }
            FxError::InvalidSkillData(msg) => write!(f, "invalid skill data: {}", msg),
            FxError::Host(msg) => write!(f, "host error: {}", msg),
        }
    }
}

impl std::error::Error for FxError {}

impl From<serde_json::Error> for FxError {
    fn from(e: serde_json::Error) -> Self {
        FxError::InvalidConfig(e.to_string())
    }
}

impl From<JsValue> for FxError {
    fn from(e: JsValue) -> Self {
        FxError::Host(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
    }
}

impl From<FxError> for JsValue {
    fn from(e: FxError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

pub type FxResult<T> = Result<T, FxError>;
