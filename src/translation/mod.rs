// Translation module - prompt/images → Gemini request, Gemini response → parts
// Author: kelexine (https://github.com/kelexine)

pub mod request;
pub mod response;

pub use request::{assemble, to_gemini_request, AssembledPayload, MAX_INPUT_IMAGES};
pub use response::{classify, ClassifiedResponse, ResponseOutcome, ResponsePart};

/// Non-fatal problem with one item (an upload slot or a response part),
/// surfaced to the caller next to the partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub context: String,
    pub message: String,
}

impl Warning {
    pub fn new(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.message)
    }
}
