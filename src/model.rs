//! Request and response values passed between the pipeline stages.

use serde::Serialize;

use crate::mime::MimeType;

/// Fixed task directive appended to every user description.
pub const TASK_DIRECTIVE: &str = "Analyze and solve/explain the math equation in this image.";

/// An image ready to be embedded inline in a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedImage {
    pub mime_type: MimeType,
    /// Standard-alphabet, padded base64 of the file contents.
    pub data: String,
}

/// The instruction text and image handed to a solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverPrompt {
    pub instruction: String,
    pub image: EncodedImage,
}

impl SolverPrompt {
    /// Combine a user description with the task directive.
    ///
    /// # Example
    /// ```
    /// use mathlens::model::{EncodedImage, SolverPrompt};
    /// use mathlens::mime::MimeType;
    ///
    /// let image = EncodedImage { mime_type: MimeType::Png, data: String::new() };
    /// let prompt = SolverPrompt::new("solve for x", image);
    /// assert_eq!(
    ///     prompt.instruction,
    ///     "Description: solve for x. Analyze and solve/explain the math equation in this image."
    /// );
    /// ```
    pub fn new(description: &str, image: EncodedImage) -> Self {
        Self {
            instruction: format!("Description: {}. {}", description, TASK_DIRECTIVE),
            image,
        }
    }
}

/// Text produced by the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverResult {
    pub text: String,
}

/// Body of a successful `/process` response.
#[derive(Debug, Serialize)]
pub struct SolveResponse {
    pub result: String,
}

impl From<SolverResult> for SolveResponse {
    fn from(result: SolverResult) -> Self {
        Self {
            result: result.text,
        }
    }
}
