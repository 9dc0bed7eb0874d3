// Tailoring pipeline: PDF extraction, prompt composition, generation, and section split.
// All LLM calls go through llm_client; no direct Anthropic calls here.

pub mod extractor;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod splitter;

/// Line the model is told to emit before the cover letter. The only structural
/// contract between the prompt and the splitter.
pub const COVER_LETTER_MARKER: &str = "COVER LETTER:";
