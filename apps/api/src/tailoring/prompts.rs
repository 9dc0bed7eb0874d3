//! Prompt Composer: renders the tailoring instruction sent to the LLM.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::tailoring::COVER_LETTER_MARKER;

const RESUME_PLACEHOLDER: &str = "{resume_text}";
const JOB_DESCRIPTION_PLACEHOLDER: &str = "{job_description}";

/// Default tailoring prompt. Replace: {resume_text}, {job_description}
pub const TAILORING_PROMPT_TEMPLATE: &str = r#"Please help me tailor my resume and create a cover letter for a job application.

Here is my current resume:
{resume_text}

Here is the job description:
{job_description}

Please provide:
1. A tailored version of my resume, following these guidelines (begin directly with the content):

Format & Structure:
   - Begin directly with my name and contact details (no title or introduction)
   - Use clear, ATS-friendly formatting
   - Keep all original dates, company names, and job titles exactly as shown

Professional Summary (max 3-4 lines):
   - Tell a compelling story built from my experience most relevant to this role
   - Make the connection between my background and the job requirements explicit
   - Emphasize what sets me apart for this specific position
   - Keep the tone professional yet conversational

Experience Section:
   - Reframe existing accomplishments to highlight the skills this role needs
   - Put achievements that match the job requirements first
   - Stay completely accurate: no fabricated or inflated experience
   - When rewording, emphasize transferable skills and relevant outcomes
   - Use strong action verbs that match the job description's key requirements

Additional Guidelines:
   - Only use information present in my original resume
   - Reorder content so the most relevant experience comes first
   - Every claim must be verifiable and based on my actual experience

2. A cover letter that shows genuine enthusiasm with professional polish:

Format & Structure:
   - Include a complete header with:
      * My full name
      * My contact information
      * Date
      * Company name and posted job title
      * Hiring manager's name/title (if provided)
   - Use standard business letter formatting
   - Length: approximately 220 words for the main content

Opening Paragraph:
   - Start with a warm yet professional greeting
   - Introduce me and name the position
   - Open with a hook that shows real interest in the role and company
   - Avoid generic openings and restating the obvious about the position

Body Paragraphs:
   - Connect my experience to the role requirements naturally
   - Highlight 2-3 specific achievements that relate directly to the position
   - Show a clear understanding of the company's needs and how I can meet them
   - Use storytelling to make the experience engaging
   - Balance confidence with humility
   - Back claims with concrete examples and measurable results

Closing:
   - Express genuine interest in discussing the opportunity further
   - Include a clear call to action
   - End with a professional but warm closing
   - Keep an optimistic, forward-looking tone

Style Guidelines:
   - Natural, conversational tone that stays professional
   - No clichés or generic phrases
   - Active voice and strong action verbs
   - Each paragraph flows into the next
   - Balance expertise with approachability
   - Show personality while staying business-appropriate
   - Show enthusiasm without sounding desperate

Please start the cover letter section with exactly "COVER LETTER:" on its own line."#;

/// Renders the tailoring prompt from a template with `{resume_text}` and
/// `{job_description}` placeholders. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    template: Arc<str>,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self {
            template: Arc::from(TAILORING_PROMPT_TEMPLATE),
        }
    }
}

impl PromptComposer {
    /// Rejects templates missing a placeholder. A template without the section
    /// marker is accepted, but every response will come back without a cover letter.
    pub fn from_template(template: String) -> Result<Self> {
        for placeholder in [RESUME_PLACEHOLDER, JOB_DESCRIPTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                bail!("prompt template is missing the {placeholder} placeholder");
            }
        }
        if !template.contains(COVER_LETTER_MARKER) {
            warn!(
                "Prompt template never mentions {COVER_LETTER_MARKER:?}; cover letters will be empty"
            );
        }
        Ok(Self {
            template: Arc::from(template),
        })
    }

    /// Uses the template at `path` when given, otherwise the built-in one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let template = std::fs::read_to_string(path).with_context(|| {
                    format!("failed to read prompt template {}", path.display())
                })?;
                Self::from_template(template)
            }
            None => Ok(Self::default()),
        }
    }

    /// Both inputs are embedded verbatim. Substitution is single-pass: text inserted
    /// for one placeholder is never scanned for the other.
    pub fn compose(&self, resume_text: &str, job_description: &str) -> String {
        let mut out = String::with_capacity(
            self.template.len() + resume_text.len() + job_description.len(),
        );
        for (i, chunk) in self.template.split(RESUME_PLACEHOLDER).enumerate() {
            if i > 0 {
                out.push_str(resume_text);
            }
            for (j, piece) in chunk.split(JOB_DESCRIPTION_PLACEHOLDER).enumerate() {
                if j > 0 {
                    out.push_str(job_description);
                }
                out.push_str(piece);
            }
        }
        out
    }
}
