// Generated documents: per-session storage, .docx export, and the download endpoint.

pub mod export;
pub mod handlers;
pub mod store;

use std::fmt;
use std::str::FromStr;

/// Which of the two generated texts a download refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocType {
    Resume,
    Cover,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Resume => "resume",
            DocType::Cover => "cover",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.docx", self.as_str())
    }
}

impl FromStr for DocType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resume" => Ok(DocType::Resume),
            "cover" => Ok(DocType::Cover),
            _ => Err(()),
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tailored resume and cover letter produced by one generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDocuments {
    pub resume_text: String,
    pub cover_letter_text: String,
}

impl SessionDocuments {
    pub fn text(&self, doc_type: DocType) -> &str {
        match doc_type {
            DocType::Resume => &self.resume_text,
            DocType::Cover => &self.cover_letter_text,
        }
    }
}
