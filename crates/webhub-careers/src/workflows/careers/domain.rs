use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const GENERAL_APPLICATION: &str = "General Application";
pub const TALENT_SUBMISSION: &str = "Talent Submission";

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Informational identifier handed back to applicants. Not read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn generate() -> Self {
        Self::generate_at(Utc::now(), &mut rand::thread_rng())
    }

    /// `app_<unix millis>_<9 base-36 chars>`.
    pub fn generate_at<R: Rng + ?Sized>(at: DateTime<Utc>, rng: &mut R) -> Self {
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
            .collect();
        Self(format!("app_{}_{}", at.timestamp_millis(), suffix))
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two upload slots accepted by the careers form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentSlot {
    Cv,
    CoverLetter,
}

impl DocumentSlot {
    pub fn from_field(name: &str) -> Option<Self> {
        match name {
            "cv" => Some(Self::Cv),
            "coverLetter" => Some(Self::CoverLetter),
            _ => None,
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            Self::Cv => "cv",
            Self::CoverLetter => "coverLetter",
        }
    }
}

/// File received through the form, kept in memory for the lifetime of the request.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Role the applicant is applying for, resolved from the optional `position` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    General,
    TalentSubmission,
    Role(String),
}

impl Position {
    pub fn from_field(raw: Option<&str>) -> Self {
        let Some(value) = raw.filter(|value| !value.trim().is_empty()) else {
            return Self::General;
        };
        if value == TALENT_SUBMISSION {
            Self::TalentSubmission
        } else {
            Self::Role(value.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::General => GENERAL_APPLICATION,
            Self::TalentSubmission => TALENT_SUBMISSION,
            Self::Role(title) => title,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw multipart payload before validation. Every field is optional here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationForm {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub work_mode: Option<String>,
    pub message: Option<String>,
    pub position: Option<String>,
    pub cv: Option<UploadedDocument>,
    pub cover_letter: Option<UploadedDocument>,
}

impl ApplicationForm {
    /// Records a text part by its wire name. Unknown names are ignored.
    pub fn set_text(&mut self, name: &str, value: String) {
        let slot = match name {
            "fullName" => &mut self.full_name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "workMode" => &mut self.work_mode,
            "message" => &mut self.message,
            "position" => &mut self.position,
            _ => return,
        };
        *slot = Some(value);
    }

    pub fn document(&self, slot: DocumentSlot) -> Option<&UploadedDocument> {
        match slot {
            DocumentSlot::Cv => self.cv.as_ref(),
            DocumentSlot::CoverLetter => self.cover_letter.as_ref(),
        }
    }

    pub fn attach(&mut self, slot: DocumentSlot, document: UploadedDocument) {
        match slot {
            DocumentSlot::Cv => self.cv = Some(document),
            DocumentSlot::CoverLetter => self.cover_letter = Some(document),
        }
    }
}

/// Validated submission. Only constructed by [`super::policy::DocumentPolicy::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationSubmission {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub work_mode: String,
    pub message: Option<String>,
    pub position: Position,
    pub cv: UploadedDocument,
    pub cover_letter: Option<UploadedDocument>,
}

impl ApplicationSubmission {
    pub fn documents(&self) -> impl Iterator<Item = &UploadedDocument> {
        std::iter::once(&self.cv).chain(self.cover_letter.iter())
    }
}
