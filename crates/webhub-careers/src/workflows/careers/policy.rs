use super::domain::{
    ApplicationForm, ApplicationSubmission, DocumentSlot, Position, UploadedDocument,
};

/// 5 MiB per uploaded document.
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// Room for the text fields and multipart framing on top of two full-size documents.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub const ALLOWED_DOCUMENT_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Client-side input errors. Every variant maps to a `400`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("Missing required fields")]
    MissingFields(Vec<&'static str>),
    #[error("CV file is required")]
    MissingCv,
    #[error("Invalid file type. Only PDF, DOC, and DOCX files are allowed.")]
    InvalidFileType {
        field: &'static str,
        content_type: Option<String>,
    },
    #[error("File size too large. Maximum size is 5MB.")]
    FileTooLarge { field: Option<&'static str> },
    #[error("Unexpected file field '{0}'")]
    UnexpectedFile(String),
    #[error("Invalid multipart payload")]
    MalformedPayload(String),
}

impl IntakeViolation {
    /// Supplementary detail for the `details` member of the error payload.
    pub fn details(&self) -> Option<String> {
        match self {
            IntakeViolation::MissingFields(fields) => Some(fields.join(", ")),
            IntakeViolation::InvalidFileType {
                field,
                content_type,
            } => Some(format!(
                "{field}: {}",
                content_type.as_deref().unwrap_or("no content type")
            )),
            IntakeViolation::FileTooLarge { field: Some(field) } => Some(field.to_string()),
            IntakeViolation::MalformedPayload(reason) => Some(reason.clone()),
            IntakeViolation::FileTooLarge { field: None }
            | IntakeViolation::MissingCv
            | IntakeViolation::UnexpectedFile(_) => None,
        }
    }
}

/// Upload rules shared by the multipart reader and the intake service.
#[derive(Debug, Clone)]
pub struct DocumentPolicy {
    max_bytes: usize,
}

impl DocumentPolicy {
    pub fn standard() -> Self {
        Self::with_max_bytes(MAX_DOCUMENT_BYTES)
    }

    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Cap for the whole request body: both documents at full size plus form overhead.
    pub fn request_limit(&self) -> usize {
        self.max_bytes
            .saturating_mul(2)
            .saturating_add(FORM_OVERHEAD_BYTES)
    }

    pub fn check_type(
        &self,
        slot: DocumentSlot,
        content_type: Option<&str>,
    ) -> Result<(), IntakeViolation> {
        if content_type.is_some_and(is_allowed_type) {
            Ok(())
        } else {
            Err(IntakeViolation::InvalidFileType {
                field: slot.field_name(),
                content_type: content_type.map(str::to_string),
            })
        }
    }

    pub fn check_size(&self, slot: DocumentSlot, len: usize) -> Result<(), IntakeViolation> {
        if len > self.max_bytes {
            Err(IntakeViolation::FileTooLarge {
                field: Some(slot.field_name()),
            })
        } else {
            Ok(())
        }
    }

    pub fn check(
        &self,
        slot: DocumentSlot,
        document: &UploadedDocument,
    ) -> Result<(), IntakeViolation> {
        self.check_type(slot, document.content_type.as_deref())?;
        self.check_size(slot, document.len())
    }

    /// Field presence first, then the CV, then both documents against the upload rules.
    pub fn validate(&self, form: ApplicationForm) -> Result<ApplicationSubmission, IntakeViolation> {
        let full_name = non_blank(form.full_name);
        let email = non_blank(form.email);
        let phone = non_blank(form.phone);
        let work_mode = non_blank(form.work_mode);

        let mut missing = Vec::new();
        for (name, value) in [
            ("fullName", &full_name),
            ("email", &email),
            ("phone", &phone),
            ("workMode", &work_mode),
        ] {
            if value.is_none() {
                missing.push(name);
            }
        }

        let (Some(full_name), Some(email), Some(phone), Some(work_mode)) =
            (full_name, email, phone, work_mode)
        else {
            return Err(IntakeViolation::MissingFields(missing));
        };

        let cv = form.cv.ok_or(IntakeViolation::MissingCv)?;
        self.check(DocumentSlot::Cv, &cv)?;
        if let Some(cover_letter) = &form.cover_letter {
            self.check(DocumentSlot::CoverLetter, cover_letter)?;
        }

        Ok(ApplicationSubmission {
            full_name,
            email,
            phone,
            work_mode,
            message: non_blank(form.message),
            position: Position::from_field(form.position.as_deref()),
            cv,
            cover_letter: form.cover_letter,
        })
    }
}

impl Default for DocumentPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

fn is_allowed_type(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|parsed| {
            ALLOWED_DOCUMENT_TYPES
                .iter()
                .any(|allowed| parsed.essence_str().eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
