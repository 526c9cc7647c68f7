use super::domain::{ApplicationSubmission, UploadedDocument};

pub const SENDER_DISPLAY_NAME: &str = "WebHub Careers";
pub const MISSING_MESSAGE_PLACEHOLDER: &str = "No additional message provided";
const FOOTER: &str = "This application was submitted through the WebHub careers page.";

/// Notification sent to the careers inbox for every accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationEmail {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for EmailAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailAttachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl From<&UploadedDocument> for EmailAttachment {
    fn from(document: &UploadedDocument) -> Self {
        Self {
            filename: document.filename.clone(),
            content_type: document
                .content_type
                .clone()
                .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string()),
            bytes: document.bytes.clone(),
        }
    }
}

impl ApplicationEmail {
    pub fn compose(submission: &ApplicationSubmission) -> Self {
        let subject = format!(
            "New Job Application from {} - {}",
            submission.full_name,
            submission.position.label()
        );
        let text_body = render_body(submission, |value| value.to_string());
        let html_body = render_body(submission, escape_html).replace('\n', "<br>");
        let attachments = submission.documents().map(EmailAttachment::from).collect();

        Self {
            subject,
            text_body,
            html_body,
            attachments,
        }
    }
}

fn render_body(submission: &ApplicationSubmission, field: impl Fn(&str) -> String) -> String {
    let message = submission
        .message
        .as_deref()
        .unwrap_or(MISSING_MESSAGE_PLACEHOLDER);

    format!(
        "New job application received:\n\n\
         Name: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Position: {}\n\
         Mode of Working: {}\n\n\
         Message:\n{}\n\n\
         ---\n{}",
        field(&submission.full_name),
        field(&submission.email),
        field(&submission.phone),
        field(submission.position.label()),
        field(&submission.work_mode),
        field(message),
        FOOTER
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
