use super::common::*;
use crate::workflows::careers::notification::{ApplicationEmail, MISSING_MESSAGE_PLACEHOLDER};
use crate::workflows::careers::policy::DocumentPolicy;

#[test]
fn compose_fills_subject_and_body_template() {
    let submission = DocumentPolicy::standard()
        .validate(form())
        .expect("form is valid");
    let email = ApplicationEmail::compose(&submission);

    assert_eq!(
        email.subject,
        "New Job Application from Grace Hopper - Backend Engineer"
    );
    assert!(email
        .text_body
        .starts_with("New job application received:\n\nName: Grace Hopper\n"));
    assert!(email.text_body.contains("Mode of Working: Hybrid\n"));
    assert!(email.text_body.contains("Message:\nHappy to relocate.\n"));
    assert!(email
        .text_body
        .ends_with("---\nThis application was submitted through the WebHub careers page."));
}

#[test]
fn compose_attaches_documents_in_order() {
    let submission = DocumentPolicy::standard()
        .validate(form())
        .expect("form is valid");
    let email = ApplicationEmail::compose(&submission);

    let names: Vec<&str> = email
        .attachments
        .iter()
        .map(|attachment| attachment.filename.as_str())
        .collect();
    assert_eq!(names, vec!["grace-hopper-cv.pdf", "cover-letter.docx"]);
    assert_eq!(email.attachments[0].content_type, PDF);
    assert_eq!(email.attachments[0].bytes, cv().bytes);
}

#[test]
fn compose_uses_placeholders_for_blank_fields() {
    let mut sparse = form();
    sparse.message = None;
    sparse.position = None;
    let submission = DocumentPolicy::standard()
        .validate(sparse)
        .expect("form is valid");
    let email = ApplicationEmail::compose(&submission);

    assert!(email.subject.ends_with("- General Application"));
    assert!(email.text_body.contains("Position: General Application"));
    assert!(email.text_body.contains(MISSING_MESSAGE_PLACEHOLDER));
}

#[test]
fn html_body_escapes_applicant_input() {
    let mut hostile = form();
    hostile.full_name = Some("<script>alert('x')</script>".to_string());
    hostile.message = Some("Tom & Jerry \"quoted\"\nsecond line".to_string());
    let submission = DocumentPolicy::standard()
        .validate(hostile)
        .expect("form is valid");
    let email = ApplicationEmail::compose(&submission);

    assert!(!email.html_body.contains("<script>"));
    assert!(email
        .html_body
        .contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    assert!(email
        .html_body
        .contains("Tom &amp; Jerry &quot;quoted&quot;<br>second line"));
    assert!(!email.html_body.contains('\n'));
    assert!(email.text_body.contains("<script>alert('x')</script>"));
}
