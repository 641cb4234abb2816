//! Multipart extraction for the member form.

use axum::extract::Multipart;

use crate::errors::AppError;
use crate::models::{fields, Attachment, MemberForm};

/// Read a multipart member form submission.
///
/// Text parts become form pairs; the `portfolio_file` part becomes the
/// attachment when a filename was chosen and the body is non-empty.
pub async fn read_member_form(mut multipart: Multipart) -> Result<MemberForm, AppError> {
    let mut pairs = Vec::new();
    let mut attachment = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == fields::PORTFOLIO_FILE {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            if !filename.trim().is_empty() && !bytes.is_empty() {
                attachment = Some(Attachment {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await?;
        pairs.push((name, value));
    }

    let mut form = MemberForm::from_pairs(pairs);
    form.attachment = attachment;
    Ok(form)
}
