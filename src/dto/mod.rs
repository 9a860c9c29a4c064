use serde::Serialize;

use crate::domain::{FieldErrors, FieldId};
use crate::services::form::FormController;

/// Per-field error messages for template rendering.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FieldErrorsDto {
    pub doc_upload: Option<String>,
    pub img_upload: Option<String>,
}

impl From<&FieldErrors> for FieldErrorsDto {
    fn from(errors: &FieldErrors) -> Self {
        Self {
            doc_upload: errors.get(FieldId::DocUpload).map(str::to_owned),
            img_upload: errors.get(FieldId::ImgUpload).map(str::to_owned),
        }
    }
}

/// Serializable snapshot of a form for template rendering.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FormViewDto {
    pub document_name: Option<String>,
    pub image_name: Option<String>,
    pub preview_url: Option<String>,
    pub errors: FieldErrorsDto,
    pub submit_enabled: bool,
}

impl FormViewDto {
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<&FormController> for FormViewDto {
    fn from(form: &FormController) -> Self {
        Self {
            document_name: form.document().map(|f| f.name().to_owned()),
            image_name: form.image().map(|f| f.name().to_owned()),
            preview_url: form.preview().map(|p| p.href()),
            errors: FieldErrorsDto::from(form.errors()),
            submit_enabled: form.can_submit(),
        }
    }
}
