//! Strongly-typed domain structures for the upload form.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

pub mod rules;

/// One of the two upload slots of the form.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FieldId {
    DocUpload,
    ImgUpload,
}

impl FieldId {
    /// Name of the form field carrying the file.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::DocUpload => "doc_upload",
            FieldId::ImgUpload => "img_upload",
        }
    }

    /// Human label used in "required" messages.
    pub fn label(&self) -> &'static str {
        match self {
            FieldId::DocUpload => "Document",
            FieldId::ImgUpload => "Image",
        }
    }

    pub fn required_message(&self) -> String {
        format!("{} file is required", self.label())
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldId {
    type Err = TypeConstraintError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "doc_upload" => Ok(FieldId::DocUpload),
            "img_upload" => Ok(FieldId::ImgUpload),
            _ => Err(TypeConstraintError::UnknownField),
        }
    }
}

/// Identity of a single file selection.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FileId(Uuid);

impl FileId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A file chosen by the user, held in memory.
///
/// Cloning is cheap: the content is shared, never copied.
#[derive(Clone, Debug)]
pub struct SelectedFile {
    id: FileId,
    name: String,
    content_type: String,
    size: u64,
    content: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        let size = content.len() as u64;
        Self::with_size(name, content_type, size, content)
    }

    /// Builds a file whose reported size may differ from the bytes held,
    /// as with a multipart part whose length was counted by the host.
    pub fn with_size(
        name: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
        content: Vec<u8>,
    ) -> Self {
        Self {
            id: FileId::generate(),
            name: name.into(),
            content_type: content_type.into(),
            size,
            content: content.into(),
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content(&self) -> Arc<[u8]> {
        Arc::clone(&self.content)
    }
}

impl PartialEq for SelectedFile {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SelectedFile {}

/// Per-field error messages. A field without a message is valid.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldErrors {
    doc_upload: Option<String>,
    img_upload: Option<String>,
}

impl FieldErrors {
    pub fn get(&self, field: FieldId) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: FieldId, message: impl Into<String>) {
        *self.slot_mut(field) = Some(message.into());
    }

    pub fn clear(&mut self, field: FieldId) {
        *self.slot_mut(field) = None;
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.doc_upload.is_none() && self.img_upload.is_none()
    }

    pub fn len(&self) -> usize {
        [&self.doc_upload, &self.img_upload]
            .iter()
            .filter(|m| m.is_some())
            .count()
    }

    fn slot(&self, field: FieldId) -> &Option<String> {
        match field {
            FieldId::DocUpload => &self.doc_upload,
            FieldId::ImgUpload => &self.img_upload,
        }
    }

    fn slot_mut(&mut self, field: FieldId) -> &mut Option<String> {
        match field {
            FieldId::DocUpload => &mut self.doc_upload,
            FieldId::ImgUpload => &mut self.img_upload,
        }
    }
}

#[derive(Debug, Error)]
pub enum TypeConstraintError {
    #[error("unknown form field")]
    UnknownField,
}
