//! Reading a file input's multipart part into a selected file.
use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;

use crate::domain::rules::MAX_FILE_SIZE;
use crate::domain::{FieldId, SelectedFile};
use crate::services::{ServiceError, ServiceResult};

/// Byte counter for one part that keeps the content only while it fits
/// under `keep_limit`. Past the limit only the size is tracked, so an
/// oversized file still reaches validation with its real size.
#[derive(Debug)]
struct PartBuffer {
    keep_limit: u64,
    size: u64,
    content: Vec<u8>,
}

impl PartBuffer {
    fn new(keep_limit: u64) -> Self {
        Self {
            keep_limit,
            size: 0,
            content: Vec::new(),
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        self.size += chunk.len() as u64;
        if self.size <= self.keep_limit {
            self.content.extend_from_slice(chunk);
        } else if !self.content.is_empty() {
            self.content = Vec::new();
        }
    }

    /// Builds the file, or `None` for a file input submitted with nothing
    /// chosen (an unnamed, empty part).
    fn finish(self, name: String, content_type: String) -> Option<SelectedFile> {
        if name.is_empty() && self.size == 0 {
            return None;
        }
        Some(SelectedFile::with_size(
            name,
            content_type,
            self.size,
            self.content,
        ))
    }
}

/// Reads the part named after `field` from `payload`. Other parts are skipped.
pub async fn read_selection(
    mut payload: Multipart,
    field: FieldId,
) -> ServiceResult<Option<SelectedFile>> {
    let mut selected = None;

    while let Some(part) = payload.next().await {
        let mut part = part.map_err(|e| ServiceError::Multipart(e.to_string()))?;
        if selected.is_some() || part.name() != Some(field.as_str()) {
            drain(&mut part).await?;
            continue;
        }

        let name = part
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned)
            .unwrap_or_default();
        let content_type = part
            .content_type()
            .map(|mime| mime.essence_str().to_owned())
            .unwrap_or_default();

        let mut buffer = PartBuffer::new(MAX_FILE_SIZE);
        while let Some(chunk) = part.next().await {
            let chunk = chunk.map_err(|e| ServiceError::Multipart(e.to_string()))?;
            buffer.push(&chunk);
        }
        selected = Some(buffer.finish(name, content_type));
    }

    Ok(selected.flatten())
}

async fn drain(part: &mut Field) -> ServiceResult<()> {
    while let Some(chunk) = part.next().await {
        chunk.map_err(|e| ServiceError::Multipart(e.to_string()))?;
    }
    Ok(())
}
