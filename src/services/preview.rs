//! In-memory preview URLs for selected images.
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::domain::{FileId, SelectedFile};

/// Route prefix under which previews are served.
pub const PREVIEW_PREFIX: &str = "/preview/";

/// Bytes and content type served for a live preview.
#[derive(Clone, Debug)]
pub struct PreviewEntry {
    pub content_type: String,
    pub content: Arc<[u8]>,
}

/// Process-local registry of live previews keyed by random token.
#[derive(Clone, Debug, Default)]
pub struct PreviewStore {
    entries: Arc<Mutex<HashMap<Uuid, PreviewEntry>>>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `file` and returns the handle owning the registration.
    pub fn issue(&self, file: &SelectedFile) -> PreviewUrl {
        let token = Uuid::new_v4();
        let entry = PreviewEntry {
            content_type: file.content_type().to_owned(),
            content: file.content(),
        };
        self.lock().insert(token, entry);
        log::debug!("Issued preview {token} for file {}", file.id());

        PreviewUrl {
            token,
            file_id: file.id(),
            store: self.clone(),
        }
    }

    pub fn resolve(&self, token: &Uuid) -> Option<PreviewEntry> {
        self.lock().get(token).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn revoke(&self, token: &Uuid) {
        if self.lock().remove(token).is_some() {
            log::debug!("Revoked preview {token}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, PreviewEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Live preview of one image. Dropping the handle revokes the URL.
pub struct PreviewUrl {
    token: Uuid,
    file_id: FileId,
    store: PreviewStore,
}

impl PreviewUrl {
    pub fn token(&self) -> Uuid {
        self.token
    }

    /// File the preview was issued for.
    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn href(&self) -> String {
        format!("{PREVIEW_PREFIX}{}", self.token)
    }
}

impl fmt::Debug for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewUrl")
            .field("token", &self.token)
            .field("file_id", &self.file_id)
            .finish()
    }
}

impl Drop for PreviewUrl {
    fn drop(&mut self) {
        self.store.revoke(&self.token);
    }
}
