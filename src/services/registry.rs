use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::domain::{FieldId, SelectedFile};
use crate::dto::FormViewDto;
use crate::services::ServiceResult;
use crate::services::completion::CompletionAction;
use crate::services::form::FormController;
use crate::services::preview::PreviewStore;

/// Forms left untouched this long are dropped unless configured otherwise.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct FormEntry {
    form: FormController,
    touched: Instant,
}

/// Form controllers of all browser sessions, keyed by form id.
///
/// Each controller is only touched while the registry lock is held, so every
/// event is applied to a form in isolation. Forms idle for longer than the
/// TTL are evicted on the next access, releasing their files and preview.
pub struct FormRegistry {
    forms: Mutex<HashMap<Uuid, FormEntry>>,
    previews: PreviewStore,
    completion: Arc<dyn CompletionAction>,
    idle_ttl: Duration,
}

impl FormRegistry {
    pub fn new(previews: PreviewStore, completion: Arc<dyn CompletionAction>) -> Self {
        Self::with_idle_ttl(previews, completion, DEFAULT_IDLE_TTL)
    }

    pub fn with_idle_ttl(
        previews: PreviewStore,
        completion: Arc<dyn CompletionAction>,
        idle_ttl: Duration,
    ) -> Self {
        Self {
            forms: Mutex::new(HashMap::new()),
            previews,
            completion,
            idle_ttl,
        }
    }

    pub fn previews(&self) -> &PreviewStore {
        &self.previews
    }

    /// Snapshot for rendering. Unknown forms render empty.
    pub fn view(&self, form_id: &Uuid) -> FormViewDto {
        let mut forms = self.lock_live();
        match forms.get_mut(form_id) {
            Some(entry) => {
                entry.touched = Instant::now();
                entry.form.view()
            }
            None => FormViewDto::empty(),
        }
    }

    /// Applies a change event. An event without a file does not create a form.
    pub fn select(&self, form_id: Uuid, field: FieldId, file: Option<SelectedFile>) -> bool {
        if file.is_none() {
            return false;
        }
        self.with_form(form_id, |form| form.select(field, file))
    }

    /// Empties `field` of an existing form.
    pub fn clear(&self, form_id: &Uuid, field: FieldId) {
        let mut forms = self.lock_live();
        if let Some(entry) = forms.get_mut(form_id) {
            entry.touched = Instant::now();
            entry.form.clear(field);
        }
    }

    pub fn submit(&self, form_id: Uuid) -> ServiceResult<()> {
        let completion = Arc::clone(&self.completion);
        self.with_form(form_id, |form| form.submit(completion.as_ref()))
    }

    /// Drops the form, releasing its files and preview.
    pub fn discard(&self, form_id: &Uuid) -> bool {
        self.lock_live().remove(form_id).is_some()
    }

    /// Drops every form idle since before `now - idle_ttl`.
    /// Returns how many were evicted.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let mut forms = self.lock();
        Self::evict_from(&mut forms, now, self.idle_ttl)
    }

    pub fn len(&self) -> usize {
        self.lock_live().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_form<R>(&self, form_id: Uuid, f: impl FnOnce(&mut FormController) -> R) -> R {
        let mut forms = self.lock_live();
        let entry = forms.entry(form_id).or_insert_with(|| FormEntry {
            form: FormController::new(self.previews.clone()),
            touched: Instant::now(),
        });
        entry.touched = Instant::now();
        f(&mut entry.form)
    }

    fn evict_from(forms: &mut HashMap<Uuid, FormEntry>, now: Instant, ttl: Duration) -> usize {
        let before = forms.len();
        forms.retain(|_, entry| now.saturating_duration_since(entry.touched) <= ttl);
        let evicted = before - forms.len();
        if evicted > 0 {
            log::debug!("Evicted {evicted} idle form(s)");
        }
        evicted
    }

    /// Lock with idle forms already evicted.
    fn lock_live(&self) -> MutexGuard<'_, HashMap<Uuid, FormEntry>> {
        let mut forms = self.lock();
        Self::evict_from(&mut forms, Instant::now(), self.idle_ttl);
        forms
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, FormEntry>> {
        self.forms.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
