use crate::domain::rules::{DOCUMENT_RULES, IMAGE_RULES, RuleSet, message_of};
use crate::domain::{FieldErrors, FieldId, SelectedFile};
use crate::dto::FormViewDto;
use crate::services::completion::{CompletionAction, Submission};
use crate::services::preview::{PreviewStore, PreviewUrl};
use crate::services::{ServiceError, ServiceResult};

fn rules_for(field: FieldId) -> &'static RuleSet {
    match field {
        FieldId::DocUpload => &DOCUMENT_RULES,
        FieldId::ImgUpload => &IMAGE_RULES,
    }
}

/// State of one upload form: both slots, the image preview and field errors.
///
/// Every mutation of the image slot goes through `reconcile`,
/// which keeps at most one preview alive and always for the current image.
#[derive(Debug)]
pub struct FormController {
    document: Option<SelectedFile>,
    image: Option<SelectedFile>,
    preview: Option<PreviewUrl>,
    errors: FieldErrors,
    previews: PreviewStore,
}

impl FormController {
    pub fn new(previews: PreviewStore) -> Self {
        Self {
            document: None,
            image: None,
            preview: None,
            errors: FieldErrors::default(),
            previews,
        }
    }

    pub fn document(&self) -> Option<&SelectedFile> {
        self.document.as_ref()
    }

    pub fn image(&self) -> Option<&SelectedFile> {
        self.image.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewUrl> {
        self.preview.as_ref()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn view(&self) -> FormViewDto {
        FormViewDto::from(self)
    }

    /// Both slots filled and no field reports an error.
    pub fn can_submit(&self) -> bool {
        self.document.is_some() && self.image.is_some() && self.errors.is_empty()
    }

    /// Handles a change event on `field`. An event without a file is ignored.
    /// Returns whether the file was accepted into the slot.
    pub fn select(&mut self, field: FieldId, file: Option<SelectedFile>) -> bool {
        let Some(file) = file else {
            return false;
        };

        match rules_for(field).check(Some(&file)) {
            Ok(()) => {
                log::debug!("Accepted {} for {field}", file.name());
                self.errors.clear(field);
                *self.slot_mut(field) = Some(file);
                self.reconcile();
                true
            }
            Err(err) => {
                let message = message_of(&err);
                log::debug!("Rejected {} for {field}: {message}", file.name());
                self.errors.set(field, message);
                false
            }
        }
    }

    /// Empties `field` and drops its error.
    pub fn clear(&mut self, field: FieldId) {
        *self.slot_mut(field) = None;
        self.errors.clear(field);
        self.reconcile();
    }

    /// Hands both files to `action` and resets the form.
    ///
    /// With a slot empty, the errors are replaced by a "required" message for
    /// each empty slot and nothing else changes. With both slots filled but an
    /// error still shown, the submission is refused as is.
    pub fn submit<A>(&mut self, action: &A) -> ServiceResult<()>
    where
        A: CompletionAction + ?Sized,
    {
        match (self.document.take(), self.image.take()) {
            (Some(document), Some(image)) if self.errors.is_empty() => {
                action.complete(Submission { document, image });
                self.reset();
                Ok(())
            }
            (document, image) => {
                let incomplete = document.is_none() || image.is_none();
                if incomplete {
                    let mut errors = FieldErrors::default();
                    if document.is_none() {
                        errors.set(FieldId::DocUpload, FieldId::DocUpload.required_message());
                    }
                    if image.is_none() {
                        errors.set(FieldId::ImgUpload, FieldId::ImgUpload.required_message());
                    }
                    self.errors = errors;
                }
                self.document = document;
                self.image = image;

                if incomplete {
                    Err(ServiceError::IncompleteForm)
                } else {
                    Err(ServiceError::InvalidFields)
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.document = None;
        self.image = None;
        self.errors.clear_all();
        self.reconcile();
    }

    /// Brings the preview in line with the image slot.
    fn reconcile(&mut self) {
        let current = self.image.as_ref().map(SelectedFile::id);
        if self.preview.as_ref().map(PreviewUrl::file_id) == current {
            return;
        }

        // Release the old preview before issuing a new one.
        self.preview = None;
        if let Some(image) = &self.image {
            self.preview = Some(self.previews.issue(image));
        }
    }

    fn slot_mut(&mut self, field: FieldId) -> &mut Option<SelectedFile> {
        match field {
            FieldId::DocUpload => &mut self.document,
            FieldId::ImgUpload => &mut self.image,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::rules::MAX_FILE_SIZE;

    #[derive(Default)]
    struct Recorder {
        received: Mutex<Vec<Submission>>,
    }

    impl CompletionAction for Recorder {
        fn complete(&self, submission: Submission) {
            self.received.lock().unwrap().push(submission);
        }
    }

    fn pdf(size: u64) -> SelectedFile {
        SelectedFile::with_size("report.pdf", "application/pdf", size, Vec::new())
    }

    fn png(name: &str) -> SelectedFile {
        SelectedFile::new(name, "image/png", vec![0u8; 1024])
    }

    fn controller() -> (FormController, PreviewStore) {
        let store = PreviewStore::new();
        (FormController::new(store.clone()), store)
    }

    #[test]
    fn oversized_document_sets_error_and_keeps_slot_empty() {
        let (mut form, _) = controller();

        assert!(!form.select(FieldId::DocUpload, Some(pdf(10 * 1024 * 1024))));

        assert!(form.document().is_none());
        assert_eq!(
            form.errors().get(FieldId::DocUpload),
            Some("File size should not exceed 5MB")
        );
        assert!(!form.can_submit());
    }

    #[test]
    fn valid_selection_clears_previous_error() {
        let (mut form, _) = controller();
        form.select(FieldId::DocUpload, Some(SelectedFile::new("a.txt", "text/plain", vec![1])));
        assert_eq!(
            form.errors().get(FieldId::DocUpload),
            Some("Invalid document file type")
        );

        assert!(form.select(FieldId::DocUpload, Some(pdf(MAX_FILE_SIZE))));
        assert_eq!(form.errors().get(FieldId::DocUpload), None);
        assert_eq!(form.document().unwrap().name(), "report.pdf");
    }

    #[test]
    fn invalid_selection_keeps_previous_valid_file() {
        let (mut form, _) = controller();
        let first = pdf(10);
        form.select(FieldId::DocUpload, Some(first.clone()));

        form.select(FieldId::DocUpload, Some(pdf(MAX_FILE_SIZE + 1)));

        assert_eq!(form.document(), Some(&first));
        assert!(form.errors().get(FieldId::DocUpload).is_some());
    }

    #[test]
    fn change_without_file_is_ignored() {
        let (mut form, _) = controller();
        form.select(FieldId::DocUpload, Some(pdf(10)));

        assert!(!form.select(FieldId::DocUpload, None));
        assert!(!form.select(FieldId::ImgUpload, None));

        assert!(form.document().is_some());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn image_selection_issues_preview() {
        let (mut form, store) = controller();

        assert!(form.select(FieldId::ImgUpload, Some(png("pic.png"))));

        let preview = form.preview().unwrap();
        assert_eq!(preview.file_id(), form.image().unwrap().id());
        assert!(store.resolve(&preview.token()).is_some());
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn new_image_revokes_previous_preview() {
        let (mut form, store) = controller();
        form.select(FieldId::ImgUpload, Some(png("one.png")));
        let old = form.preview().unwrap().token();

        form.select(FieldId::ImgUpload, Some(png("two.png")));
        let new = form.preview().unwrap().token();

        assert_ne!(old, new);
        assert!(store.resolve(&old).is_none());
        assert!(store.resolve(&new).is_some());
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn rejected_image_keeps_existing_preview() {
        let (mut form, store) = controller();
        form.select(FieldId::ImgUpload, Some(png("one.png")));
        let token = form.preview().unwrap().token();

        form.select(FieldId::ImgUpload, Some(SelectedFile::new("x.bmp", "image/bmp", vec![1])));

        assert_eq!(form.preview().unwrap().token(), token);
        assert!(store.resolve(&token).is_some());
        assert_eq!(
            form.errors().get(FieldId::ImgUpload),
            Some("Invalid image file type")
        );
    }

    #[test]
    fn clearing_image_revokes_preview() {
        let (mut form, store) = controller();
        form.select(FieldId::ImgUpload, Some(png("one.png")));

        form.clear(FieldId::ImgUpload);

        assert!(form.preview().is_none());
        assert!(form.image().is_none());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn clearing_document_drops_file_and_error() {
        let (mut form, store) = controller();
        form.select(FieldId::DocUpload, Some(pdf(10)));
        form.select(FieldId::ImgUpload, Some(png("one.png")));
        form.select(FieldId::DocUpload, Some(pdf(MAX_FILE_SIZE + 1)));

        form.clear(FieldId::DocUpload);

        assert!(form.document().is_none());
        assert!(form.errors().is_empty());
        assert!(form.preview().is_some());
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn dropping_controller_revokes_preview() {
        let (mut form, store) = controller();
        form.select(FieldId::ImgUpload, Some(png("one.png")));

        drop(form);

        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn submit_with_empty_slots_reports_both_fields() {
        let (mut form, _) = controller();
        let recorder = Recorder::default();

        let err = form.submit(&recorder).unwrap_err();

        assert!(matches!(err, ServiceError::IncompleteForm));
        assert_eq!(form.errors().len(), 2);
        assert_eq!(
            form.errors().get(FieldId::DocUpload),
            Some("Document file is required")
        );
        assert_eq!(
            form.errors().get(FieldId::ImgUpload),
            Some("Image file is required")
        );
        assert!(recorder.received.lock().unwrap().is_empty());
    }

    #[test]
    fn submit_with_missing_image_keeps_document() {
        let (mut form, _) = controller();
        let recorder = Recorder::default();
        form.select(FieldId::DocUpload, Some(pdf(10)));

        assert!(form.submit(&recorder).is_err());

        assert!(form.document().is_some());
        assert_eq!(form.errors().get(FieldId::DocUpload), None);
        assert_eq!(
            form.errors().get(FieldId::ImgUpload),
            Some("Image file is required")
        );
    }

    #[test]
    fn submit_hands_over_both_files_and_resets() {
        let (mut form, store) = controller();
        let recorder = Recorder::default();
        let document = pdf(10);
        let image = png("pic.png");
        form.select(FieldId::DocUpload, Some(document.clone()));
        form.select(FieldId::ImgUpload, Some(image.clone()));
        assert!(form.can_submit());

        form.submit(&recorder).unwrap();

        let received = recorder.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].document, document);
        assert_eq!(received[0].image, image);

        assert!(form.document().is_none());
        assert!(form.image().is_none());
        assert!(form.preview().is_none());
        assert!(form.errors().is_empty());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn submit_refused_while_error_is_shown() {
        let (mut form, store) = controller();
        let recorder = Recorder::default();
        form.select(FieldId::DocUpload, Some(pdf(10)));
        form.select(FieldId::ImgUpload, Some(png("pic.png")));
        form.select(FieldId::DocUpload, Some(pdf(MAX_FILE_SIZE * 2)));
        assert!(!form.can_submit());

        let err = form.submit(&recorder).unwrap_err();

        assert!(matches!(err, ServiceError::InvalidFields));
        assert!(form.document().is_some());
        assert!(form.image().is_some());
        assert_eq!(store.live_count(), 1);
        assert!(recorder.received.lock().unwrap().is_empty());
    }
}
