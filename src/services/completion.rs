//! Downstream consumer of a completed form.
use crate::domain::SelectedFile;

/// Both files of a successful submission, handed over together.
#[derive(Clone, Debug)]
pub struct Submission {
    pub document: SelectedFile,
    pub image: SelectedFile,
}

/// Receives each successful submission.
pub trait CompletionAction: Send + Sync {
    fn complete(&self, submission: Submission);
}

/// Writes the submitted files' metadata to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogCompletion;

impl CompletionAction for LogCompletion {
    fn complete(&self, submission: Submission) {
        let Submission { document, image } = submission;
        log::info!(
            "Form submitted with: document {:?} ({}, {} bytes), image {:?} ({}, {} bytes)",
            document.name(),
            document.content_type(),
            document.size(),
            image.name(),
            image.content_type(),
            image.size(),
        );
    }
}
