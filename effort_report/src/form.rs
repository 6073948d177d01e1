// ********* Forms: request lifecycle and client-side validation ***********

use log::{debug, info};
use std::error::Error;
use std::fmt::Display;

/// Files larger than this are rejected before anything is sent.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["txt", "doc", "docx", "pdf", "md"];

/// The forms that can request an estimation.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum FormKind {
    /// Free requirements text.
    Text,
    /// Manually entered project parameters.
    Manual,
    /// An uploaded requirements document.
    Upload,
    /// A list of tasks.
    Tasks,
    /// Task generation from free requirements text.
    Generate,
    /// Task generation from a requirements document.
    GenerateFromFile,
}

impl FormKind {
    pub const ALL: [FormKind; 6] = [
        FormKind::Text,
        FormKind::Manual,
        FormKind::Upload,
        FormKind::Tasks,
        FormKind::Generate,
        FormKind::GenerateFromFile,
    ];

    pub fn endpoint(&self) -> &'static str {
        match self {
            FormKind::Text | FormKind::Manual => "/estimate",
            FormKind::Upload => "/upload-requirements",
            FormKind::Tasks => "/estimate-from-tasks",
            FormKind::Generate => "/api/task-generation/generate",
            FormKind::GenerateFromFile => "/api/task-generation/generate-from-file",
        }
    }

    /// The message shown when the server fails without giving any detail.
    pub fn fallback_error(&self) -> &'static str {
        match self {
            FormKind::Text => "Estimation failed",
            FormKind::Manual => "Manual estimation failed",
            FormKind::Upload => "File upload failed",
            FormKind::Tasks => "Task estimation failed",
            FormKind::Generate => "Generation failed",
            FormKind::GenerateFromFile => "File processing failed",
        }
    }

    pub fn progress_message(&self) -> &'static str {
        match self {
            FormKind::Text => "Analyzing requirements and calculating estimation...",
            FormKind::Manual => "Calculating estimation...",
            FormKind::Upload => "Uploading and analyzing file...",
            FormKind::Tasks => "Estimating from tasks...",
            FormKind::Generate => "Generating tasks...",
            FormKind::GenerateFromFile => "Generating tasks from file...",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FormState {
    Idle,
    /// A request is in flight. The form does not accept another submission.
    Submitting,
    Rendered,
    ErrorShown(String),
}

/// Errors in the use of a form's state machine.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FormErrors {
    /// The form is disabled while its own request is in flight.
    AlreadySubmitting(FormKind),
    /// A completion was reported for a form that was not submitting.
    NotSubmitting(FormKind),
}

impl Error for FormErrors {}

impl Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormErrors::AlreadySubmitting(k) => {
                write!(f, "the {:?} form is already submitting", k)
            }
            FormErrors::NotSubmitting(k) => write!(f, "the {:?} form is not submitting", k),
        }
    }
}

/// The request lifecycle of one form:
/// `Idle -> Submitting -> Rendered | ErrorShown`, and back to `Submitting` on
/// the next submission.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FormMachine {
    kind: FormKind,
    state: FormState,
}

impl FormMachine {
    pub fn new(kind: FormKind) -> FormMachine {
        FormMachine {
            kind,
            state: FormState::Idle,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// The trigger control is enabled unless a request is in flight.
    pub fn is_enabled(&self) -> bool {
        self.state != FormState::Submitting
    }

    pub fn begin_submit(&mut self) -> Result<(), FormErrors> {
        if !self.is_enabled() {
            return Err(FormErrors::AlreadySubmitting(self.kind));
        }
        info!("{:?} form: {}", self.kind, self.kind.progress_message());
        self.state = FormState::Submitting;
        Ok(())
    }

    pub fn succeed(&mut self) -> Result<(), FormErrors> {
        self.finish(FormState::Rendered)
    }

    pub fn fail(&mut self, message: &str) -> Result<(), FormErrors> {
        self.finish(FormState::ErrorShown(message.to_string()))
    }

    /// Validation failures are reported inline without any request being made.
    /// A form that is submitting keeps its state.
    pub fn reject(&mut self, error: &ValidationError) -> Result<(), FormErrors> {
        if !self.is_enabled() {
            return Err(FormErrors::AlreadySubmitting(self.kind));
        }
        self.state = FormState::ErrorShown(error.to_string());
        Ok(())
    }

    fn finish(&mut self, next: FormState) -> Result<(), FormErrors> {
        if self.state != FormState::Submitting {
            return Err(FormErrors::NotSubmitting(self.kind));
        }
        debug!("{:?} form: {:?} -> {:?}", self.kind, self.state, next);
        self.state = next;
        Ok(())
    }
}

/// A file selected for upload.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub size_bytes: u64,
}

/// Input problems detected before any request is sent.
#[derive(PartialEq, Debug, Clone)]
pub enum ValidationError {
    EmptyRequirements,
    MissingFile,
    FileTooLarge { size_bytes: u64 },
    UnsupportedExtension { extension: String },
    NoParameters,
    NoTasks,
    UnknownLevel { task: usize, field: &'static str, value: String },
}

impl Error for ValidationError {}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyRequirements => write!(f, "Please enter project requirements"),
            ValidationError::MissingFile => write!(f, "Please select a file"),
            ValidationError::FileTooLarge { .. } => write!(
                f,
                "File size exceeds the limit (10MB). Please upload a smaller file."
            ),
            ValidationError::UnsupportedExtension { extension } => write!(
                f,
                "Unsupported file format: .{}\nAllowed formats: {}",
                extension,
                ALLOWED_EXTENSIONS.join(", ")
            ),
            ValidationError::NoParameters => write!(f, "Please enter at least one parameter"),
            ValidationError::NoTasks => write!(f, "Please add at least one task"),
            ValidationError::UnknownLevel { task, field, value } => write!(
                f,
                "Task {}: unknown {} '{}' (expected Low, Medium or High)",
                task, field, value
            ),
        }
    }
}

/// The lowercased extension of a file name: what follows the last dot,
/// or the whole name when there is no dot.
pub fn file_extension(name: &str) -> String {
    name.rsplit('.').next().unwrap_or("").to_lowercase()
}

/// Applies the acceptance policy for uploads: size first, then extension.
pub fn check_upload(file: &FileCandidate) -> Result<(), ValidationError> {
    if file.size_bytes > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge {
            size_bytes: file.size_bytes,
        });
    }
    let extension = file_extension(&file.name);
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ValidationError::UnsupportedExtension { extension });
    }
    Ok(())
}

pub fn check_requirements(text: &str) -> Result<&str, ValidationError> {
    let t = text.trim();
    if t.is_empty() {
        Err(ValidationError::EmptyRequirements)
    } else {
        Ok(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        let mut form = FormMachine::new(FormKind::Text);
        assert_eq!(form.state(), &FormState::Idle);
        form.begin_submit().unwrap();
        assert!(!form.is_enabled());
        assert_eq!(
            form.begin_submit(),
            Err(FormErrors::AlreadySubmitting(FormKind::Text))
        );
        form.succeed().unwrap();
        assert_eq!(form.state(), &FormState::Rendered);
        form.begin_submit().unwrap();
        form.fail("Network error occurred").unwrap();
        assert_eq!(
            form.state(),
            &FormState::ErrorShown("Network error occurred".to_string())
        );
        assert!(form.is_enabled());
        form.begin_submit().unwrap();
        assert_eq!(form.state(), &FormState::Submitting);
    }

    #[test]
    fn completion_requires_submission() {
        let mut form = FormMachine::new(FormKind::Upload);
        assert_eq!(
            form.succeed(),
            Err(FormErrors::NotSubmitting(FormKind::Upload))
        );
        assert!(form.fail("x").is_err());
        assert_eq!(form.state(), &FormState::Idle);
    }

    #[test]
    fn rejection_keeps_form_usable() {
        let mut form = FormMachine::new(FormKind::Upload);
        form.reject(&ValidationError::MissingFile).unwrap();
        assert_eq!(
            form.state(),
            &FormState::ErrorShown("Please select a file".to_string())
        );
        assert!(form.is_enabled());
        form.begin_submit().unwrap();
        assert!(form.reject(&ValidationError::MissingFile).is_err());
        assert_eq!(form.state(), &FormState::Submitting);
    }

    #[test]
    fn oversized_files_are_rejected() {
        let file = FileCandidate {
            name: "requirements.pdf".to_string(),
            size_bytes: 11 * 1024 * 1024,
        };
        let err = check_upload(&file).unwrap_err();
        assert_eq!(
            err.to_string(),
            "File size exceeds the limit (10MB). Please upload a smaller file."
        );
        let limit = FileCandidate {
            name: "requirements.pdf".to_string(),
            size_bytes: MAX_UPLOAD_BYTES,
        };
        assert!(check_upload(&limit).is_ok());
    }

    #[test]
    fn extensions() {
        let ok = |name: &str| {
            check_upload(&FileCandidate {
                name: name.to_string(),
                size_bytes: 10,
            })
        };
        assert!(ok("a.TXT").is_ok());
        assert!(ok("a.b.docx").is_ok());
        assert!(ok("notes.md").is_ok());
        assert_eq!(
            ok("setup.exe"),
            Err(ValidationError::UnsupportedExtension {
                extension: "exe".to_string()
            })
        );
        assert_eq!(
            ok("README"),
            Err(ValidationError::UnsupportedExtension {
                extension: "readme".to_string()
            })
        );
        assert_eq!(
            ok("setup.exe").unwrap_err().to_string(),
            "Unsupported file format: .exe\nAllowed formats: txt, doc, docx, pdf, md"
        );
    }

    #[test]
    fn requirements_text() {
        assert_eq!(check_requirements("  login page \n"), Ok("login page"));
        assert_eq!(
            check_requirements(" \t"),
            Err(ValidationError::EmptyRequirements)
        );
    }
}
