use crate::i18n::{t, Language};
use crate::model::Jail;
use crate::ui::text_input::TextInput;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    Missing,
    NameExists(String),
}

impl FormError {
    pub fn message(&self, lang: Language) -> String {
        match self {
            FormError::Missing => t(lang, "msg.formMissing", &[]),
            FormError::NameExists(name) => t(lang, "msg.nameExists", &[("name", name)]),
        }
    }
}

/// Contents of the edit dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDraft {
    pub name: TextInput,
    pub content: TextInput,
    existing: Option<String>,
}

impl FormDraft {
    pub fn new_jail() -> Self {
        Self {
            name: TextInput::default(),
            content: TextInput::default(),
            existing: None,
        }
    }

    pub fn existing(name: &str, content: &str) -> Self {
        let mut content = TextInput::new(content);
        content.to_start();
        Self {
            name: TextInput::new(name),
            content,
            existing: Some(name.to_string()),
        }
    }

    pub fn is_existing_jail(&self) -> bool {
        self.existing.is_some()
    }

    pub fn name_editable(&self) -> bool {
        self.existing.is_none()
    }

    /// Jail the save goes to. For existing jails this is the name the draft
    /// was opened with, whatever the name field holds.
    pub fn target_name(&self) -> String {
        match self.existing {
            Some(ref name) => name.clone(),
            None => self.name.value().trim().to_string(),
        }
    }

    pub fn validate(&self, jails: &[Jail]) -> Result<(), FormError> {
        let name = self.target_name();
        if name.is_empty() {
            return Err(FormError::Missing);
        }
        if self.content.value().trim().is_empty() {
            return Err(FormError::Missing);
        }
        let collides = jails.iter().any(|j| j.name == name);
        if collides && self.existing.as_deref() != Some(name.as_str()) {
            return Err(FormError::NameExists(name));
        }
        Ok(())
    }

    pub fn is_savable(&self, jails: &[Jail]) -> bool {
        self.validate(jails).is_ok()
    }
}

/// The edit dialog: a draft plus the error of its last validation.
///
/// Validation is rerun after every keystroke and every jail-list refresh, so
/// `error` and the save control never lag behind the draft.
#[derive(Debug, Clone)]
pub struct EditDialog {
    pub draft: FormDraft,
    error: Option<FormError>,
}

impl EditDialog {
    pub fn new(draft: FormDraft, jails: &[Jail]) -> Self {
        let mut dialog = Self { draft, error: None };
        dialog.revalidate(jails);
        dialog
    }

    pub fn revalidate(&mut self, jails: &[Jail]) {
        self.error = self.draft.validate(jails).err();
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    pub fn can_save(&self) -> bool {
        self.error.is_none()
    }
}
