//! Small dialogs: confirmation, message and the import path prompt.

use crate::ui::text_input::TextInput;

/// Destructive actions that must be confirmed before a request is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmIntent {
    DeleteJail(String),
    ClearBans(String),
    ClearAudit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmView {
    pub intent: ConfirmIntent,
    pub text: String,
}

/// Asks for the file whose addresses are bulk-banned into `jail`.
#[derive(Debug, Clone)]
pub struct ImportPrompt {
    pub jail: String,
    pub path: TextInput,
}

impl ImportPrompt {
    pub fn new(jail: &str) -> Self {
        Self {
            jail: jail.to_string(),
            path: TextInput::default(),
        }
    }

    /// Entered path with a leading `~/` expanded to the home directory.
    pub fn resolved_path(&self) -> Option<std::path::PathBuf> {
        let raw = self.path.value().trim();
        if raw.is_empty() {
            return None;
        }
        match raw.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => Some(std::path::PathBuf::from(raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_path_resolves_to_nothing() {
        let mut prompt = ImportPrompt::new("sshd");
        assert_eq!(prompt.resolved_path(), None);
        prompt.path.set(" /tmp/ips.txt ");
        assert_eq!(
            prompt.resolved_path(),
            Some(std::path::PathBuf::from("/tmp/ips.txt"))
        );
    }
}
