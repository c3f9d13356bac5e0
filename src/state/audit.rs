use crate::model::AuditEntry;
use crate::ui::text_input::TextInput;

/// The audit log dialog.
#[derive(Debug, Clone, Default)]
pub struct AuditView {
    pub filter: TextInput,
    entries: Vec<AuditEntry>,
    highlighted: usize,
}

impl AuditView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter text as sent with the `audit` action.
    pub fn query(&self) -> String {
        self.filter.value().trim().to_string()
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Replace the rendered entries. The list is always rebuilt, never merged.
    pub fn set_entries(&mut self, entries: Vec<AuditEntry>) {
        self.entries = entries;
        self.highlighted = 0;
    }

    pub fn clear_entries(&mut self) {
        self.set_entries(Vec::new());
    }

    pub fn highlighted(&self) -> Option<usize> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.highlighted)
        }
    }

    pub fn highlight(&mut self, index: usize) {
        self.highlighted = index.min(self.entries.len().saturating_sub(1));
    }

    pub fn highlight_next(&mut self) {
        self.highlight(self.highlighted + 1);
    }

    pub fn highlight_prev(&mut self) {
        self.highlight(self.highlighted.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: &str) -> AuditEntry {
        AuditEntry {
            ts: "2024-05-01T10:00:00Z".to_string(),
            action: action.to_string(),
            jail: None,
            ip: None,
            note: None,
        }
    }

    #[test]
    fn query_is_trimmed() {
        let mut view = AuditView::new();
        view.filter.set("  sshd ");
        assert_eq!(view.query(), "sshd");
    }

    #[test]
    fn new_entries_reset_highlight() {
        let mut view = AuditView::new();
        view.set_entries(vec![entry("ban"), entry("unban")]);
        view.highlight_next();
        view.highlight_next();
        assert_eq!(view.highlighted(), Some(1));

        view.set_entries(vec![entry("clear")]);
        assert_eq!(view.highlighted(), Some(0));
        view.clear_entries();
        assert_eq!(view.highlighted(), None);
    }
}
