use std::collections::HashSet;

use crate::state::controls::ControlId;
use crate::ui::text_input::TextInput;

const BULK_LOCKED: [ControlId; 3] = [ControlId::BanExport, ControlId::BanImport, ControlId::BanAdd];
const CLEAR_LOCKED: [ControlId; 2] = [ControlId::BanClear, ControlId::BanAdd];

/// The banned-address dialog of one jail.
///
/// Rows are seeded from the jail's `banIPs` when the dialog opens and are
/// afterwards only changed optimistically by actions taken inside it.
#[derive(Debug, Clone)]
pub struct BanListView {
    jail: String,
    entries: Vec<String>,
    pub input: TextInput,
    highlighted: usize,
    disabled: HashSet<ControlId>,
    bulk_flights: usize,
    clear_flights: usize,
}

impl BanListView {
    pub fn new(jail: &str, entries: Vec<String>) -> Self {
        Self {
            jail: jail.to_string(),
            entries,
            input: TextInput::default(),
            highlighted: 0,
            disabled: HashSet::new(),
            bulk_flights: 0,
            clear_flights: 0,
        }
    }

    pub fn jail(&self) -> &str {
        &self.jail
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn append(&mut self, ip: &str) {
        self.entries.push(ip.to_string());
    }

    /// Drop the first row showing `ip`. A row that is already gone is a no-op.
    pub fn remove(&mut self, ip: &str) -> bool {
        match self.entries.iter().position(|e| e == ip) {
            Some(index) => {
                self.entries.remove(index);
                self.clamp_highlight();
                true
            }
            None => false,
        }
    }

    pub fn clear_entries(&mut self) {
        self.entries.clear();
        self.highlighted = 0;
    }

    pub fn highlighted(&self) -> Option<usize> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.highlighted)
        }
    }

    pub fn highlighted_ip(&self) -> Option<&str> {
        self.entries.get(self.highlighted).map(String::as_str)
    }

    pub fn highlight_next(&mut self) {
        if self.highlighted + 1 < self.entries.len() {
            self.highlighted += 1;
        }
    }

    pub fn highlight_prev(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }

    pub fn highlight(&mut self, index: usize) {
        self.highlighted = index;
        self.clamp_highlight();
    }

    /// Disabled by its own state or by any request in flight that locks it.
    pub fn is_disabled(&self, control: &ControlId) -> bool {
        self.disabled.contains(control)
            || (self.bulk_flights > 0 && BULK_LOCKED.contains(control))
            || (self.clear_flights > 0 && CLEAR_LOCKED.contains(control))
    }

    pub fn set_disabled(&mut self, control: ControlId, disabled: bool) {
        if disabled {
            self.disabled.insert(control);
        } else {
            self.disabled.remove(&control);
        }
    }

    /// Export, import and add stay disabled until the matching `end_bulk`.
    pub fn begin_bulk(&mut self) {
        self.bulk_flights += 1;
    }

    pub fn end_bulk(&mut self) {
        self.bulk_flights = self.bulk_flights.saturating_sub(1);
    }

    /// Clear and add stay disabled until the matching `end_clear`.
    pub fn begin_clear(&mut self) {
        self.clear_flights += 1;
    }

    pub fn end_clear(&mut self) {
        self.clear_flights = self.clear_flights.saturating_sub(1);
    }

    fn clamp_highlight(&mut self) {
        if self.highlighted >= self.entries.len() {
            self.highlighted = self.entries.len().saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_does_not_deduplicate_against_rows() {
        let mut view = BanListView::new("sshd", vec!["1.2.3.4".to_string()]);
        view.append("1.2.3.4");
        assert_eq!(view.entries().len(), 2);
        assert!(view.remove("1.2.3.4"));
        assert_eq!(view.entries(), ["1.2.3.4"]);
        assert!(!view.remove("9.9.9.9"));
    }

    #[test]
    fn bulk_lock_keeps_own_disabled_state() {
        let mut view = BanListView::new("sshd", Vec::new());
        view.set_disabled(ControlId::BanExport, true);

        view.begin_bulk();
        assert!(view.is_disabled(&ControlId::BanImport));
        assert!(view.is_disabled(&ControlId::BanAdd));
        assert!(!view.is_disabled(&ControlId::BanClear));

        view.end_bulk();
        assert!(view.is_disabled(&ControlId::BanExport));
        assert!(!view.is_disabled(&ControlId::BanImport));
        assert!(!view.is_disabled(&ControlId::BanAdd));
    }

    #[test]
    fn overlapping_locks_release_in_any_order() {
        let all = [
            ControlId::BanExport,
            ControlId::BanImport,
            ControlId::BanAdd,
            ControlId::BanClear,
        ];

        // Clear started during a bulk import, bulk settles first.
        let mut view = BanListView::new("sshd", Vec::new());
        view.begin_bulk();
        view.begin_clear();
        view.end_bulk();
        assert!(view.is_disabled(&ControlId::BanAdd));
        assert!(view.is_disabled(&ControlId::BanClear));
        assert!(!view.is_disabled(&ControlId::BanExport));
        assert!(!view.is_disabled(&ControlId::BanImport));
        view.end_clear();
        assert!(all.iter().all(|c| !view.is_disabled(c)));

        // Clear settles first.
        let mut view = BanListView::new("sshd", Vec::new());
        view.begin_bulk();
        view.begin_clear();
        view.end_clear();
        assert!(view.is_disabled(&ControlId::BanAdd));
        assert!(!view.is_disabled(&ControlId::BanClear));
        view.end_bulk();
        assert!(all.iter().all(|c| !view.is_disabled(c)));

        // Unmatched releases do not unlock a later flight.
        view.end_clear();
        view.begin_clear();
        assert!(view.is_disabled(&ControlId::BanClear));
    }

    #[test]
    fn highlight_stays_in_range_after_removal() {
        let mut view = BanListView::new("sshd", vec!["a".to_string(), "b".to_string()]);
        view.highlight_next();
        assert_eq!(view.highlighted_ip(), Some("b"));
        view.remove("b");
        assert_eq!(view.highlighted_ip(), Some("a"));
        view.clear_entries();
        assert_eq!(view.highlighted(), None);
    }
}
