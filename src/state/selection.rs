use crate::state::controls::ToolbarButton;

/// Which jail row is selected.
///
/// Rows are recreated on every jail-list render, so selection never survives
/// a refresh, even when the same jail is still listed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    NoSelection,
    Selected(String),
}

impl Selection {
    pub fn select(&mut self, name: &str) {
        *self = Selection::Selected(name.to_string());
    }

    /// Called by every jail-list render.
    pub fn clear_on_render(&mut self) {
        *self = Selection::NoSelection;
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Selection::NoSelection => None,
            Selection::Selected(name) => Some(name),
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Selection::Selected(_))
    }
}

/// Toolbar enablement: everything is off while a dialog is open; otherwise
/// edit/delete follow the selection and the rest are always on.
pub fn toolbar_enabled(button: ToolbarButton, selection: &Selection, modal_open: bool) -> bool {
    if modal_open {
        return false;
    }
    !button.needs_selection() || selection.is_selected()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_and_delete_follow_selection() {
        let mut selection = Selection::default();
        assert!(!toolbar_enabled(ToolbarButton::Edit, &selection, false));
        assert!(!toolbar_enabled(ToolbarButton::Delete, &selection, false));
        assert!(toolbar_enabled(ToolbarButton::New, &selection, false));
        assert!(toolbar_enabled(ToolbarButton::Refresh, &selection, false));

        selection.select("sshd");
        assert!(toolbar_enabled(ToolbarButton::Edit, &selection, false));
        assert_eq!(selection.name(), Some("sshd"));

        selection.clear_on_render();
        assert!(!toolbar_enabled(ToolbarButton::Delete, &selection, false));
    }

    #[test]
    fn open_dialog_disables_everything() {
        let mut selection = Selection::default();
        selection.select("sshd");
        for button in ToolbarButton::all() {
            assert!(!toolbar_enabled(*button, &selection, true));
        }
    }
}
