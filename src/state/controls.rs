use crate::ui::modal_stack::DialogKind;

/// Buttons of the main toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarButton {
    New,
    Edit,
    Delete,
    Reload,
    Refresh,
    Audit,
}

impl ToolbarButton {
    pub fn all() -> &'static [ToolbarButton] {
        &[
            ToolbarButton::New,
            ToolbarButton::Edit,
            ToolbarButton::Delete,
            ToolbarButton::Reload,
            ToolbarButton::Refresh,
            ToolbarButton::Audit,
        ]
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            ToolbarButton::New => "btn.new",
            ToolbarButton::Edit => "btn.edit",
            ToolbarButton::Delete => "btn.delete",
            ToolbarButton::Reload => "btn.reload",
            ToolbarButton::Refresh => "btn.refresh",
            ToolbarButton::Audit => "btn.audit",
        }
    }

    /// Edit and delete act on the selected jail.
    pub fn needs_selection(&self) -> bool {
        matches!(self, ToolbarButton::Edit | ToolbarButton::Delete)
    }
}

/// Stable identifier of an interactive control.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlId {
    Toolbar(ToolbarButton),
    LanguageSelect,
    ThemeSelect,
    JailTable,

    EditName,
    EditContent,
    EditSave,
    EditCancel,

    BanInput,
    BanAdd,
    BanList,
    BanExport,
    BanImport,
    BanClear,
    BanClose,

    AuditFilter,
    AuditRefresh,
    AuditList,
    AuditExport,
    AuditClear,
    AuditClose,

    ImportPath,
    ImportSubmit,
    ImportCancel,

    ConfirmYes,
    ConfirmNo,
    MessageClose,
}

impl ControlId {
    /// Controls that take typed characters when focused.
    pub fn is_text_input(&self) -> bool {
        matches!(
            self,
            ControlId::EditName
                | ControlId::EditContent
                | ControlId::BanInput
                | ControlId::AuditFilter
                | ControlId::ImportPath
        )
    }

    /// Controls whose arrow keys move a highlight instead of focus.
    pub fn is_list(&self) -> bool {
        matches!(self, ControlId::JailTable | ControlId::BanList | ControlId::AuditList)
    }

    /// Dialog the control belongs to; `None` for background controls.
    pub fn dialog(&self) -> Option<DialogKind> {
        match self {
            ControlId::Toolbar(_)
            | ControlId::LanguageSelect
            | ControlId::ThemeSelect
            | ControlId::JailTable => None,
            ControlId::EditName
            | ControlId::EditContent
            | ControlId::EditSave
            | ControlId::EditCancel => Some(DialogKind::Edit),
            ControlId::BanInput
            | ControlId::BanAdd
            | ControlId::BanList
            | ControlId::BanExport
            | ControlId::BanImport
            | ControlId::BanClear
            | ControlId::BanClose => Some(DialogKind::BanList),
            ControlId::AuditFilter
            | ControlId::AuditRefresh
            | ControlId::AuditList
            | ControlId::AuditExport
            | ControlId::AuditClear
            | ControlId::AuditClose => Some(DialogKind::Audit),
            ControlId::ImportPath | ControlId::ImportSubmit | ControlId::ImportCancel => {
                Some(DialogKind::Import)
            }
            ControlId::ConfirmYes | ControlId::ConfirmNo => Some(DialogKind::Confirm),
            ControlId::MessageClose => Some(DialogKind::Message),
        }
    }
}

/// Controls of a dialog in tab order, before disabled ones are filtered out.
pub fn dialog_controls(kind: DialogKind) -> &'static [ControlId] {
    match kind {
        DialogKind::Edit => &[
            ControlId::EditName,
            ControlId::EditContent,
            ControlId::EditSave,
            ControlId::EditCancel,
        ],
        DialogKind::BanList => &[
            ControlId::BanInput,
            ControlId::BanAdd,
            ControlId::BanList,
            ControlId::BanExport,
            ControlId::BanImport,
            ControlId::BanClear,
            ControlId::BanClose,
        ],
        DialogKind::Audit => &[
            ControlId::AuditFilter,
            ControlId::AuditRefresh,
            ControlId::AuditList,
            ControlId::AuditExport,
            ControlId::AuditClear,
            ControlId::AuditClose,
        ],
        DialogKind::Import => &[
            ControlId::ImportPath,
            ControlId::ImportSubmit,
            ControlId::ImportCancel,
        ],
        DialogKind::Confirm => &[ControlId::ConfirmNo, ControlId::ConfirmYes],
        DialogKind::Message => &[ControlId::MessageClose],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_dialog_control_maps_back_to_its_dialog() {
        for kind in [
            DialogKind::Edit,
            DialogKind::BanList,
            DialogKind::Audit,
            DialogKind::Import,
            DialogKind::Confirm,
            DialogKind::Message,
        ] {
            for control in dialog_controls(kind) {
                assert_eq!(control.dialog(), Some(kind));
            }
        }
        assert_eq!(ControlId::JailTable.dialog(), None);
    }
}
