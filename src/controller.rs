//! Application state and the single controller that mutates it.
//!
//! Everything here runs on the UI thread. Requests go out through the
//! [`Gateway`] and come back as completions that [`Controller::poll`] settles;
//! no other code path touches the state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::i18n::{t, Language};
use crate::model::Jail;
use crate::services::api_client::{Backend, Envelope, Request};
use crate::services::exports;
use crate::services::gateway::{Completion, Gateway, Ticket};
use crate::services::preferences::{PreferenceStore, LANG_KEY, THEME_KEY};
use crate::state::audit::AuditView;
use crate::state::ban_list::BanListView;
use crate::state::controls::{dialog_controls, ControlId, ToolbarButton};
use crate::state::dialogs::{ConfirmIntent, ConfirmView, ImportPrompt};
use crate::state::form::{EditDialog, FormDraft};
use crate::state::selection::{toolbar_enabled, Selection};
use crate::ui::hit_map::Hit;
use crate::ui::modal_stack::{DialogKind, Intercept, ModalStack, TrapKey};
use crate::ui::text_input::TextInput;
use crate::ui::theme::ThemeMode;
use crate::utils::addresses::{split_addresses, unique};
use crate::utils::config::Config;
use crate::utils::errors::TransportError;

/// What an in-flight request was issued for.
#[derive(Debug)]
pub enum Pending {
    Status,
    Read { jail: String },
    Write,
    Delete,
    Ban { jail: String, ip: String },
    Unban { jail: String, ip: String },
    BulkBan { jail: String, unique: Vec<String> },
    Clear { jail: String },
    Reload,
    Audit { export: bool },
    AuditClear,
}

pub struct Controller {
    config: Config,
    gateway: Gateway<Pending>,
    preferences: Box<dyn PreferenceStore>,

    jails: Vec<Jail>,
    selection: Selection,
    table_offset: usize,
    table_rows: usize,
    last_status: Ticket,

    language: Language,
    theme_mode: ThemeMode,

    focus: Option<ControlId>,
    modals: ModalStack,
    editor: Option<EditDialog>,
    ban_list: Option<BanListView>,
    audit: Option<AuditView>,
    import: Option<ImportPrompt>,
    confirm: Option<ConfirmView>,
    message: Option<String>,
    notice: Option<(String, Instant)>,
}

impl Controller {
    pub fn new(
        config: Config,
        backend: Arc<dyn Backend>,
        preferences: Box<dyn PreferenceStore>,
    ) -> Self {
        let language = Language::resolve(
            preferences.get(LANG_KEY).as_deref(),
            Language::system_locale().as_deref(),
        );
        let theme_mode = ThemeMode::from_tag(preferences.get(THEME_KEY).as_deref());
        log::info!(
            "Console ready: endpoint={} lang={} theme={}",
            config.endpoint,
            language.tag(),
            theme_mode.tag()
        );

        Self {
            config,
            gateway: Gateway::new(backend),
            preferences,
            jails: Vec::new(),
            selection: Selection::default(),
            table_offset: 0,
            table_rows: usize::MAX,
            last_status: 0,
            language,
            theme_mode,
            focus: Some(ControlId::JailTable),
            modals: ModalStack::new(),
            editor: None,
            ban_list: None,
            audit: None,
            import: None,
            confirm: None,
            message: None,
            notice: None,
        }
    }

    // ----- read access for rendering and tests -----

    pub fn jails(&self) -> &[Jail] {
        &self.jails
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn table_offset(&self) -> usize {
        self.table_offset
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.theme_mode
    }

    pub fn focus(&self) -> Option<&ControlId> {
        self.focus.as_ref()
    }

    pub fn modals(&self) -> &ModalStack {
        &self.modals
    }

    pub fn editor(&self) -> Option<&EditDialog> {
        self.editor.as_ref()
    }

    pub fn ban_list(&self) -> Option<&BanListView> {
        self.ban_list.as_ref()
    }

    pub fn audit(&self) -> Option<&AuditView> {
        self.audit.as_ref()
    }

    pub fn import_prompt(&self) -> Option<&ImportPrompt> {
        self.import.as_ref()
    }

    pub fn confirm(&self) -> Option<&ConfirmView> {
        self.confirm.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Last surfaced notification, if it is younger than `max_age`.
    pub fn notice(&self, max_age: Duration) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|(_, at)| at.elapsed() < max_age)
            .map(|(text, _)| text.as_str())
    }

    pub fn in_flight(&self) -> usize {
        self.gateway.in_flight()
    }

    pub fn tr(&self, key: &str) -> String {
        t(self.language, key, &[])
    }

    pub fn toolbar_enabled(&self, button: ToolbarButton) -> bool {
        toolbar_enabled(button, &self.selection, !self.modals.is_empty())
    }

    /// The control is rendered and not disabled, wherever it sits.
    pub fn is_enabled(&self, id: &ControlId) -> bool {
        match id {
            ControlId::Toolbar(button) => self.toolbar_enabled(*button),
            ControlId::LanguageSelect | ControlId::ThemeSelect | ControlId::JailTable => true,
            ControlId::EditName => self
                .editor
                .as_ref()
                .map_or(false, |e| e.draft.name_editable()),
            ControlId::EditContent | ControlId::EditCancel => self.editor.is_some(),
            ControlId::EditSave => self.editor.as_ref().map_or(false, EditDialog::can_save),
            ControlId::BanAdd | ControlId::BanExport | ControlId::BanImport | ControlId::BanClear => {
                self.ban_list.as_ref().map_or(false, |v| !v.is_disabled(id))
            }
            ControlId::BanInput | ControlId::BanList | ControlId::BanClose => {
                self.ban_list.is_some()
            }
            ControlId::AuditFilter
            | ControlId::AuditRefresh
            | ControlId::AuditList
            | ControlId::AuditExport
            | ControlId::AuditClear
            | ControlId::AuditClose => self.audit.is_some(),
            ControlId::ImportPath | ControlId::ImportSubmit | ControlId::ImportCancel => {
                self.import.is_some()
            }
            ControlId::ConfirmYes | ControlId::ConfirmNo => self.confirm.is_some(),
            ControlId::MessageClose => self.message.is_some(),
        }
    }

    /// Enabled and not covered by a dialog above it.
    pub fn is_focusable(&self, id: &ControlId) -> bool {
        self.is_enabled(id) && id.dialog() == self.modals.top_kind()
    }

    pub fn set_table_rows(&mut self, rows: usize) {
        self.table_rows = rows.max(1);
    }

    // ----- request plumbing -----

    /// Settle every completion that has arrived.
    pub fn poll(&mut self) {
        while let Some(done) = self.gateway.try_next() {
            self.settle(done);
        }
        self.sync_focusables();
        self.repair_focus();
    }

    /// Block until no request is in flight, settling completions (and the
    /// refreshes they trigger) as they arrive. Returns false on timeout.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.gateway.in_flight() > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            if let Some(done) = self.gateway.wait_next(deadline - now) {
                self.settle(done);
                self.sync_focusables();
                self.repair_focus();
            }
        }
        true
    }

    pub fn refresh_status(&mut self) {
        self.gateway.issue(Request::Status, Pending::Status);
    }

    fn settle(&mut self, done: Completion<Pending>) {
        let Completion {
            ticket,
            context,
            outcome,
        } = done;
        match context {
            Pending::Status => self.settle_status(ticket, outcome),
            Pending::Read { jail } => self.settle_read(jail, outcome),
            Pending::Write => self.settle_write(outcome),
            Pending::Delete => {
                let text = self.outcome_text(&outcome, "msg.deleteSuccess", "msg.deleteFail");
                self.show_message(text);
                self.refresh_status();
            }
            Pending::Reload => {
                let text = match outcome {
                    Ok(ref envelope) if envelope.success => self.tr("msg.reloadSuccess"),
                    Ok(ref envelope) => t(
                        self.language,
                        "msg.reloadFail",
                        &[("err", envelope.message.as_deref().unwrap_or_default())],
                    ),
                    Err(ref e) => t(self.language, "msg.reloadFail", &[("err", &e.to_string())]),
                };
                self.show_message(text);
                self.refresh_status();
            }
            Pending::Ban { jail, ip } => {
                let accepted = matches!(outcome, Ok(ref envelope) if envelope.success);
                let text = self.outcome_text(&outcome, "msg.banSuccess", "msg.banFail");
                if accepted {
                    if let Some(view) = self.ban_list_for(&jail) {
                        view.input.clear();
                        view.append(&ip);
                    }
                }
                self.show_message(text);
                self.refresh_status();
            }
            Pending::Unban { jail, ip } => {
                let accepted = matches!(outcome, Ok(ref envelope) if envelope.success);
                let text = self.outcome_text(&outcome, "msg.unbanSuccess", "msg.unbanFail");
                if accepted {
                    if let Some(view) = self.ban_list_for(&jail) {
                        view.remove(&ip);
                    }
                }
                self.show_message(text);
                self.refresh_status();
            }
            Pending::BulkBan { jail, unique } => self.settle_bulk_ban(jail, unique, outcome),
            Pending::Clear { jail } => {
                let accepted = matches!(outcome, Ok(ref envelope) if envelope.success);
                let text = self.outcome_text(&outcome, "msg.clearSuccess", "msg.clearFail");
                if let Some(view) = self.ban_list_for(&jail) {
                    view.end_clear();
                    if accepted {
                        view.clear_entries();
                    }
                }
                self.show_message(text);
                self.refresh_status();
            }
            Pending::Audit { export } => self.settle_audit(export, outcome),
            Pending::AuditClear => {
                let accepted = matches!(outcome, Ok(ref envelope) if envelope.success);
                let text = self.outcome_text(&outcome, "msg.clearSuccess", "msg.clearFail");
                if accepted {
                    if let Some(view) = self.audit.as_mut() {
                        view.clear_entries();
                    }
                    self.refresh_status();
                }
                self.show_message(text);
            }
        }
    }

    fn settle_status(&mut self, ticket: Ticket, outcome: Result<Envelope, TransportError>) {
        match outcome {
            Ok(envelope) if envelope.success => {
                if ticket < self.last_status {
                    log::debug!(
                        "Discarding status #{} (already applied #{})",
                        ticket,
                        self.last_status
                    );
                    return;
                }
                self.last_status = ticket;
                self.render_jails(envelope.jails());
            }
            Ok(envelope) => {
                let text = envelope
                    .message
                    .unwrap_or_else(|| t(self.language, "msg.fetchStatusFail", &[("err", "")]));
                self.show_message(text);
            }
            Err(e) => {
                let text = t(self.language, "msg.fetchStatusFail", &[("err", &e.to_string())]);
                self.show_message(text);
            }
        }
    }

    /// Rebuild the jail table. Rows are recreated, so the selection is
    /// always dropped, even when the selected jail is still listed.
    fn render_jails(&mut self, jails: Vec<Jail>) {
        log::debug!("Rendering {} jails", jails.len());
        self.jails = jails;
        self.selection.clear_on_render();
        self.table_offset = self.table_offset.min(self.jails.len().saturating_sub(1));
        if let Some(editor) = self.editor.as_mut() {
            editor.revalidate(&self.jails);
        }
    }

    fn settle_read(&mut self, jail: String, outcome: Result<Envelope, TransportError>) {
        match outcome {
            Ok(envelope) if envelope.success => {
                let draft = FormDraft::existing(&jail, &envelope.content());
                self.editor = Some(EditDialog::new(draft, &self.jails));
                self.open_dialog(DialogKind::Edit);
            }
            Ok(envelope) => {
                let text = envelope
                    .message
                    .unwrap_or_else(|| t(self.language, "msg.fetchStatusFail", &[("err", "")]));
                self.show_message(text);
            }
            Err(e) => {
                let text = t(self.language, "msg.fetchStatusFail", &[("err", &e.to_string())]);
                self.show_message(text);
            }
        }
    }

    fn settle_write(&mut self, outcome: Result<Envelope, TransportError>) {
        match outcome {
            Ok(envelope) if envelope.success => {
                self.close_dialog(DialogKind::Edit);
                let text = envelope
                    .message
                    .unwrap_or_else(|| self.tr("msg.saveSuccess"));
                self.show_message(text);
                self.refresh_status();
            }
            Ok(envelope) => {
                let text = match envelope.message {
                    Some(message) => message,
                    None => {
                        let raw = serde_json::to_string(&envelope.payload).unwrap_or_default();
                        t(self.language, "msg.saveFail", &[("err", &raw)])
                    }
                };
                self.show_message(text);
            }
            Err(e) => {
                let text = t(self.language, "msg.saveFail", &[("err", &e.to_string())]);
                self.show_message(text);
            }
        }
    }

    fn settle_bulk_ban(
        &mut self,
        jail: String,
        unique: Vec<String>,
        outcome: Result<Envelope, TransportError>,
    ) {
        let language = self.language;
        let text = match outcome {
            Ok(ref envelope) => {
                let failed_ips: Vec<String> =
                    envelope.failed().into_iter().filter_map(|f| f.ip).collect();
                let succeeded: Vec<&String> =
                    unique.iter().filter(|ip| !failed_ips.contains(ip)).collect();
                log::info!(
                    "Bulk ban on {}: {} sent, {} failed",
                    jail,
                    unique.len(),
                    failed_ips.len()
                );
                if let Some(view) = self.ban_list_for(&jail) {
                    for ip in succeeded {
                        view.append(ip);
                    }
                }
                if envelope.success {
                    t(language, "msg.importSuccess", &[])
                } else {
                    let failed = envelope.failed().len();
                    let base = envelope
                        .message
                        .clone()
                        .unwrap_or_else(|| t(language, "msg.importFail", &[]));
                    if failed > 0 {
                        format!("{} ({})", base, failed)
                    } else {
                        base
                    }
                }
            }
            Err(ref e) => format!("{}: {}", t(language, "msg.importFail", &[]), e),
        };
        if let Some(view) = self.ban_list_for(&jail) {
            view.end_bulk();
        }
        self.show_message(text);
        self.refresh_status();
    }

    fn settle_audit(&mut self, export: bool, outcome: Result<Envelope, TransportError>) {
        let entries = match outcome {
            Ok(ref envelope) if envelope.success => envelope.entries(),
            _ => None,
        };
        match (export, entries) {
            (false, Some(entries)) => {
                if let Some(view) = self.audit.as_mut() {
                    view.set_entries(entries);
                }
            }
            (false, None) => {
                let text = match outcome {
                    Ok(envelope) => envelope.message.unwrap_or_else(|| {
                        t(self.language, "msg.fetchStatusFail", &[("err", "")])
                    }),
                    Err(e) => {
                        t(self.language, "msg.fetchStatusFail", &[("err", &e.to_string())])
                    }
                };
                self.show_message(text);
            }
            (true, Some(entries)) => {
                let text = match exports::export_audit(&self.config.export_dir, &entries) {
                    Ok(path) => t(
                        self.language,
                        "msg.exportSuccess",
                        &[("path", &path.display().to_string())],
                    ),
                    Err(e) => {
                        log::error!("Audit export failed: {}", e);
                        format!("{}: {}", self.tr("msg.exportFail"), e)
                    }
                };
                self.show_message(text);
            }
            (true, None) => {
                let text = match outcome {
                    Err(e) => format!("{}: {}", self.tr("msg.exportFail"), e),
                    Ok(_) => self.tr("msg.exportFail"),
                };
                self.show_message(text);
            }
        }
    }

    /// `message` or the localized default on success or rejection, and the
    /// failure default followed by the raw error on transport failure.
    fn outcome_text(
        &self,
        outcome: &Result<Envelope, TransportError>,
        success_key: &str,
        failure_key: &str,
    ) -> String {
        match outcome {
            Ok(envelope) if envelope.success => envelope
                .message
                .clone()
                .unwrap_or_else(|| self.tr(success_key)),
            Ok(envelope) => envelope
                .message
                .clone()
                .unwrap_or_else(|| self.tr(failure_key)),
            Err(e) => format!("{}: {}", self.tr(failure_key), e),
        }
    }

    /// The open ban list, if it still shows `jail`. Completions for a
    /// dialog that has since closed fall through as no-ops.
    fn ban_list_for(&mut self, jail: &str) -> Option<&mut BanListView> {
        self.ban_list.as_mut().filter(|view| view.jail() == jail)
    }

    // ----- dialogs and focus -----

    fn open_dialog(&mut self, kind: DialogKind) {
        let focusable = self.focusable_in(kind);
        if let Some(first) = self.modals.open(kind, focusable, self.focus.clone()) {
            self.focus = Some(first);
        }
    }

    /// Close a dialog wherever it sits in the stack and drop its view.
    pub fn close_dialog(&mut self, kind: DialogKind) {
        let was_top = self.modals.top_kind() == Some(kind);
        let Some(frame) = self.modals.close(kind) else {
            return;
        };
        match kind {
            DialogKind::Edit => self.editor = None,
            DialogKind::BanList => self.ban_list = None,
            DialogKind::Audit => self.audit = None,
            DialogKind::Import => self.import = None,
            DialogKind::Confirm => self.confirm = None,
            DialogKind::Message => self.message = None,
        }
        self.sync_focusables();
        if was_top {
            self.focus = match frame.previously_focused {
                Some(target) if self.is_focusable(&target) => Some(target),
                _ => self.fallback_focus(),
            };
        } else {
            self.repair_focus();
        }
    }

    fn show_message(&mut self, text: String) {
        log::info!("Notify: {}", text);
        self.notice = Some((text.clone(), Instant::now()));
        self.message = Some(text);
        self.open_dialog(DialogKind::Message);
    }

    fn show_confirm(&mut self, intent: ConfirmIntent, text: String) {
        self.confirm = Some(ConfirmView { intent, text });
        self.open_dialog(DialogKind::Confirm);
    }

    fn focusable_in(&self, kind: DialogKind) -> Vec<ControlId> {
        dialog_controls(kind)
            .iter()
            .filter(|c| self.is_enabled(c))
            .cloned()
            .collect()
    }

    /// Recompute the focusable set of every open frame.
    fn sync_focusables(&mut self) {
        let kinds: Vec<DialogKind> = self.modals.frames().map(|f| f.kind).collect();
        for kind in kinds {
            let focusable = self.focusable_in(kind);
            self.modals.set_focusable(kind, focusable);
        }
    }

    fn repair_focus(&mut self) {
        let keep = self.focus.as_ref().map_or(false, |f| self.is_focusable(f));
        if !keep {
            self.focus = self.fallback_focus();
        }
    }

    fn fallback_focus(&self) -> Option<ControlId> {
        match self.modals.top() {
            Some(frame) => frame.focusable.first().cloned(),
            None => Some(ControlId::JailTable),
        }
    }

    fn background_controls(&self) -> Vec<ControlId> {
        let mut controls: Vec<ControlId> = ToolbarButton::all()
            .iter()
            .filter(|b| self.toolbar_enabled(**b))
            .map(|b| ControlId::Toolbar(*b))
            .collect();
        controls.extend([
            ControlId::LanguageSelect,
            ControlId::ThemeSelect,
            ControlId::JailTable,
        ]);
        controls
    }

    // ----- input -----

    /// Handle a key press. Returns true when the console should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let quit = if self.modals.is_empty() {
            self.handle_main_key(key)
        } else {
            self.handle_dialog_key(key);
            false
        };
        self.sync_focusables();
        self.repair_focus();
        quit
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return true,
            KeyCode::Char('q') => return true,
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.cycle_background(true)
            }
            KeyCode::Tab => self.cycle_background(false),
            KeyCode::BackTab => self.cycle_background(true),
            KeyCode::Up => self.move_selection(false),
            KeyCode::Down => self.move_selection(true),
            KeyCode::PageUp => self.scroll(false),
            KeyCode::PageDown => self.scroll(true),
            KeyCode::Enter => {
                let target = self.focus.clone().unwrap_or(ControlId::JailTable);
                self.activate(target);
            }
            KeyCode::F(5) => self.refresh_status(),
            KeyCode::Char('n') => self.open_new(),
            KeyCode::Char('e') => self.edit_selected(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('a') => self.open_audit(),
            KeyCode::Char('l') => self.set_language(self.language.next()),
            KeyCode::Char('t') => self.set_theme(self.theme_mode.next()),
            _ => {}
        }
        false
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let trap = match key.code {
            KeyCode::Esc => Some(TrapKey::Escape),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Some(TrapKey::BackTab),
            KeyCode::Tab => Some(TrapKey::Tab),
            KeyCode::BackTab => Some(TrapKey::BackTab),
            _ => None,
        };
        if let Some(trap) = trap {
            match self.modals.intercept(trap, self.focus.as_ref()) {
                Intercept::Close(kind) => self.close_dialog(kind),
                Intercept::Focus(id) => self.focus = Some(id),
                Intercept::Swallow | Intercept::Pass => {}
            }
            return;
        }

        if ctrl && key.code == KeyCode::Char('s') {
            if self.modals.top_kind() == Some(DialogKind::Edit) {
                self.save();
            }
            return;
        }

        let Some(focused) = self.focus.clone() else {
            return;
        };
        if focused.dialog() != self.modals.top_kind() {
            return;
        }

        match (key.code, &focused) {
            (KeyCode::Enter, ControlId::EditContent) => self.edit_text(&focused, |i| i.insert('\n')),
            (KeyCode::Enter, ControlId::EditName) => self.focus = Some(ControlId::EditContent),
            (KeyCode::Enter, ControlId::BanInput) => self.add_ban(),
            (KeyCode::Enter, ControlId::AuditFilter) => self.audit_refresh(),
            (KeyCode::Enter, ControlId::ImportPath) => self.submit_import(),
            (KeyCode::Enter, _) => self.activate(focused.clone()),
            (KeyCode::Delete, ControlId::BanList) => self.unban_highlighted(),
            (KeyCode::Up, ControlId::BanList) | (KeyCode::Up, ControlId::AuditList) => {
                self.scroll(false)
            }
            (KeyCode::Down, ControlId::BanList) | (KeyCode::Down, ControlId::AuditList) => {
                self.scroll(true)
            }
            (code, id) if id.is_text_input() => match code {
                KeyCode::Char(c) if !ctrl => self.edit_text(&focused, |i| i.insert(c)),
                KeyCode::Backspace => self.edit_text(&focused, |i| {
                    i.backspace();
                }),
                KeyCode::Delete => self.edit_text(&focused, |i| {
                    i.delete();
                }),
                KeyCode::Left => self.edit_text(&focused, TextInput::left),
                KeyCode::Right => self.edit_text(&focused, TextInput::right),
                KeyCode::Home => self.edit_text(&focused, TextInput::home),
                KeyCode::End => self.edit_text(&focused, TextInput::end),
                KeyCode::Up => self.edit_text(&focused, TextInput::up),
                KeyCode::Down => self.edit_text(&focused, TextInput::down),
                _ => {}
            },
            _ => {}
        }
    }

    fn edit_text<F: FnOnce(&mut TextInput)>(&mut self, id: &ControlId, apply: F) {
        let input = match id {
            ControlId::EditName => self
                .editor
                .as_mut()
                .filter(|e| e.draft.name_editable())
                .map(|e| &mut e.draft.name),
            ControlId::EditContent => self.editor.as_mut().map(|e| &mut e.draft.content),
            ControlId::BanInput => self.ban_list.as_mut().map(|v| &mut v.input),
            ControlId::AuditFilter => self.audit.as_mut().map(|v| &mut v.filter),
            ControlId::ImportPath => self.import.as_mut().map(|p| &mut p.path),
            _ => None,
        };
        if let Some(input) = input {
            apply(input);
        }
        if matches!(id, ControlId::EditName | ControlId::EditContent) {
            if let Some(editor) = self.editor.as_mut() {
                editor.revalidate(&self.jails);
            }
        }
    }

    /// Route a mouse click. Only the top dialog (or the background when no
    /// dialog is open) reacts.
    pub fn click(&mut self, hit: &Hit) {
        let top = self.modals.top_kind();
        match hit {
            Hit::Backdrop(kind) => {
                if top == Some(*kind) {
                    self.close_dialog(*kind);
                }
            }
            Hit::Panel(_) => {}
            Hit::Control(id) => {
                if id.dialog() == top && self.is_enabled(id) {
                    self.focus = Some(id.clone());
                    if !id.is_text_input() && !id.is_list() {
                        self.activate(id.clone());
                    }
                }
            }
            Hit::JailRow(index) => {
                if top.is_none() {
                    self.select_row(*index);
                }
            }
            Hit::JailBans(index) => {
                if top.is_none() {
                    self.select_row(*index);
                    self.open_ban_list(*index);
                }
            }
            Hit::BanRow(index) => {
                if top == Some(DialogKind::BanList) {
                    if let Some(view) = self.ban_list.as_mut() {
                        view.highlight(*index);
                    }
                    self.focus = Some(ControlId::BanList);
                }
            }
            Hit::UnbanRow(index) => {
                if top == Some(DialogKind::BanList) {
                    if let Some(view) = self.ban_list.as_mut() {
                        view.highlight(*index);
                    }
                    self.focus = Some(ControlId::BanList);
                    self.unban_highlighted();
                }
            }
            Hit::AuditRow(index) => {
                if top == Some(DialogKind::Audit) {
                    if let Some(view) = self.audit.as_mut() {
                        view.highlight(*index);
                    }
                    self.focus = Some(ControlId::AuditList);
                }
            }
        }
        self.sync_focusables();
        self.repair_focus();
    }

    /// Wheel or paging. The jail table does not scroll while a dialog is
    /// open; the top dialog's list moves instead.
    pub fn scroll(&mut self, down: bool) {
        match self.modals.top_kind() {
            None => {
                let last = self.jails.len().saturating_sub(1);
                self.table_offset = if down {
                    (self.table_offset + 1).min(last)
                } else {
                    self.table_offset.saturating_sub(1)
                };
            }
            Some(DialogKind::BanList) => {
                if let Some(view) = self.ban_list.as_mut() {
                    if down {
                        view.highlight_next();
                    } else {
                        view.highlight_prev();
                    }
                }
            }
            Some(DialogKind::Audit) => {
                if let Some(view) = self.audit.as_mut() {
                    if down {
                        view.highlight_next();
                    } else {
                        view.highlight_prev();
                    }
                }
            }
            Some(_) => {}
        }
    }

    fn cycle_background(&mut self, backwards: bool) {
        let controls = self.background_controls();
        let last = controls.len() - 1;
        let index = match self
            .focus
            .as_ref()
            .and_then(|f| controls.iter().position(|c| c == f))
        {
            Some(0) if backwards => last,
            Some(i) if backwards => i - 1,
            Some(i) if i == last => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.focus = controls.get(index).cloned();
    }

    fn activate(&mut self, id: ControlId) {
        if !self.is_enabled(&id) {
            return;
        }
        match id {
            ControlId::Toolbar(ToolbarButton::New) => self.open_new(),
            ControlId::Toolbar(ToolbarButton::Edit) => self.edit_selected(),
            ControlId::Toolbar(ToolbarButton::Delete) => self.delete_selected(),
            ControlId::Toolbar(ToolbarButton::Reload) => self.reload(),
            ControlId::Toolbar(ToolbarButton::Refresh) => self.refresh_status(),
            ControlId::Toolbar(ToolbarButton::Audit) => self.open_audit(),
            ControlId::LanguageSelect => self.set_language(self.language.next()),
            ControlId::ThemeSelect => self.set_theme(self.theme_mode.next()),
            ControlId::JailTable => self.open_selected_ban_list(),
            ControlId::EditSave => self.save(),
            ControlId::EditCancel => self.close_dialog(DialogKind::Edit),
            ControlId::BanAdd => self.add_ban(),
            ControlId::BanExport => self.export_ban_list(),
            ControlId::BanImport => self.open_import(),
            ControlId::BanClear => self.request_clear(),
            ControlId::BanClose => self.close_dialog(DialogKind::BanList),
            ControlId::AuditRefresh => self.audit_refresh(),
            ControlId::AuditExport => self.audit_export(),
            ControlId::AuditClear => self.request_audit_clear(),
            ControlId::AuditClose => self.close_dialog(DialogKind::Audit),
            ControlId::ImportSubmit => self.submit_import(),
            ControlId::ImportCancel => self.close_dialog(DialogKind::Import),
            ControlId::ConfirmYes => self.answer_confirm(true),
            ControlId::ConfirmNo => self.answer_confirm(false),
            ControlId::MessageClose => self.close_dialog(DialogKind::Message),
            ControlId::EditName
            | ControlId::EditContent
            | ControlId::BanInput
            | ControlId::BanList
            | ControlId::AuditFilter
            | ControlId::AuditList
            | ControlId::ImportPath => {}
        }
    }

    // ----- selection -----

    pub fn select_row(&mut self, index: usize) {
        let Some(jail) = self.jails.get(index) else {
            return;
        };
        let name = jail.name.clone();
        self.selection.select(&name);
        self.focus = Some(ControlId::JailTable);
        self.reveal(index);
    }

    fn move_selection(&mut self, down: bool) {
        if self.jails.is_empty() {
            return;
        }
        let last = self.jails.len() - 1;
        let index = match self.selected_index() {
            Some(i) if down => (i + 1).min(last),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.select_row(index);
    }

    pub fn selected_index(&self) -> Option<usize> {
        let name = self.selection.name()?;
        self.jails.iter().position(|j| j.name == name)
    }

    fn reveal(&mut self, index: usize) {
        if index < self.table_offset {
            self.table_offset = index;
        } else if self.table_rows != usize::MAX && index >= self.table_offset + self.table_rows {
            self.table_offset = index + 1 - self.table_rows;
        }
    }

    // ----- toolbar actions -----

    pub fn open_new(&mut self) {
        if !self.modals.is_empty() {
            return;
        }
        let mut draft = FormDraft::new_jail();
        draft.content.set(&self.tr("default.jailContent"));
        self.editor = Some(EditDialog::new(draft, &self.jails));
        self.open_dialog(DialogKind::Edit);
    }

    /// Read the selected jail; the editor opens once the content arrives.
    pub fn edit_selected(&mut self) {
        if !self.modals.is_empty() {
            return;
        }
        match self.selection.name() {
            Some(name) => {
                let jail = name.to_string();
                self.gateway.issue(
                    Request::Read { jail: jail.clone() },
                    Pending::Read { jail },
                );
            }
            None => self.show_message(self.tr("msg.selectFirst")),
        }
    }

    pub fn delete_selected(&mut self) {
        if !self.modals.is_empty() {
            return;
        }
        match self.selection.name() {
            Some(name) => {
                let jail = name.to_string();
                let text = t(self.language, "msg.deleteConfirm", &[("jail", &jail)]);
                self.show_confirm(ConfirmIntent::DeleteJail(jail), text);
            }
            None => self.show_message(self.tr("msg.selectFirst")),
        }
    }

    pub fn reload(&mut self) {
        if !self.modals.is_empty() {
            return;
        }
        self.gateway.issue(Request::Reload, Pending::Reload);
    }

    pub fn open_audit(&mut self) {
        if !self.modals.is_empty() {
            return;
        }
        self.audit = Some(AuditView::new());
        self.open_dialog(DialogKind::Audit);
        self.audit_refresh();
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        log::info!("Language set to {}", language.tag());
        if let Err(e) = self.preferences.set(LANG_KEY, language.tag()) {
            log::warn!("Could not store language preference: {}", e);
        }
    }

    pub fn set_theme(&mut self, mode: ThemeMode) {
        self.theme_mode = mode;
        log::info!("Theme set to {}", mode.tag());
        if let Err(e) = self.preferences.set(THEME_KEY, mode.tag()) {
            log::warn!("Could not store theme preference: {}", e);
        }
    }

    // ----- edit dialog -----

    /// Issue `write` if the draft is valid. Invalid drafts never reach the
    /// network; the inline error is already showing.
    pub fn save(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        editor.revalidate(&self.jails);
        if !editor.can_save() {
            return;
        }
        let jail = editor.draft.target_name();
        let content = editor.draft.content.value().to_string();
        log::info!("Saving jail {}", jail);
        self.gateway
            .issue(Request::Write { jail, content }, Pending::Write);
    }

    // ----- ban list dialog -----

    fn open_selected_ban_list(&mut self) {
        match self.selected_index() {
            Some(index) => self.open_ban_list(index),
            None => self.show_message(self.tr("msg.selectFirst")),
        }
    }

    pub fn open_ban_list(&mut self, index: usize) {
        if !self.modals.is_empty() {
            return;
        }
        let Some(jail) = self.jails.get(index) else {
            return;
        };
        self.ban_list = Some(BanListView::new(&jail.name, jail.ban_ips.clone()));
        self.open_dialog(DialogKind::BanList);
    }

    /// Ban what was typed. One address is a plain `ban`; several take the
    /// bulk path.
    pub fn add_ban(&mut self) {
        let Some(view) = self.ban_list.as_mut() else {
            return;
        };
        if view.is_disabled(&ControlId::BanAdd) {
            return;
        }
        let jail = view.jail().to_string();
        let addresses = unique(split_addresses(view.input.value()));
        match addresses.as_slice() {
            [] => {}
            [ip] => {
                let ip = ip.clone();
                self.gateway.issue(
                    Request::Ban {
                        jail: jail.clone(),
                        ip: ip.clone(),
                    },
                    Pending::Ban { jail, ip },
                );
            }
            _ => {
                view.input.clear();
                self.submit_bulk(jail, addresses);
            }
        }
    }

    pub fn unban_highlighted(&mut self) {
        let Some(view) = self.ban_list.as_ref() else {
            return;
        };
        let Some(ip) = view.highlighted_ip() else {
            return;
        };
        let jail = view.jail().to_string();
        let ip = ip.to_string();
        self.gateway.issue(
            Request::Unban {
                jail: jail.clone(),
                ip: ip.clone(),
            },
            Pending::Unban { jail, ip },
        );
    }

    /// One `bulkban` carrying the de-duplicated set. Export, import and add
    /// stay disabled until it settles.
    fn submit_bulk(&mut self, jail: String, addresses: Vec<String>) {
        let addresses = unique(addresses);
        if addresses.is_empty() {
            self.show_message(self.tr("msg.importFail"));
            return;
        }
        let Some(view) = self.ban_list_for(&jail) else {
            return;
        };
        view.begin_bulk();
        self.gateway.issue(
            Request::BulkBan {
                jail: jail.clone(),
                ips: addresses.clone(),
            },
            Pending::BulkBan {
                jail,
                unique: addresses,
            },
        );
    }

    fn export_ban_list(&mut self) {
        let Some(view) = self.ban_list.as_ref() else {
            return;
        };
        let text =
            match exports::export_ban_list(&self.config.export_dir, view.jail(), view.entries()) {
                Ok(path) => t(
                    self.language,
                    "msg.exportSuccess",
                    &[("path", &path.display().to_string())],
                ),
                Err(e) => {
                    log::error!("Ban list export failed: {}", e);
                    format!("{}: {}", self.tr("msg.exportFail"), e)
                }
            };
        self.show_message(text);
    }

    fn open_import(&mut self) {
        let Some(view) = self.ban_list.as_ref() else {
            return;
        };
        self.import = Some(ImportPrompt::new(view.jail()));
        self.open_dialog(DialogKind::Import);
    }

    fn submit_import(&mut self) {
        let Some(prompt) = self.import.as_ref() else {
            return;
        };
        let Some(path) = prompt.resolved_path() else {
            return;
        };
        let jail = prompt.jail.clone();
        match exports::read_import(&path) {
            Ok(addresses) => {
                log::info!("Read {} addresses from {}", addresses.len(), path.display());
                self.close_dialog(DialogKind::Import);
                self.submit_bulk(jail, addresses);
            }
            Err(e) => {
                log::warn!("Import of {} failed: {}", path.display(), e);
                let text = format!("{}: {}", self.tr("msg.importFail"), e);
                self.show_message(text);
            }
        }
    }

    fn request_clear(&mut self) {
        let Some(view) = self.ban_list.as_ref() else {
            return;
        };
        let jail = view.jail().to_string();
        let text = t(self.language, "msg.clearConfirm", &[("jail", &jail)]);
        self.show_confirm(ConfirmIntent::ClearBans(jail), text);
    }

    // ----- audit dialog -----

    fn audit_refresh(&mut self) {
        let Some(view) = self.audit.as_ref() else {
            return;
        };
        let request = Request::Audit {
            filter: view.query(),
            limit: self.config.audit_limit,
        };
        self.gateway.issue(request, Pending::Audit { export: false });
    }

    fn audit_export(&mut self) {
        let Some(view) = self.audit.as_ref() else {
            return;
        };
        let request = Request::Audit {
            filter: view.query(),
            limit: self.config.audit_export_limit,
        };
        self.gateway.issue(request, Pending::Audit { export: true });
    }

    fn request_audit_clear(&mut self) {
        if self.audit.is_none() {
            return;
        }
        let text = self.tr("msg.auditClearConfirm");
        self.show_confirm(ConfirmIntent::ClearAudit, text);
    }

    // ----- confirmation -----

    /// Close the confirmation and, only on yes, issue its request.
    fn answer_confirm(&mut self, yes: bool) {
        let intent = self.confirm.as_ref().map(|c| c.intent.clone());
        self.close_dialog(DialogKind::Confirm);
        if !yes {
            log::debug!("Confirmation declined: {:?}", intent);
            return;
        }
        match intent {
            Some(ConfirmIntent::DeleteJail(jail)) => {
                log::info!("Deleting jail {}", jail);
                self.gateway
                    .issue(Request::Delete { jail }, Pending::Delete);
            }
            Some(ConfirmIntent::ClearBans(jail)) => {
                let Some(view) = self.ban_list_for(&jail) else {
                    return;
                };
                view.begin_clear();
                self.gateway
                    .issue(Request::Clear { jail: jail.clone() }, Pending::Clear { jail });
            }
            Some(ConfirmIntent::ClearAudit) => {
                self.gateway.issue(Request::AuditClear, Pending::AuditClear);
            }
            None => {}
        }
    }
}
