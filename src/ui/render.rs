//! Drawing. Every frame is rebuilt from the controller's state, and the
//! hit map is refilled as controls are drawn so clicks land on what is
//! actually on screen.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::controller::Controller;
use crate::i18n::t;
use crate::state::controls::{ControlId, ToolbarButton};
use crate::ui::hit_map::{Hit, HitMap};
use crate::ui::modal_stack::DialogKind;
use crate::ui::text_input::TextInput;
use crate::ui::theme::{system_prefers_dark, ThemeColors};

const HEADER_HEIGHT: u16 = 3;
const TOOLBAR_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 2;
const NOTICE_SECS: u64 = 8;

/// Jail rows that fit on a terminal `height` cells tall.
pub fn table_rows(height: u16) -> usize {
    // Table borders plus its header row.
    height.saturating_sub(HEADER_HEIGHT + TOOLBAR_HEIGHT + FOOTER_HEIGHT + 3) as usize
}

pub fn draw(frame: &mut Frame, c: &Controller, hits: &mut HitMap) {
    hits.clear();
    let colors = ThemeColors::for_theme(c.theme_mode().resolve(system_prefers_dark()));
    let area = frame.size();
    frame.render_widget(Block::default().style(colors.base()), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(TOOLBAR_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);

    render_header(frame, c, &colors, hits, chunks[0]);
    render_toolbar(frame, c, &colors, hits, chunks[1]);
    render_jail_table(frame, c, &colors, hits, chunks[2]);
    render_footer(frame, c, &colors, chunks[3]);

    // Bottom to top, so the top dialog is drawn (and hit-tested) last.
    for modal in c.modals().frames() {
        hits.push(area, Hit::Backdrop(modal.kind));
        match modal.kind {
            DialogKind::Edit => render_edit(frame, c, &colors, hits, area),
            DialogKind::BanList => render_ban_list(frame, c, &colors, hits, area),
            DialogKind::Audit => render_audit(frame, c, &colors, hits, area),
            DialogKind::Import => render_import(frame, c, &colors, hits, area),
            DialogKind::Confirm => render_confirm(frame, c, &colors, hits, area),
            DialogKind::Message => render_message(frame, c, &colors, hits, area),
        }
    }
}

fn render_header(frame: &mut Frame, c: &Controller, colors: &ThemeColors, hits: &mut HitMap, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(18), Constraint::Length(22)])
        .split(area);

    let title = Paragraph::new(c.tr("title.page"))
        .style(colors.base().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).border_style(colors.border(false)));
    frame.render_widget(title, chunks[0]);

    let lang_label = c.tr(&format!("lang.{}", c.language().tag()));
    selector(frame, c, colors, hits, chunks[1], c.tr("aria.langSelect"), lang_label, ControlId::LanguageSelect);
    let theme_label = c.tr(c.theme_mode().label_key());
    selector(frame, c, colors, hits, chunks[2], c.tr("aria.themeSelect"), theme_label, ControlId::ThemeSelect);
}

#[allow(clippy::too_many_arguments)]
fn selector(
    frame: &mut Frame,
    c: &Controller,
    colors: &ThemeColors,
    hits: &mut HitMap,
    area: Rect,
    title: String,
    value: String,
    id: ControlId,
) {
    let focused = c.focus() == Some(&id);
    let style = if focused { colors.selected() } else { colors.base() };
    let widget = Paragraph::new(format!("{} ▾", value))
        .style(style)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(colors.border(focused)),
        );
    frame.render_widget(widget, area);
    hits.push(area, Hit::Control(id));
}

fn render_toolbar(frame: &mut Frame, c: &Controller, colors: &ThemeColors, hits: &mut HitMap, area: Rect) {
    let buttons: Vec<(String, ControlId)> = ToolbarButton::all()
        .iter()
        .map(|b| (c.tr(b.label_key()), ControlId::Toolbar(*b)))
        .collect();
    button_row(frame, c, colors, hits, area, &buttons);
}

fn render_jail_table(frame: &mut Frame, c: &Controller, colors: &ThemeColors, hits: &mut HitMap, area: Rect) {
    let focused = c.focus() == Some(&ControlId::JailTable);
    let widths = [
        Constraint::Percentage(25),
        Constraint::Percentage(15),
        Constraint::Percentage(15),
        Constraint::Percentage(45),
    ];
    let visible = area.height.saturating_sub(3) as usize;
    let offset = c.table_offset().min(c.jails().len().saturating_sub(1));
    let selected = c.selected_index();

    let header = Row::new(vec![
        Cell::from(c.tr("col.name")),
        Cell::from(c.tr("col.state")),
        Cell::from(c.tr("col.count")),
        Cell::from(c.tr("col.list")),
    ])
    .style(Style::default().fg(colors.fg).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = c
        .jails()
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, jail)| {
            let (state, state_color) = if jail.enabled {
                (c.tr("state.enabled"), colors.success)
            } else {
                (c.tr("state.disabled"), colors.muted)
            };
            let list = if jail.ban_ips.is_empty() {
                c.tr("none")
            } else {
                jail.ban_ips.join(", ")
            };
            let row = Row::new(vec![
                Cell::from(jail.name.clone()),
                Cell::from(state).style(Style::default().fg(state_color)),
                Cell::from(jail.cur_ban.to_string()),
                Cell::from(list).style(Style::default().fg(colors.warning)),
            ]);
            if selected == Some(index) {
                row.style(colors.selected())
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(0)
        .style(colors.base())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", c.tr("title.page")))
                .border_style(colors.border(focused)),
        );
    frame.render_widget(table, area);

    let inner = area.inner(&Margin {
        horizontal: 1,
        vertical: 1,
    });
    let shown = c.jails().len().saturating_sub(offset).min(visible);
    for k in 0..shown {
        let row_area = Rect::new(inner.x, inner.y + 1 + k as u16, inner.width, 1);
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);
        hits.push(row_area, Hit::JailRow(offset + k));
        hits.push(cells[3], Hit::JailBans(offset + k));
    }
}

fn render_footer(frame: &mut Frame, c: &Controller, colors: &ThemeColors, area: Rect) {
    let status = if c.in_flight() > 0 {
        let count = c.in_flight().to_string();
        t(c.language(), "status.pending", &[("count", &count)])
    } else {
        c.notice(std::time::Duration::from_secs(NOTICE_SECS))
            .map(str::to_string)
            .unwrap_or_else(|| c.tr("status.ready"))
    };
    let hint = if c.modals().is_empty() {
        c.tr("hint.main")
    } else {
        c.tr("hint.dialog")
    };
    let lines = vec![
        Line::from(Span::styled(status, Style::default().fg(colors.success))),
        Line::from(Span::styled(hint, Style::default().fg(colors.muted))),
    ];
    frame.render_widget(Paragraph::new(lines).style(colors.base()), area);
}

// ----- dialogs -----

/// Clear the panel area, draw its frame and return the inner area.
fn open_panel(
    frame: &mut Frame,
    colors: &ThemeColors,
    hits: &mut HitMap,
    panel: Rect,
    kind: DialogKind,
    title: String,
) -> Rect {
    frame.render_widget(Clear, panel);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .border_style(colors.border(true))
        .style(colors.base());
    let inner = block.inner(panel);
    frame.render_widget(block, panel);
    hits.push(panel, Hit::Panel(kind));
    inner
}

fn render_edit(frame: &mut Frame, c: &Controller, colors: &ThemeColors, hits: &mut HitMap, area: Rect) {
    let Some(editor) = c.editor() else {
        return;
    };
    let panel = centered_rect(70, 80, area);
    let inner = open_panel(frame, colors, hits, panel, DialogKind::Edit, c.tr("modal.editTitle"));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(inner);

    let mut name_title = c.tr("label.jailName");
    if !editor.draft.name_editable() {
        name_title.push_str(&c.tr("label.readonly"));
    }
    text_input(frame, c, colors, hits, chunks[0], name_title, &editor.draft.name, String::new(), ControlId::EditName);
    text_input(
        frame,
        c,
        colors,
        hits,
        chunks[1],
        c.tr("label.jailContent"),
        &editor.draft.content,
        c.tr("placeholder.jailContent"),
        ControlId::EditContent,
    );

    if let Some(error) = editor.error() {
        let line = Paragraph::new(error.message(c.language())).style(Style::default().fg(colors.error));
        frame.render_widget(line, chunks[2]);
    }

    let buttons = [
        (c.tr("modal.save"), ControlId::EditSave),
        (c.tr("modal.cancel"), ControlId::EditCancel),
    ];
    button_row(frame, c, colors, hits, chunks[3], &buttons);
}

fn render_ban_list(frame: &mut Frame, c: &Controller, colors: &ThemeColors, hits: &mut HitMap, area: Rect) {
    let Some(view) = c.ban_list() else {
        return;
    };
    let panel = centered_rect(60, 70, area);
    let title = format!("{} - {}", view.jail(), c.tr("col.list"));
    let inner = open_panel(frame, colors, hits, panel, DialogKind::BanList, title);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(3)])
        .split(inner);

    let add_label = c.tr("btn.add");
    let input_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(add_label.width() as u16 + 4)])
        .split(chunks[0]);
    text_input(
        frame,
        c,
        colors,
        hits,
        input_row[0],
        String::new(),
        &view.input,
        c.tr("placeholder.banInput"),
        ControlId::BanInput,
    );
    button(frame, c, colors, hits, input_row[1], &add_label, ControlId::BanAdd);

    let focused = c.focus() == Some(&ControlId::BanList);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(colors.border(focused));
    let list_area = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);
    hits.push(list_area, Hit::Control(ControlId::BanList));

    if view.entries().is_empty() {
        frame.render_widget(
            Paragraph::new(c.tr("none")).style(Style::default().fg(colors.muted)),
            list_area,
        );
    } else {
        let unban_label = format!("[{}]", c.tr("btn.delete"));
        let label_width = unban_label.width() as u16;
        let height = list_area.height as usize;
        let highlighted = view.highlighted().unwrap_or(0);
        let start = (highlighted + 1).saturating_sub(height);

        let items: Vec<ListItem> = view
            .entries()
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(index, ip)| {
                let pad = (list_area.width.saturating_sub(label_width) as usize).saturating_sub(ip.width());
                let line = Line::from(vec![
                    Span::raw(format!("{}{}", ip, " ".repeat(pad))),
                    Span::styled(unban_label.clone(), Style::default().fg(colors.error)),
                ]);
                let item = ListItem::new(line);
                if index == highlighted {
                    item.style(colors.selected())
                } else {
                    item
                }
            })
            .collect();
        frame.render_widget(List::new(items).style(colors.base()), list_area);

        let shown = view.entries().len().saturating_sub(start).min(height);
        for k in 0..shown {
            let row = Rect::new(list_area.x, list_area.y + k as u16, list_area.width, 1);
            hits.push(row, Hit::BanRow(start + k));
            let label_x = row.x + row.width.saturating_sub(label_width);
            hits.push(Rect::new(label_x, row.y, label_width.min(row.width), 1), Hit::UnbanRow(start + k));
        }
    }

    let buttons = [
        (c.tr("btn.export"), ControlId::BanExport),
        (c.tr("btn.import"), ControlId::BanImport),
        (c.tr("btn.clear"), ControlId::BanClear),
        (c.tr("btn.close"), ControlId::BanClose),
    ];
    button_row(frame, c, colors, hits, chunks[2], &buttons);
}

fn render_audit(frame: &mut Frame, c: &Controller, colors: &ThemeColors, hits: &mut HitMap, area: Rect) {
    let Some(view) = c.audit() else {
        return;
    };
    let panel = centered_rect(80, 80, area);
    let inner = open_panel(frame, colors, hits, panel, DialogKind::Audit, c.tr("modal.auditTitle"));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(3)])
        .split(inner);

    let refresh_label = c.tr("btn.refresh");
    let filter_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(refresh_label.width() as u16 + 4)])
        .split(chunks[0]);
    text_input(
        frame,
        c,
        colors,
        hits,
        filter_row[0],
        c.tr("label.auditFilter"),
        &view.filter,
        c.tr("placeholder.auditFilter"),
        ControlId::AuditFilter,
    );
    button(frame, c, colors, hits, filter_row[1], &refresh_label, ControlId::AuditRefresh);

    let focused = c.focus() == Some(&ControlId::AuditList);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(colors.border(focused));
    let list_area = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);
    hits.push(list_area, Hit::Control(ControlId::AuditList));

    if view.entries().is_empty() {
        frame.render_widget(
            Paragraph::new(c.tr("none")).style(Style::default().fg(colors.muted)),
            list_area,
        );
    } else {
        // Two lines per entry.
        let per_page = (list_area.height as usize / 2).max(1);
        let highlighted = view.highlighted().unwrap_or(0);
        let start = (highlighted + 1).saturating_sub(per_page);
        let items: Vec<ListItem> = view
            .entries()
            .iter()
            .enumerate()
            .skip(start)
            .take(per_page)
            .map(|(index, entry)| {
                let item = ListItem::new(vec![
                    Line::from(Span::styled(entry.headline(), Style::default().fg(colors.muted))),
                    Line::from(entry.detail()),
                ]);
                if index == highlighted {
                    item.style(colors.selected())
                } else {
                    item
                }
            })
            .collect();
        frame.render_widget(List::new(items).style(colors.base()), list_area);

        let shown = view.entries().len().saturating_sub(start).min(per_page);
        for k in 0..shown {
            let y = list_area.y + (k * 2) as u16;
            let height = 2.min(list_area.y + list_area.height - y);
            hits.push(Rect::new(list_area.x, y, list_area.width, height), Hit::AuditRow(start + k));
        }
    }

    let buttons = [
        (c.tr("btn.export"), ControlId::AuditExport),
        (c.tr("btn.clear"), ControlId::AuditClear),
        (c.tr("btn.close"), ControlId::AuditClose),
    ];
    button_row(frame, c, colors, hits, chunks[2], &buttons);
}

fn render_import(frame: &mut Frame, c: &Controller, colors: &ThemeColors, hits: &mut HitMap, area: Rect) {
    let Some(prompt) = c.import_prompt() else {
        return;
    };
    let panel = centered_rect(60, 30, area);
    let inner = open_panel(frame, colors, hits, panel, DialogKind::Import, c.tr("modal.importTitle"));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(inner);

    text_input(
        frame,
        c,
        colors,
        hits,
        chunks[0],
        c.tr("label.importPath"),
        &prompt.path,
        c.tr("placeholder.importPath"),
        ControlId::ImportPath,
    );
    let buttons = [
        (c.tr("btn.import"), ControlId::ImportSubmit),
        (c.tr("btn.cancel"), ControlId::ImportCancel),
    ];
    button_row(frame, c, colors, hits, chunks[2], &buttons);
}

fn render_confirm(frame: &mut Frame, c: &Controller, colors: &ThemeColors, hits: &mut HitMap, area: Rect) {
    let Some(view) = c.confirm() else {
        return;
    };
    let panel = centered_rect(50, 30, area);
    let inner = open_panel(frame, colors, hits, panel, DialogKind::Confirm, c.tr("modal.confirmTitle"));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(inner);

    let body = Paragraph::new(view.text.clone())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(colors.warning));
    frame.render_widget(body, chunks[0]);

    let buttons = [
        (c.tr("btn.cancel"), ControlId::ConfirmNo),
        (c.tr("btn.confirm"), ControlId::ConfirmYes),
    ];
    button_row(frame, c, colors, hits, chunks[1], &buttons);
}

fn render_message(frame: &mut Frame, c: &Controller, colors: &ThemeColors, hits: &mut HitMap, area: Rect) {
    let Some(text) = c.message() else {
        return;
    };
    let panel = centered_rect(50, 30, area);
    let inner = open_panel(frame, colors, hits, panel, DialogKind::Message, c.tr("modal.msg"));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(inner);

    let body = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(body, chunks[0]);
    button_row(frame, c, colors, hits, chunks[1], &[(c.tr("btn.close"), ControlId::MessageClose)]);
}

// ----- controls -----

fn button_row(
    frame: &mut Frame,
    c: &Controller,
    colors: &ThemeColors,
    hits: &mut HitMap,
    area: Rect,
    buttons: &[(String, ControlId)],
) {
    let mut constraints: Vec<Constraint> = buttons
        .iter()
        .map(|(label, _)| Constraint::Length(label.width() as u16 + 4))
        .collect();
    constraints.push(Constraint::Min(0));
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);
    for (cell, (label, id)) in cells.iter().zip(buttons) {
        button(frame, c, colors, hits, *cell, label, id.clone());
    }
}

fn button(
    frame: &mut Frame,
    c: &Controller,
    colors: &ThemeColors,
    hits: &mut HitMap,
    area: Rect,
    label: &str,
    id: ControlId,
) {
    let enabled = c.is_enabled(&id);
    let focused = c.focus() == Some(&id);
    let style = if !enabled {
        colors.disabled()
    } else if focused {
        colors.selected()
    } else {
        colors.base()
    };
    let widget = Paragraph::new(label.to_string())
        .alignment(Alignment::Center)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(colors.border(focused && enabled)),
        );
    frame.render_widget(widget, area);
    hits.push(area, Hit::Control(id));
}

#[allow(clippy::too_many_arguments)]
fn text_input(
    frame: &mut Frame,
    c: &Controller,
    colors: &ThemeColors,
    hits: &mut HitMap,
    area: Rect,
    title: String,
    input: &TextInput,
    placeholder: String,
    id: ControlId,
) {
    let focused = c.focus() == Some(&id);
    let enabled = c.is_enabled(&id);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(colors.border(focused));
    let inner = block.inner(area);

    let (line, _) = input.line_col();
    let column = input.display_column();
    let v_scroll = line.saturating_sub(inner.height.saturating_sub(1) as usize);
    let h_scroll = column.saturating_sub(inner.width.saturating_sub(1) as usize);

    let widget = if input.value().is_empty() && !focused {
        Paragraph::new(placeholder).style(Style::default().fg(colors.muted))
    } else {
        let style = if enabled { colors.base() } else { colors.disabled() };
        Paragraph::new(input.value().to_string())
            .style(style)
            .scroll((v_scroll as u16, h_scroll as u16))
    };
    frame.render_widget(widget.block(block), area);
    hits.push(area, Hit::Control(id));

    if focused && inner.width > 0 && inner.height > 0 {
        frame.set_cursor(
            inner.x + (column - h_scroll) as u16,
            inner.y + (line - v_scroll) as u16,
        );
    }
}

/// Helper function to create a centered rect using up a certain percentage
/// of the available rect `r`.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(50, 50, outer);
        assert!(inner.x >= outer.x && inner.right() <= outer.right());
        assert!(inner.y >= outer.y && inner.bottom() <= outer.bottom());
        assert_eq!(inner.width, 50);
    }

    #[test]
    fn table_rows_leave_room_for_chrome() {
        assert_eq!(table_rows(24), 13);
        assert_eq!(table_rows(5), 0);
    }
}
