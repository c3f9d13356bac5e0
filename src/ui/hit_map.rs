//! Screen regions recorded while drawing, used to route mouse clicks.

use ratatui::layout::Rect;

use crate::state::controls::ControlId;
use crate::ui::modal_stack::DialogKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    Control(ControlId),
    JailRow(usize),
    /// The banned-list cell of a jail row.
    JailBans(usize),
    BanRow(usize),
    /// The unban action at the end of a ban-list row.
    UnbanRow(usize),
    AuditRow(usize),
    /// Inside a dialog panel, not on any control.
    Panel(DialogKind),
    /// On a dialog's overlay, outside its panel.
    Backdrop(DialogKind),
}

/// Regions in draw order. Later regions sit on top of earlier ones.
#[derive(Debug, Default)]
pub struct HitMap {
    regions: Vec<(Rect, Hit)>,
}

impl HitMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn push(&mut self, area: Rect, hit: Hit) {
        if area.width > 0 && area.height > 0 {
            self.regions.push((area, hit));
        }
    }

    /// Topmost region containing the cell.
    pub fn hit_at(&self, column: u16, row: u16) -> Option<&Hit> {
        self.regions
            .iter()
            .rev()
            .find(|(area, _)| contains(*area, column, row))
            .map(|(_, hit)| hit)
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topmost_region_wins() {
        let mut map = HitMap::new();
        let screen = Rect::new(0, 0, 80, 24);
        let panel = Rect::new(20, 6, 40, 12);
        map.push(screen, Hit::JailRow(0));
        map.push(screen, Hit::Backdrop(DialogKind::Message));
        map.push(panel, Hit::Panel(DialogKind::Message));
        map.push(Rect::new(35, 14, 10, 3), Hit::Control(ControlId::MessageClose));

        assert_eq!(map.hit_at(1, 1), Some(&Hit::Backdrop(DialogKind::Message)));
        assert_eq!(map.hit_at(21, 7), Some(&Hit::Panel(DialogKind::Message)));
        assert_eq!(
            map.hit_at(36, 15),
            Some(&Hit::Control(ControlId::MessageClose))
        );
        assert_eq!(map.hit_at(80, 0), None);
    }

    #[test]
    fn empty_regions_are_ignored() {
        let mut map = HitMap::new();
        map.push(Rect::new(0, 0, 0, 5), Hit::AuditRow(0));
        assert_eq!(map.hit_at(0, 0), None);
    }
}
