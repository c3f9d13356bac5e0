//! Stacked dialogs with focus containment.
//!
//! Frames are kept bottom to top. Every `open` takes a fresh order from a
//! monotonic counter, so the top frame's order is strictly greater than any
//! other open frame's, including after frames below it are closed. Only the
//! top frame takes Escape, Tab and backdrop clicks.

use crate::state::controls::ControlId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Edit,
    BanList,
    Audit,
    Import,
    Confirm,
    Message,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalFrame {
    pub kind: DialogKind,
    pub stack_order: u64,
    /// Control focused right before this frame opened.
    pub previously_focused: Option<ControlId>,
    pub focusable: Vec<ControlId>,
}

/// Keys the top frame intercepts while it is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapKey {
    Escape,
    Tab,
    BackTab,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intercept {
    Close(DialogKind),
    Focus(ControlId),
    /// The frame has nothing focusable; the key is swallowed.
    Swallow,
    /// No frame is open.
    Pass,
}

#[derive(Debug, Default)]
pub struct ModalStack {
    frames: Vec<ModalFrame>,
    counter: u64,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push (or raise) a frame and return the control that should take focus.
    ///
    /// Raising a frame that is already open keeps the restore target it
    /// captured when it first opened.
    pub fn open(
        &mut self,
        kind: DialogKind,
        focusable: Vec<ControlId>,
        current_focus: Option<ControlId>,
    ) -> Option<ControlId> {
        let previously_focused = match self.frames.iter().position(|f| f.kind == kind) {
            Some(index) => self.frames.remove(index).previously_focused,
            None => current_focus,
        };
        self.counter += 1;
        let first = focusable.first().cloned();
        log::debug!("Opening {:?} at stack order {}", kind, self.counter);
        self.frames.push(ModalFrame {
            kind,
            stack_order: self.counter,
            previously_focused,
            focusable,
        });
        first
    }

    /// Remove a frame wherever it sits in the stack.
    pub fn close(&mut self, kind: DialogKind) -> Option<ModalFrame> {
        let index = self.frames.iter().position(|f| f.kind == kind)?;
        let frame = self.frames.remove(index);
        log::debug!(
            "Closed {:?} (order {}), depth now {}",
            kind,
            frame.stack_order,
            self.frames.len()
        );
        Some(frame)
    }

    pub fn intercept(&self, key: TrapKey, focused: Option<&ControlId>) -> Intercept {
        let Some(top) = self.frames.last() else {
            return Intercept::Pass;
        };
        match key {
            TrapKey::Escape => Intercept::Close(top.kind),
            TrapKey::Tab | TrapKey::BackTab => {
                match cycle(&top.focusable, focused, key == TrapKey::BackTab) {
                    Some(next) => Intercept::Focus(next),
                    None => Intercept::Swallow,
                }
            }
        }
    }

    /// Replace the focusable set of an open frame.
    pub fn set_focusable(&mut self, kind: DialogKind, focusable: Vec<ControlId>) {
        if let Some(frame) = self.frames.iter_mut().find(|f| f.kind == kind) {
            frame.focusable = focusable;
        }
    }

    pub fn top(&self) -> Option<&ModalFrame> {
        self.frames.last()
    }

    pub fn top_kind(&self) -> Option<DialogKind> {
        self.frames.last().map(|f| f.kind)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames from bottom to top, the order they are drawn in.
    pub fn frames(&self) -> impl Iterator<Item = &ModalFrame> {
        self.frames.iter()
    }
}

fn cycle(set: &[ControlId], focused: Option<&ControlId>, backwards: bool) -> Option<ControlId> {
    if set.is_empty() {
        return None;
    }
    let last = set.len() - 1;
    let index = match focused.and_then(|f| set.iter().position(|c| c == f)) {
        Some(i) if backwards => {
            if i == 0 {
                last
            } else {
                i - 1
            }
        }
        Some(i) => {
            if i == last {
                0
            } else {
                i + 1
            }
        }
        None if backwards => last,
        None => 0,
    };
    Some(set[index].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::controls::ToolbarButton;

    fn message_controls() -> Vec<ControlId> {
        vec![ControlId::MessageClose]
    }

    #[test]
    fn orders_strictly_increase_and_top_wins() {
        let mut stack = ModalStack::new();
        stack.open(DialogKind::BanList, vec![ControlId::BanInput], None);
        stack.open(DialogKind::Message, message_controls(), Some(ControlId::BanInput));
        let orders: Vec<u64> = stack.frames().map(|f| f.stack_order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert_eq!(stack.top_kind(), Some(DialogKind::Message));
        assert_eq!(
            stack.intercept(TrapKey::Escape, None),
            Intercept::Close(DialogKind::Message)
        );
    }

    #[test]
    fn closing_a_lower_frame_keeps_invariant() {
        let mut stack = ModalStack::new();
        stack.open(DialogKind::Audit, vec![ControlId::AuditFilter], None);
        stack.open(DialogKind::BanList, vec![ControlId::BanInput], None);
        stack.open(DialogKind::Message, message_controls(), None);

        assert!(stack.close(DialogKind::BanList).is_some());
        assert_eq!(stack.depth(), 2);
        let top = stack.top().unwrap().stack_order;
        assert!(stack.frames().filter(|f| f.kind != DialogKind::Message).all(|f| f.stack_order < top));

        // A later open still lands on top.
        stack.open(DialogKind::Confirm, vec![ControlId::ConfirmYes], None);
        let top = stack.top().unwrap().stack_order;
        assert!(stack.frames().take(stack.depth() - 1).all(|f| f.stack_order < top));
    }

    #[test]
    fn reopening_raises_and_keeps_restore_target() {
        let mut stack = ModalStack::new();
        let before = ControlId::Toolbar(ToolbarButton::Audit);
        stack.open(DialogKind::Message, message_controls(), Some(before.clone()));
        stack.open(DialogKind::BanList, vec![ControlId::BanInput], None);
        stack.open(DialogKind::Message, message_controls(), Some(ControlId::BanInput));

        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top_kind(), Some(DialogKind::Message));
        assert_eq!(stack.top().unwrap().previously_focused, Some(before));
        assert_eq!(stack.top().unwrap().stack_order, 3);
    }

    #[test]
    fn tab_wraps_within_top_frame_only() {
        let mut stack = ModalStack::new();
        let set = vec![ControlId::EditName, ControlId::EditContent, ControlId::EditCancel];
        stack.open(DialogKind::Edit, set, None);

        assert_eq!(
            stack.intercept(TrapKey::Tab, Some(&ControlId::EditCancel)),
            Intercept::Focus(ControlId::EditName)
        );
        assert_eq!(
            stack.intercept(TrapKey::BackTab, Some(&ControlId::EditName)),
            Intercept::Focus(ControlId::EditCancel)
        );
        assert_eq!(
            stack.intercept(TrapKey::Tab, Some(&ControlId::EditName)),
            Intercept::Focus(ControlId::EditContent)
        );
        // Focus somewhere in the background is pulled back into the frame.
        let outside = ControlId::Toolbar(ToolbarButton::Refresh);
        assert_eq!(
            stack.intercept(TrapKey::Tab, Some(&outside)),
            Intercept::Focus(ControlId::EditName)
        );
        assert_eq!(
            stack.intercept(TrapKey::BackTab, Some(&outside)),
            Intercept::Focus(ControlId::EditCancel)
        );
    }

    #[test]
    fn empty_frame_swallows_tab_and_empty_stack_passes() {
        let mut stack = ModalStack::new();
        assert_eq!(stack.intercept(TrapKey::Tab, None), Intercept::Pass);
        assert_eq!(stack.open(DialogKind::Message, Vec::new(), None), None);
        assert_eq!(stack.intercept(TrapKey::Tab, None), Intercept::Swallow);
    }
}
