//! Hover and selection bookkeeping shared by every gallery. Both are
//! edge-triggered: feeding the same target twice produces no transitions,
//! so per-frame pointer polling never restarts animations.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorIcon {
    #[default]
    Default,
    Pointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverKind {
    Begin,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTransition {
    pub entity: usize,
    pub kind: HoverKind,
}

#[derive(Debug, Default)]
pub struct HoverState {
    current: Option<usize>,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Feed the entity under the pointer this frame. Returns at most one
    /// `End` followed by at most one `Begin`, plus the cursor to show.
    pub fn pointer_target(&mut self, target: Option<usize>) -> (Vec<HoverTransition>, CursorIcon) {
        let cursor = if target.is_some() {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        };
        if target == self.current {
            return (Vec::new(), cursor);
        }
        let mut transitions = Vec::with_capacity(2);
        if let Some(previous) = self.current.take() {
            transitions.push(HoverTransition {
                entity: previous,
                kind: HoverKind::End,
            });
        }
        if let Some(next) = target {
            transitions.push(HoverTransition {
                entity: next,
                kind: HoverKind::Begin,
            });
        }
        self.current = target;
        (transitions, cursor)
    }

    /// Drop hover without emitting an `End`; used on teardown when the
    /// entity is about to be released anyway.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub previous: Option<usize>,
    pub current: Option<usize>,
}

#[derive(Debug, Default)]
pub struct Selection {
    current: Option<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Re-selecting the active entity is a no-op.
    pub fn select(&mut self, target: Option<usize>) -> Option<SelectionChange> {
        if target == self.current {
            return None;
        }
        let previous = self.current;
        self.current = target;
        Some(SelectionChange {
            previous,
            current: target,
        })
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_hover_on_same_entity_is_silent() {
        let mut hover = HoverState::new();
        let (first, cursor) = hover.pointer_target(Some(3));
        assert_eq!(
            first,
            vec![HoverTransition {
                entity: 3,
                kind: HoverKind::Begin,
            }]
        );
        assert_eq!(cursor, CursorIcon::Pointer);
        let (second, cursor) = hover.pointer_target(Some(3));
        assert!(second.is_empty());
        assert_eq!(cursor, CursorIcon::Pointer);
    }

    #[test]
    fn moving_between_entities_ends_then_begins() {
        let mut hover = HoverState::new();
        hover.pointer_target(Some(1));
        let (transitions, _) = hover.pointer_target(Some(2));
        assert_eq!(
            transitions,
            vec![
                HoverTransition {
                    entity: 1,
                    kind: HoverKind::End,
                },
                HoverTransition {
                    entity: 2,
                    kind: HoverKind::Begin,
                },
            ]
        );
    }

    #[test]
    fn leaving_all_entities_restores_default_cursor() {
        let mut hover = HoverState::new();
        hover.pointer_target(Some(1));
        let (transitions, cursor) = hover.pointer_target(None);
        assert_eq!(
            transitions,
            vec![HoverTransition {
                entity: 1,
                kind: HoverKind::End,
            }]
        );
        assert_eq!(cursor, CursorIcon::Default);
        assert_eq!(hover.current(), None);
    }

    #[test]
    fn reselecting_the_active_entity_changes_nothing() {
        let mut selection = Selection::new();
        let change = selection.select(Some(4)).expect("change");
        assert_eq!(change.previous, None);
        assert_eq!(change.current, Some(4));
        assert!(selection.select(Some(4)).is_none());
        let change = selection.select(Some(5)).expect("change");
        assert_eq!(change.previous, Some(4));
    }
}
