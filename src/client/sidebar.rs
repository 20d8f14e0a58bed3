// Chat sidebar visibility state machine

/// Layout breakpoint signal (narrow screens are `Mobile`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Desktop,
    Mobile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarState {
    Closed,
    Open,
    Expanded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarEvent {
    OpenRequested,
    CloseRequested,
    OverlayClicked,
    EscapePressed,
    ExpandToggled,
    LayoutChanged(Layout),
}

/// Sidebar state keyed off the current layout.
///
/// On desktop the chat column is always shown, so the sidebar only opens on
/// mobile; any breakpoint change closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sidebar {
    state: SidebarState,
    layout: Layout,
}

impl Sidebar {
    pub fn new(layout: Layout) -> Self {
        Self {
            state: SidebarState::Closed,
            layout,
        }
    }

    pub fn state(&self) -> SidebarState {
        self.state
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Overlay shown behind an open sidebar
    pub fn overlay_visible(&self) -> bool {
        self.state != SidebarState::Closed
    }

    /// Panel is hidden from focus/interaction (closed on mobile only).
    pub fn is_inert(&self) -> bool {
        self.layout == Layout::Mobile && self.state == SidebarState::Closed
    }

    /// Apply an event and return the new state.
    pub fn handle(&mut self, event: SidebarEvent) -> SidebarState {
        use SidebarEvent::*;
        use SidebarState::*;

        let next = match (self.state, event) {
            (_, LayoutChanged(layout)) => {
                self.layout = layout;
                Closed
            }
            (Closed, OpenRequested) if self.layout == Layout::Mobile => Open,
            (Open, ExpandToggled) => Expanded,
            (Expanded, ExpandToggled) => Open,
            (Open | Expanded, CloseRequested | OverlayClicked | EscapePressed) => Closed,
            (state, _) => state,
        };
        self.state = next;
        next
    }
}
