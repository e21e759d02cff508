use core::fmt;
use std::collections::HashSet;

use html::NodeId;
use page_handler::WindowId;

/// Where a print call renders its content.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Destination {
    NewWindow,
    CurrentWindow,
}

impl Destination {
    pub const fn from_flag(open_in_new_window: bool) -> Self {
        if open_in_new_window {
            Self::NewWindow
        } else {
            Self::CurrentWindow
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewWindow => out.write_str("new-window"),
            Self::CurrentWindow => out.write_str("current-window"),
        }
    }
}

/// Content to dispatch, either freshly built or handed in by the caller.
#[derive(Copy, Clone, Debug)]
pub(crate) struct PrintSource {
    pub node: NodeId,
    /// Already a surface container
    pub wrapped: bool,
    /// Built for this call only; dropped once cloned
    pub temporary: bool,
    /// Caller-owned element placed inside a temporary surface as is
    pub adopted: Option<NodeId>,
}

/// State of the one current-window print that may be in flight.
#[derive(Clone, Debug)]
pub(crate) struct CurrentWindowSession {
    pub window: WindowId,
    pub surface: NodeId,
    pub root: Option<NodeId>,
    pub prior_root_display: String,
}

/// Mutable printer state guarded by one lock.
#[derive(Debug, Default)]
pub(crate) struct PrinterState {
    pub current: Option<CurrentWindowSession>,
    /// Windows with a completion listener armed and not yet fired
    pub armed: HashSet<WindowId>,
}

impl PrinterState {
    /// Mark `window` as armed; false when it already was.
    pub fn arm(&mut self, window: WindowId) -> bool {
        self.armed.insert(window)
    }

    /// Consume the armed mark; false when the completion already ran.
    pub fn disarm(&mut self, window: WindowId) -> bool {
        self.armed.remove(&window)
    }
}
