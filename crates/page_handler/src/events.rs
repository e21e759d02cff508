use crate::window::{PrintCommandOutcome, WindowId};

/// Every native call a [`crate::MemoryHost`] receives, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Opened {
        window: WindowId,
        target: String,
        reused: bool,
    },
    OpenBlocked {
        target: String,
    },
    Focused(WindowId),
    PrintCommand {
        window: WindowId,
        outcome: PrintCommandOutcome,
    },
    WindowPrint(WindowId),
    Closed(WindowId),
    ListenerAdded(WindowId),
    AfterPrint {
        window: WindowId,
        listeners: usize,
    },
}

impl HostEvent {
    /// Window the event concerns, if any.
    pub const fn window(&self) -> Option<WindowId> {
        match self {
            Self::Opened { window, .. }
            | Self::PrintCommand { window, .. }
            | Self::AfterPrint { window, .. } => Some(*window),
            Self::Focused(window)
            | Self::WindowPrint(window)
            | Self::Closed(window)
            | Self::ListenerAdded(window) => Some(*window),
            Self::OpenBlocked { .. } => None,
        }
    }

    /// Whether this event is one of the two native print invocations.
    pub const fn is_print_invocation(&self) -> bool {
        matches!(self, Self::PrintCommand { .. } | Self::WindowPrint(_))
    }
}
