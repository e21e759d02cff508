//! Window-level host primitives the print path needs.

use core::fmt;
use std::sync::{Arc, Mutex};

use html::Document;

/// Stable identity of a browser window or tab.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl WindowId {
    /// The window the application itself runs in.
    pub const MAIN: Self = Self(0);
}

impl fmt::Display for WindowId {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "window-{}", self.0)
    }
}

/// Result of the document-level `execCommand('print')`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PrintCommandOutcome {
    /// The command opened the print dialog.
    #[default]
    Accepted,
    /// The command exists but reported failure.
    Rejected,
    /// The host does not implement the command at all.
    Unsupported,
}

impl PrintCommandOutcome {
    pub const fn succeeded(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Documents are shared between the host and whoever is mutating them.
pub type SharedDocument = Arc<Mutex<Document>>;

/// Callback run when a window reports that its print dialog closed.
pub type AfterPrintListener = Box<dyn FnOnce() + Send + 'static>;

/// Host window/document primitives.
///
/// Listeners registered through [`PrintHost::add_after_print_listener`] are
/// one-shot: the host drops each listener after invoking it once.
pub trait PrintHost: Send + Sync {
    /// The window the application is rendered in.
    fn current_window(&self) -> WindowId;

    /// Document of an open window, `None` once the window is closed.
    fn document(&self, window: WindowId) -> Option<SharedDocument>;

    /// `window.open('', target)`. Opening a target name that is already open
    /// returns that window again. `None` means the host refused (pop-up
    /// blocking or similar).
    fn open_window(&self, target: &str) -> Option<WindowId>;

    fn focus(&self, window: WindowId);

    /// Document-level print command.
    fn exec_print_command(&self, window: WindowId) -> PrintCommandOutcome;

    /// Window-level `print()`.
    fn print(&self, window: WindowId);

    fn close(&self, window: WindowId);

    fn add_after_print_listener(&self, window: WindowId, listener: AfterPrintListener);
}

impl<T: PrintHost + ?Sized> PrintHost for Arc<T> {
    fn current_window(&self) -> WindowId {
        (**self).current_window()
    }

    fn document(&self, window: WindowId) -> Option<SharedDocument> {
        (**self).document(window)
    }

    fn open_window(&self, target: &str) -> Option<WindowId> {
        (**self).open_window(target)
    }

    fn focus(&self, window: WindowId) {
        (**self).focus(window);
    }

    fn exec_print_command(&self, window: WindowId) -> PrintCommandOutcome {
        (**self).exec_print_command(window)
    }

    fn print(&self, window: WindowId) {
        (**self).print(window);
    }

    fn close(&self, window: WindowId) {
        (**self).close(window);
    }

    fn add_after_print_listener(&self, window: WindowId, listener: AfterPrintListener) {
        (**self).add_after_print_listener(window, listener);
    }
}
