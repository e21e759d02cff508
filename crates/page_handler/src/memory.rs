//! In-process host: windows are plain [`Document`]s and every native call is
//! recorded so the print path can be driven and inspected without a browser.

use std::collections::BTreeMap;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use html::Document;
use log::{debug, trace};

use crate::events::HostEvent;
use crate::window::{AfterPrintListener, PrintCommandOutcome, PrintHost, SharedDocument, WindowId};

/// Hook invoked (outside the host lock) for every recorded event.
pub type EventObserver = Arc<dyn Fn(&HostEvent) + Send + Sync>;

struct WindowState {
    target: String,
    document: SharedDocument,
    closed: bool,
    listeners: Vec<AfterPrintListener>,
}

impl WindowState {
    fn new(target: &str, document: Document) -> Self {
        Self {
            target: target.to_owned(),
            document: Arc::new(Mutex::new(document)),
            closed: false,
            listeners: Vec::new(),
        }
    }
}

struct HostState {
    windows: BTreeMap<WindowId, WindowState>,
    next_window: u64,
    popups_blocked: bool,
    print_command: PrintCommandOutcome,
    events: Vec<HostEvent>,
    observer: Option<EventObserver>,
}

/// Cloneable handle; clones share the same windows.
#[derive(Clone)]
pub struct MemoryHost {
    state: Arc<Mutex<HostState>>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl MemoryHost {
    /// Host whose main window shows `document`.
    pub fn new(document: Document) -> Self {
        let mut windows = BTreeMap::new();
        windows.insert(WindowId::MAIN, WindowState::new("", document));
        Self {
            state: Arc::new(Mutex::new(HostState {
                windows,
                next_window: 1,
                popups_blocked: false,
                print_command: PrintCommandOutcome::Accepted,
                events: Vec::new(),
                observer: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, event: HostEvent) {
        trace!(target: "page_handler", "host event {event:?}");
        let observer = {
            let mut state = self.lock();
            state.events.push(event.clone());
            state.observer.clone()
        };
        if let Some(observer) = observer {
            observer(&event);
        }
    }

    /// Refuse every subsequent `open_window`, like a pop-up blocker.
    pub fn set_popups_blocked(&self, blocked: bool) {
        self.lock().popups_blocked = blocked;
    }

    /// Choose how the document-level print command behaves.
    pub fn set_print_command_outcome(&self, outcome: PrintCommandOutcome) {
        self.lock().print_command = outcome;
    }

    pub fn set_observer(&self, observer: EventObserver) {
        self.lock().observer = Some(observer);
    }

    /// Simulate the print dialog of `window` closing. Runs and drops every
    /// pending listener; returns how many ran.
    pub fn fire_after_print(&self, window: WindowId) -> usize {
        let listeners = {
            let mut state = self.lock();
            state
                .windows
                .get_mut(&window)
                .map(|win| mem::take(&mut win.listeners))
                .unwrap_or_default()
        };
        let count = listeners.len();
        debug!(target: "page_handler", "afterprint on {window}: {count} listener(s)");
        self.record(HostEvent::AfterPrint {
            window,
            listeners: count,
        });
        for listener in listeners {
            listener();
        }
        count
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.lock().events.clone()
    }

    pub fn clear_events(&self) {
        self.lock().events.clear();
    }

    fn count_events(&self, predicate: impl Fn(&HostEvent) -> bool) -> usize {
        self.lock().events.iter().filter(|event| predicate(event)).count()
    }

    pub fn print_command_calls(&self, window: WindowId) -> usize {
        self.count_events(|event| matches!(event, HostEvent::PrintCommand { window: win, .. } if *win == window))
    }

    pub fn window_print_calls(&self, window: WindowId) -> usize {
        self.count_events(|event| *event == HostEvent::WindowPrint(window))
    }

    pub fn close_calls(&self, window: WindowId) -> usize {
        self.count_events(|event| *event == HostEvent::Closed(window))
    }

    pub fn focus_calls(&self, window: WindowId) -> usize {
        self.count_events(|event| *event == HostEvent::Focused(window))
    }

    /// Listeners registered on `window` that have not fired yet.
    pub fn pending_listeners(&self, window: WindowId) -> usize {
        self.lock()
            .windows
            .get(&window)
            .map_or(0, |win| win.listeners.len())
    }

    pub fn is_closed(&self, window: WindowId) -> bool {
        self.lock().windows.get(&window).is_none_or(|win| win.closed)
    }

    /// Every window other than the main one, open or closed.
    pub fn opened_windows(&self) -> Vec<WindowId> {
        self.lock()
            .windows
            .keys()
            .copied()
            .filter(|id| *id != WindowId::MAIN)
            .collect()
    }

    /// Shortcut for the main window's document.
    pub fn main_document(&self) -> SharedDocument {
        let state = self.lock();
        state.windows.get(&WindowId::MAIN).map_or_else(
            || Arc::new(Mutex::new(Document::new())),
            |win| Arc::clone(&win.document),
        )
    }
}

impl PrintHost for MemoryHost {
    fn current_window(&self) -> WindowId {
        WindowId::MAIN
    }

    fn document(&self, window: WindowId) -> Option<SharedDocument> {
        let state = self.lock();
        let win = state.windows.get(&window)?;
        (!win.closed).then(|| Arc::clone(&win.document))
    }

    fn open_window(&self, target: &str) -> Option<WindowId> {
        let opened = {
            let mut state = self.lock();
            if state.popups_blocked {
                None
            } else {
                let existing = (!target.is_empty() && target != "_blank")
                    .then(|| {
                        state
                            .windows
                            .iter()
                            .find(|(_, win)| !win.closed && win.target == target)
                            .map(|(id, _)| *id)
                    })
                    .flatten();
                if let Some(id) = existing {
                    Some((id, true))
                } else {
                    let id = WindowId(state.next_window);
                    state.next_window += 1;
                    state.windows.insert(id, WindowState::new(target, Document::new()));
                    Some((id, false))
                }
            }
        };
        match opened {
            Some((window, reused)) => {
                self.record(HostEvent::Opened {
                    window,
                    target: target.to_owned(),
                    reused,
                });
                Some(window)
            }
            None => {
                self.record(HostEvent::OpenBlocked {
                    target: target.to_owned(),
                });
                None
            }
        }
    }

    fn focus(&self, window: WindowId) {
        self.record(HostEvent::Focused(window));
    }

    fn exec_print_command(&self, window: WindowId) -> PrintCommandOutcome {
        let outcome = self.lock().print_command;
        self.record(HostEvent::PrintCommand { window, outcome });
        outcome
    }

    fn print(&self, window: WindowId) {
        self.record(HostEvent::WindowPrint(window));
    }

    fn close(&self, window: WindowId) {
        {
            let mut state = self.lock();
            // Scripts cannot close the window they were not opened from
            let closable = window != WindowId::MAIN;
            if let Some(win) = state.windows.get_mut(&window).filter(|_| closable) {
                win.closed = true;
                win.listeners.clear();
            }
        }
        self.record(HostEvent::Closed(window));
    }

    fn add_after_print_listener(&self, window: WindowId, listener: AfterPrintListener) {
        {
            let mut state = self.lock();
            if let Some(win) = state.windows.get_mut(&window) {
                win.listeners.push(listener);
            }
        }
        self.record(HostEvent::ListenerAdded(window));
    }
}
