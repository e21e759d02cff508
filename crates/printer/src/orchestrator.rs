//! The print service: picks a destination, puts the content on a print
//! surface, waits for layout to settle, opens the native dialog and tears
//! everything down again when the host reports the dialog closed.
//!
//! Ordering within one call is fixed: the surface is fully inserted before
//! the completion listener is armed, and the listener is armed before the
//! native print command runs.

use core::time::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use html::{Document, NodeId};
use log::{debug, info, warn};
use page_handler::{PrintHost, SharedDocument, WindowId};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::PrintConfig;
use crate::content::{Content, ContentMaterializer};
use crate::error::PrintError;
use crate::session::{CurrentWindowSession, Destination, PrintSource, PrinterState};
use crate::status::{StatusPublisher, StatusSubscription};
use crate::styling::copy_styling;
use crate::surface::SurfaceBuilder;

/// Target name passed to `open_window`; repeated calls land in the same tab.
pub const PRINT_WINDOW_TARGET: &str = "PRINT";
/// Delay before the second close attempt on a print window.
pub const CLOSE_RETRY_DELAY: Duration = Duration::from_millis(20);

fn lock_document(document: &SharedDocument) -> MutexGuard<'_, Document> {
    document.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle for one dispatched print call.
#[derive(Debug)]
pub struct PrintTicket {
    destination: Destination,
    window: WindowId,
    task: JoinHandle<bool>,
}

impl PrintTicket {
    pub const fn destination(&self) -> Destination {
        self.destination
    }

    /// Window whose print dialog this call opens.
    pub const fn window(&self) -> WindowId {
        self.window
    }

    /// Wait until the settle delay elapsed and the native print command was
    /// issued. False when no print happened (window closed during the delay,
    /// task aborted).
    pub async fn settled(self) -> bool {
        self.task.await.unwrap_or(false)
    }
}

struct Inner {
    config: PrintConfig,
    host: Arc<dyn PrintHost>,
    surfaces: SurfaceBuilder,
    status: StatusPublisher,
    state: Mutex<PrinterState>,
}

/// Print orchestration service. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Printer {
    inner: Arc<Inner>,
}

impl Printer {
    /// Build a printer. `config` is copied; later changes to it are not seen.
    pub fn new(
        config: &PrintConfig,
        host: Arc<dyn PrintHost>,
        materializer: Arc<dyn ContentMaterializer>,
        status: StatusPublisher,
    ) -> Self {
        let surfaces = SurfaceBuilder::new(config.surface_class_name.clone(), materializer);
        Self {
            inner: Arc::new(Inner {
                config: config.clone(),
                host,
                surfaces,
                status,
                state: Mutex::new(PrinterState::default()),
            }),
        }
    }

    pub fn config(&self) -> &PrintConfig {
        &self.inner.config
    }

    pub fn status(&self) -> &StatusPublisher {
        &self.inner.status
    }

    /// Replay-latest view of the printing status.
    pub fn printing_status(&self) -> StatusSubscription {
        self.inner.status.subscribe()
    }

    /// Whether a current-window print is waiting for its completion signal.
    pub fn is_session_active(&self) -> bool {
        self.lock_state().current.is_some()
    }

    fn lock_state(&self) -> MutexGuard<'_, PrinterState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn destination(&self) -> Destination {
        Destination::from_flag(self.inner.config.open_in_new_window)
    }

    fn ensure_idle(&self, destination: Destination) -> Result<(), PrintError> {
        if destination == Destination::CurrentWindow && self.is_session_active() {
            return Err(PrintError::SessionAlreadyActive);
        }
        Ok(())
    }

    fn current_document(&self) -> Result<SharedDocument, PrintError> {
        let window = self.inner.host.current_window();
        self.inner
            .host
            .document(window)
            .ok_or(PrintError::WindowClosed { window })
    }

    /// Build a surface from `content` and print it at the configured destination.
    ///
    /// Returns once the content is in place; the print dialog opens after the
    /// settle delay on a spawned task.
    ///
    /// # Errors
    ///
    /// Setup failures (`InvalidContentKind`, `WindowOpenFailed`,
    /// `SessionAlreadyActive`, ...) abort the call without leaving nodes or
    /// listeners behind.
    pub fn print_content(
        &self,
        content: impl Into<Content>,
        context: Option<Value>,
    ) -> Result<PrintTicket, PrintError> {
        let content = content.into();
        let runtime = Handle::try_current().map_err(|_| PrintError::RuntimeUnavailable)?;
        let destination = self.destination();
        self.ensure_idle(destination)?;
        let document = self.current_document()?;
        let surface = {
            let mut doc = lock_document(&document);
            self.inner.surfaces.build(&mut doc, &content, context.as_ref())?
        };
        let adopted = match content {
            Content::Element(node) => Some(node),
            Content::Text(_) | Content::Template(_) | Content::Component(_) => None,
        };
        let source = PrintSource {
            node: surface,
            wrapped: true,
            temporary: true,
            adopted,
        };
        self.dispatch(&runtime, destination, &document, source)
    }

    /// Print an element of the current document without building a surface
    /// for it first.
    ///
    /// # Errors
    ///
    /// Same as [`Printer::print_content`]; `node` must be a live element.
    pub fn print_element(&self, node: NodeId) -> Result<PrintTicket, PrintError> {
        let runtime = Handle::try_current().map_err(|_| PrintError::RuntimeUnavailable)?;
        let destination = self.destination();
        self.ensure_idle(destination)?;
        let document = self.current_document()?;
        if !lock_document(&document).is_element(node) {
            return Err(PrintError::InvalidContentKind {
                reason: format!("{node:?} is not a live element"),
            });
        }
        let source = PrintSource {
            node,
            wrapped: false,
            temporary: false,
            adopted: None,
        };
        self.dispatch(&runtime, destination, &document, source)
    }

    fn dispatch(
        &self,
        runtime: &Handle,
        destination: Destination,
        document: &SharedDocument,
        source: PrintSource,
    ) -> Result<PrintTicket, PrintError> {
        let prepared = match destination {
            Destination::NewWindow => self.prepare_new_window(document, source),
            Destination::CurrentWindow => self.prepare_current_window(document, source),
        };
        if source.temporary {
            release_temporary(&mut lock_document(document), source);
        }
        let window = prepared?;
        info!(target: "printer", "print dispatched to {destination} ({window})");

        let delay = self.inner.config.render_settle_delay();
        let task = match destination {
            Destination::NewWindow => runtime.spawn(self.clone().print_new_window(window, delay)),
            Destination::CurrentWindow => {
                self.arm_completion(window, destination);
                runtime.spawn(self.clone().print_current_window(window, delay))
            }
        };
        Ok(PrintTicket {
            destination,
            window,
            task,
        })
    }

    fn prepare_new_window(
        &self,
        document: &SharedDocument,
        source: PrintSource,
    ) -> Result<WindowId, PrintError> {
        let host = &self.inner.host;
        let window = host
            .open_window(PRINT_WINDOW_TARGET)
            .ok_or(PrintError::WindowOpenFailed)?;
        let Some(target) = host.document(window) else {
            host.close(window);
            return Err(PrintError::WindowClosed { window });
        };
        if Arc::ptr_eq(&target, document) {
            // The host handed back the application window itself
            return Err(PrintError::WindowOpenFailed);
        }
        if let Err(err) = write_print_document(document, &target, source.node) {
            host.close(window);
            return Err(err);
        }
        Ok(window)
    }

    fn prepare_current_window(
        &self,
        document: &SharedDocument,
        source: PrintSource,
    ) -> Result<WindowId, PrintError> {
        let window = self.inner.host.current_window();
        let mut state = self.lock_state();
        if state.current.is_some() {
            return Err(PrintError::SessionAlreadyActive);
        }
        let mut doc = lock_document(document);
        let body = doc.body().ok_or(PrintError::WindowClosed { window })?;
        let copy = doc.clone_node(source.node, true).ok_or_else(|| PrintError::InvalidContentKind {
            reason: "content vanished before printing".to_owned(),
        })?;
        let surface = if source.wrapped {
            copy
        } else {
            match self.inner.surfaces.wrap(&mut doc, copy) {
                Ok(surface) => surface,
                Err(err) => {
                    doc.remove_subtree(copy);
                    return Err(err);
                }
            }
        };
        if let Err(err) = doc.append_child(body, surface) {
            doc.remove_subtree(surface);
            return Err(err.into());
        }

        let selector = &self.inner.config.root_selector;
        let root = doc.query_selector(selector);
        let prior_root_display = if let Some(root_node) = root {
            let prior = doc.style_property(root_node, "display");
            if let Err(err) = doc.set_style_property(root_node, "display", "none") {
                doc.remove_subtree(surface);
                return Err(err.into());
            }
            prior
        } else {
            warn!(target: "printer", "{}", PrintError::RootElementNotFound {
                selector: selector.clone(),
            });
            String::new()
        };

        state.current = Some(CurrentWindowSession {
            window,
            surface,
            root,
            prior_root_display,
        });
        Ok(window)
    }

    async fn print_new_window(self, window: WindowId, delay: Duration) -> bool {
        time::sleep(delay).await;
        if self.inner.host.document(window).is_none() {
            warn!(target: "printer", "{window} closed before printing started");
            return false;
        }
        self.arm_completion(window, Destination::NewWindow);
        self.inner.status.publish(true);
        self.inner.host.focus(window);
        self.invoke_native_print(window);
        true
    }

    async fn print_current_window(self, window: WindowId, delay: Duration) -> bool {
        time::sleep(delay).await;
        self.inner.status.publish(true);
        self.invoke_native_print(window);
        true
    }

    fn invoke_native_print(&self, window: WindowId) {
        let outcome = self.inner.host.exec_print_command(window);
        if !outcome.succeeded() {
            debug!(target: "printer", "{} ({outcome:?})", PrintError::NativePrintUnavailable { window });
            self.inner.host.print(window);
        }
    }

    /// Register the completion listener for `window` unless one is already
    /// armed and has not fired yet. Returns whether a listener was added.
    pub fn arm_completion(&self, window: WindowId, destination: Destination) -> bool {
        self.inner.host.focus(window);
        let newly_armed = self.lock_state().arm(window);
        if !newly_armed {
            debug!(target: "printer", "completion listener already armed on {window}");
            return false;
        }
        // The listener keeps the printer alive until the dialog closes; the host
        // drops it after one call.
        let inner = Arc::clone(&self.inner);
        self.inner.host.add_after_print_listener(
            window,
            Box::new(move || Self { inner }.complete(window, destination)),
        );
        true
    }

    fn complete(&self, window: WindowId, destination: Destination) {
        let armed = self.lock_state().disarm(window);
        if !armed {
            debug!(target: "printer", "completion for {window} already handled");
            return;
        }
        self.clean_up(destination, window);
        self.inner.status.publish(false);
        info!(target: "printer", "print finished on {window}");
    }

    /// Tear down the print surface of `destination`. Safe to call repeatedly:
    /// returns false when there was nothing left to undo.
    pub fn clean_up(&self, destination: Destination, window: WindowId) -> bool {
        match destination {
            Destination::NewWindow => self.close_print_window(window),
            Destination::CurrentWindow => self.restore_current_window(),
        }
    }

    fn close_print_window(&self, window: WindowId) -> bool {
        let host = &self.inner.host;
        let was_open = host.document(window).is_some();
        host.close(window);
        // Some hosts defer the first close; try once more shortly after
        if let Ok(runtime) = Handle::try_current() {
            let retry_host = Arc::clone(host);
            runtime.spawn(async move {
                time::sleep(CLOSE_RETRY_DELAY).await;
                retry_host.close(window);
            });
        }
        was_open
    }

    fn restore_current_window(&self) -> bool {
        let Some(session) = self.lock_state().current.take() else {
            return false;
        };
        let Some(document) = self.inner.host.document(session.window) else {
            return true;
        };
        let mut doc = lock_document(&document);
        if let Some(root) = session.root.filter(|root| doc.contains(*root)) {
            if let Err(err) = doc.set_style_property(root, "display", &session.prior_root_display) {
                debug!(target: "printer", "root display not restored: {err}");
            }
        }
        doc.remove_subtree(session.surface);
        true
    }
}

/// Drop a surface built for a single call, handing an adopted caller
/// element back out of it first.
fn release_temporary(doc: &mut Document, source: PrintSource) {
    if let Some(adopted) = source.adopted.filter(|node| doc.parent(*node) == Some(source.node)) {
        doc.detach(adopted);
    }
    doc.remove_subtree(source.node);
}

fn write_print_document(
    source: &SharedDocument,
    target: &SharedDocument,
    node: NodeId,
) -> Result<(), PrintError> {
    let source_doc = lock_document(source);
    let mut target_doc = lock_document(target);
    target_doc.write_skeleton(&source_doc.title());
    copy_styling(&source_doc, &mut target_doc);
    let body = target_doc.body().ok_or_else(|| PrintError::InvalidContentKind {
        reason: "print document has no body".to_owned(),
    })?;
    target_doc.set_style_property(body, "margin", "0 0")?;
    let copy = target_doc
        .import_node(&source_doc, node, true)
        .ok_or_else(|| PrintError::InvalidContentKind {
            reason: format!("{node:?} vanished before printing"),
        })?;
    target_doc.append_child(body, copy)?;
    target_doc.close_stream();
    Ok(())
}
