#![allow(
    clippy::module_name_repetitions,
    reason = "Public names read better with their module prefix (PrintConfig, PrintError)"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

//! Print orchestration for DOM-hosted content.
//!
//! A [`Printer`] takes a piece of content (plain text, an element, a template
//! or a component), places it on a print surface and drives the host's
//! native print dialog, either in a dedicated window or by temporarily
//! replacing the current page. Whether a dialog is open is published through
//! a replay-latest [`StatusPublisher`].

pub mod config;
pub mod content;
pub mod error;
pub mod orchestrator;
pub mod session;
pub mod status;
pub mod styling;
pub mod surface;

pub use config::PrintConfig;
pub use content::{ComponentRef, ComponentRegistry, Content, ContentMaterializer, TemplateRef};
pub use error::{MaterializeError, PrintError};
pub use orchestrator::{CLOSE_RETRY_DELAY, PRINT_WINDOW_TARGET, PrintTicket, Printer};
pub use session::Destination;
pub use status::{StatusPublisher, StatusSubscription};
pub use styling::copy_styling;
pub use surface::{SURFACE_TAG, SurfaceBuilder, is_surface};
