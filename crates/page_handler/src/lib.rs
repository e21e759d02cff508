//! Host side of the print service: the window/document primitives a browser
//! provides, plus [`MemoryHost`], an in-process implementation that records
//! every native call and lets callers fire the after-print signal themselves.

pub mod events;
pub mod memory;
pub mod window;

pub use events::HostEvent;
pub use memory::{EventObserver, MemoryHost};
pub use window::{AfterPrintListener, PrintCommandOutcome, PrintHost, SharedDocument, WindowId};
