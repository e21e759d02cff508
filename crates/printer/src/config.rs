//! Configuration for the print service.
//!
//! The descriptor is read once when a [`crate::Printer`] is constructed; the
//! printer keeps its own copy, so mutating a config afterwards has no effect on
//! printers already built from it. Values can be set programmatically or loaded
//! from environment variables.

use core::time::Duration;
use std::env;

use serde::{Deserialize, Serialize};

const DEFAULT_SETTLE_DELAY_MS: u64 = 200;
const DEFAULT_SURFACE_CLASS: &str = "default";
const DEFAULT_ROOT_SELECTOR: &str = "app-root";

/// Settings supplied once at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Print through a dedicated window/tab instead of overlaying the current page
    pub open_in_new_window: bool,
    /// Wait after inserting content before the print dialog is invoked
    pub render_settle_delay_ms: u64,
    /// CSS class applied to the print surface container
    pub surface_class_name: String,
    /// Selector of the application root hidden during current-window printing
    pub root_selector: String,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            open_in_new_window: true,
            render_settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            surface_class_name: DEFAULT_SURFACE_CLASS.to_owned(),
            root_selector: DEFAULT_ROOT_SELECTOR.to_owned(),
        }
    }
}

impl PrintConfig {
    /// Construct a config with explicit values.
    ///
    /// Empty class names or selectors fall back to the defaults.
    #[must_use]
    pub fn new(
        open_in_new_window: bool,
        render_settle_delay_ms: u64,
        surface_class_name: impl Into<String>,
        root_selector: impl Into<String>,
    ) -> Self {
        Self {
            open_in_new_window,
            render_settle_delay_ms,
            surface_class_name: non_empty_or(surface_class_name.into(), DEFAULT_SURFACE_CLASS),
            root_selector: non_empty_or(root_selector.into(), DEFAULT_ROOT_SELECTOR),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `PRINTER_OPEN_WINDOW`: `1`/`true` or `0`/`false` (default: true)
    /// - `PRINTER_SETTLE_DELAY_MS`: settle delay in milliseconds (default: 200)
    /// - `PRINTER_SURFACE_CLASS`: surface CSS class (default: `default`)
    /// - `PRINTER_ROOT_SELECTOR`: application root selector (default: `app-root`)
    ///
    /// Unset or unparsable values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`PrintConfig::from_env`] with an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let open_in_new_window = lookup("PRINTER_OPEN_WINDOW")
            .and_then(|val| parse_flag(&val))
            .unwrap_or(defaults.open_in_new_window);
        let render_settle_delay_ms = lookup("PRINTER_SETTLE_DELAY_MS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(defaults.render_settle_delay_ms);
        let surface_class_name = lookup("PRINTER_SURFACE_CLASS")
            .map_or(defaults.surface_class_name, |val| {
                non_empty_or(val, DEFAULT_SURFACE_CLASS)
            });
        let root_selector = lookup("PRINTER_ROOT_SELECTOR")
            .map_or(defaults.root_selector, |val| non_empty_or(val, DEFAULT_ROOT_SELECTOR));
        Self {
            open_in_new_window,
            render_settle_delay_ms,
            surface_class_name,
            root_selector,
        }
    }

    /// Get the settle delay as a `Duration`.
    #[must_use]
    pub const fn render_settle_delay(&self) -> Duration {
        Duration::from_millis(self.render_settle_delay_ms)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_owned()
    } else {
        value
    }
}
