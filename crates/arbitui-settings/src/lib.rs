//! # arbitui-settings
//!
//! Configuration management with layered sources for the arbitui gateway.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`Settings::default()`]
//! 2. **User file** — `~/.local/share/arbitui/settings.json` (deep-merged
//!    over defaults)
//! 3. **Environment variables** — `ARBITUI_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
