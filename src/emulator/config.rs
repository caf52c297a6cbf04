// Configuration management
//
// Handles persisted emulator-wide settings. Window presentation lives in
// `display::WindowConfig` and keybindings in `input::config::InputConfig`;
// this struct only covers what's left over (currently nothing beyond a
// version marker, kept so the file format has somewhere to grow).

use serde::{Deserialize, Serialize};

/// Top-level emulator configuration, persisted separately from window and
/// input settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmulatorConfig {
    /// Reserved for future settings; present so the TOML file round-trips
    /// even with no fields populated yet.
    #[serde(default)]
    pub _reserved: Option<String>,
}
