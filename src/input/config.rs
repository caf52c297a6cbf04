// Input configuration module
//
// Persists keyboard-to-button mappings to/from a TOML file, matching the
// default bindings spec.md assigns: A<->Z, B<->C, Select<->Space, Start<->Enter,
// D-pad<->arrow keys.

use super::KeyboardMapping;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use winit::keyboard::KeyCode;

/// Serializable keyboard button mapping for one player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardMappingConfig {
    /// Key for A button (as string, e.g., "KeyZ")
    pub button_a: String,
    /// Key for B button
    pub button_b: String,
    /// Key for Select button
    pub select: String,
    /// Key for Start button
    pub start: String,
    /// Key for Up on D-pad
    pub up: String,
    /// Key for Down on D-pad
    pub down: String,
    /// Key for Left on D-pad
    pub left: String,
    /// Key for Right on D-pad
    pub right: String,
}

impl KeyboardMappingConfig {
    /// Default keyboard mapping for Player 1: A=Z, B=C, Select=Space, Start=Enter.
    pub fn player1_default() -> Self {
        Self {
            button_a: "KeyZ".to_string(),
            button_b: "KeyC".to_string(),
            select: "Space".to_string(),
            start: "Enter".to_string(),
            up: "ArrowUp".to_string(),
            down: "ArrowDown".to_string(),
            left: "ArrowLeft".to_string(),
            right: "ArrowRight".to_string(),
        }
    }

    /// Default keyboard mapping for Player 2.
    pub fn player2_default() -> Self {
        Self {
            button_a: "KeyK".to_string(),
            button_b: "KeyJ".to_string(),
            select: "KeyU".to_string(),
            start: "KeyY".to_string(),
            up: "KeyW".to_string(),
            down: "KeyS".to_string(),
            left: "KeyA".to_string(),
            right: "KeyD".to_string(),
        }
    }

    /// Convert to a runtime `KeyboardMapping`, resolving each key name.
    pub fn to_keyboard_mapping(&self) -> Result<KeyboardMapping, String> {
        Ok(KeyboardMapping {
            button_a: string_to_keycode(&self.button_a)?,
            button_b: string_to_keycode(&self.button_b)?,
            select: string_to_keycode(&self.select)?,
            start: string_to_keycode(&self.start)?,
            up: string_to_keycode(&self.up)?,
            down: string_to_keycode(&self.down)?,
            left: string_to_keycode(&self.left)?,
            right: string_to_keycode(&self.right)?,
        })
    }

    /// Build from a runtime `KeyboardMapping`.
    pub fn from_keyboard_mapping(mapping: &KeyboardMapping) -> Self {
        Self {
            button_a: keycode_to_string(mapping.button_a),
            button_b: keycode_to_string(mapping.button_b),
            select: keycode_to_string(mapping.select),
            start: keycode_to_string(mapping.start),
            up: keycode_to_string(mapping.up),
            down: keycode_to_string(mapping.down),
            left: keycode_to_string(mapping.left),
            right: keycode_to_string(mapping.right),
        }
    }
}

/// Complete input configuration: keyboard mappings for both players,
/// persisted as a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Keyboard mapping for Player 1
    pub keyboard_player1: KeyboardMappingConfig,
    /// Keyboard mapping for Player 2
    pub keyboard_player2: KeyboardMappingConfig,
}

impl InputConfig {
    /// Create a new input configuration with default mappings.
    pub fn new() -> Self {
        Self {
            keyboard_player1: KeyboardMappingConfig::player1_default(),
            keyboard_player2: KeyboardMappingConfig::player2_default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, toml_string).map_err(|e| format!("Failed to write config file: {}", e))
    }

    /// Load configuration from file, or write and return the defaults if it
    /// doesn't exist / fails to parse.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load_from_file(&path).unwrap_or_else(|e| {
            eprintln!("Could not load config ({}), using defaults", e);
            let config = Self::new();
            if let Err(e) = config.save_to_file(&path) {
                eprintln!("Warning: Could not save default config: {}", e);
            } else {
                println!("Created default configuration file");
            }
            config
        })
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn keycode_to_string(key: KeyCode) -> String {
    format!("{:?}", key)
}

fn string_to_keycode(s: &str) -> Result<KeyCode, String> {
    match s {
        "KeyA" => Ok(KeyCode::KeyA),
        "KeyB" => Ok(KeyCode::KeyB),
        "KeyC" => Ok(KeyCode::KeyC),
        "KeyD" => Ok(KeyCode::KeyD),
        "KeyE" => Ok(KeyCode::KeyE),
        "KeyF" => Ok(KeyCode::KeyF),
        "KeyG" => Ok(KeyCode::KeyG),
        "KeyH" => Ok(KeyCode::KeyH),
        "KeyI" => Ok(KeyCode::KeyI),
        "KeyJ" => Ok(KeyCode::KeyJ),
        "KeyK" => Ok(KeyCode::KeyK),
        "KeyL" => Ok(KeyCode::KeyL),
        "KeyM" => Ok(KeyCode::KeyM),
        "KeyN" => Ok(KeyCode::KeyN),
        "KeyO" => Ok(KeyCode::KeyO),
        "KeyP" => Ok(KeyCode::KeyP),
        "KeyQ" => Ok(KeyCode::KeyQ),
        "KeyR" => Ok(KeyCode::KeyR),
        "KeyS" => Ok(KeyCode::KeyS),
        "KeyT" => Ok(KeyCode::KeyT),
        "KeyU" => Ok(KeyCode::KeyU),
        "KeyV" => Ok(KeyCode::KeyV),
        "KeyW" => Ok(KeyCode::KeyW),
        "KeyX" => Ok(KeyCode::KeyX),
        "KeyY" => Ok(KeyCode::KeyY),
        "KeyZ" => Ok(KeyCode::KeyZ),
        "ArrowUp" => Ok(KeyCode::ArrowUp),
        "ArrowDown" => Ok(KeyCode::ArrowDown),
        "ArrowLeft" => Ok(KeyCode::ArrowLeft),
        "ArrowRight" => Ok(KeyCode::ArrowRight),
        "Enter" => Ok(KeyCode::Enter),
        "Space" => Ok(KeyCode::Space),
        "Escape" => Ok(KeyCode::Escape),
        "Backspace" => Ok(KeyCode::Backspace),
        "ShiftLeft" => Ok(KeyCode::ShiftLeft),
        "ShiftRight" => Ok(KeyCode::ShiftRight),
        "ControlLeft" => Ok(KeyCode::ControlLeft),
        "ControlRight" => Ok(KeyCode::ControlRight),
        "AltLeft" => Ok(KeyCode::AltLeft),
        "AltRight" => Ok(KeyCode::AltRight),
        _ => Err(format!("Unknown key code: {}", s)),
    }
}
