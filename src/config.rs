//! Configuration for slate
//!
//! Loads configuration from TOML file at `~/.config/slate/config.toml`.
//! Auto-generates default config file on first run if missing. Built-in
//! presets can replace the file entirely (`--preset`).

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::wm::keyboard::{Action, KeyCombo, Modifiers};
use crate::wm::tiling::LayoutParams;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub colors: ColorConfig,
    pub status_bar: StatusBarConfig,
    pub input: InputConfig,
    pub keybindings: Vec<Keybinding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            colors: ColorConfig::default(),
            status_bar: StatusBarConfig::default(),
            input: InputConfig::default(),
            keybindings: tiling_bindings(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file at the default location is created from the
    /// defaults; a missing explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let config_path = Self::config_path()?;
                if !config_path.exists() {
                    info!("Config file not found at {:?}, using defaults", config_path);
                    if let Err(e) = Self::save_default(&config_path) {
                        warn!("Failed to create default config file: {}", e);
                    }
                    return Ok(Self::default());
                }
                config_path
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {:?}", config_path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", config_path))?;

        info!("Configuration loaded from {:?}", config_path);
        debug!("Config: {:?}", config);
        Ok(config)
    }

    /// Built-in configuration by name.
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "tiling" => Ok(Self::default()),
            "statusbar" => Ok(Self {
                status_bar: StatusBarConfig {
                    enabled: true,
                    ..StatusBarConfig::default()
                },
                keybindings: statusbar_bindings(),
                ..Self::default()
            }),
            other => bail!("Unknown preset '{}' (expected 'tiling' or 'statusbar')", other),
        }
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("slate");
        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    pub fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string =
            toml::to_string_pretty(&Self::default()).context("Failed to serialize default config")?;
        fs::write(path, toml_string).context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }

    /// Reject values the manager cannot run with.
    pub fn validate(&self) -> Result<()> {
        let ratio = self.layout.master_ratio;
        ensure!(
            ratio > 0.0 && ratio < 1.0,
            "layout.master_ratio must be between 0 and 1 (exclusive), got {}",
            ratio
        );
        ensure!(
            !self.status_bar.enabled || self.status_bar.height > 0,
            "status_bar.height must be positive when the bar is enabled"
        );
        self.colors.focused_pixel()?;
        self.colors.unfocused_pixel()?;
        self.input.drag_mask()?;
        self.bindings()?;
        Ok(())
    }

    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            master_ratio: self.layout.master_ratio,
            border_width: self.layout.border_width,
            reserved_top: if self.status_bar.enabled {
                u32::from(self.status_bar.height)
            } else {
                0
            },
        }
    }

    /// Resolved key bindings.
    pub fn bindings(&self) -> Result<Vec<(KeyCombo, Action)>> {
        self.keybindings
            .iter()
            .map(|binding| {
                let combo = KeyCombo::parse(&binding.modifiers, &binding.key)
                    .with_context(|| format!("Invalid key binding {:?}", binding))?;
                Ok((combo, binding.to_action()?))
            })
            .collect()
    }
}

/// Layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub master_ratio: f64,
    pub border_width: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let params = LayoutParams::default();
        Self {
            master_ratio: params.master_ratio,
            border_width: params.border_width,
        }
    }
}

/// Border colours as `#rrggbb`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub focused_border: String,
    pub unfocused_border: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            focused_border: "#ffffff".into(),
            unfocused_border: "#000000".into(),
        }
    }
}

impl ColorConfig {
    pub fn focused_pixel(&self) -> Result<u32> {
        parse_color(&self.focused_border).context("Invalid colors.focused_border")
    }

    pub fn unfocused_pixel(&self) -> Result<u32> {
        parse_color(&self.unfocused_border).context("Invalid colors.unfocused_border")
    }
}

/// Status bar configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusBarConfig {
    pub enabled: bool,
    pub height: u16,
    /// Core X font name
    pub font: String,
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            height: 20,
            font: "fixed".into(),
        }
    }
}

/// Input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Modifiers held with the primary button to start a move. Empty
    /// means a plain click drags, and primary clicks no longer reach
    /// applications.
    pub drag_modifiers: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            drag_modifiers: vec!["super".into()],
        }
    }
}

impl InputConfig {
    pub fn drag_mask(&self) -> Result<Modifiers> {
        Modifiers::parse_all(&self.drag_modifiers).context("Invalid input.drag_modifiers")
    }
}

/// What a binding does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Launch,
    RequestClose,
    ForceKill,
    CloseOrKill,
    Exit,
}

/// One `[[keybindings]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keybinding {
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub key: String,
    pub action: ActionKind,
    /// Program and arguments for `launch`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
}

impl Keybinding {
    fn new(modifiers: &[&str], key: &str, action: ActionKind) -> Self {
        Self {
            modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
            key: key.into(),
            action,
            command: Vec::new(),
        }
    }

    fn launch(modifiers: &[&str], key: &str, command: &[&str]) -> Self {
        Self {
            command: command.iter().map(|c| c.to_string()).collect(),
            ..Self::new(modifiers, key, ActionKind::Launch)
        }
    }

    pub fn to_action(&self) -> Result<Action> {
        let action = match self.action {
            ActionKind::Launch => {
                ensure!(
                    !self.command.is_empty(),
                    "launch binding for '{}' has no command",
                    self.key
                );
                Action::Launch(self.command.clone())
            }
            ActionKind::RequestClose => Action::RequestCloseFocused,
            ActionKind::ForceKill => Action::ForceKillFocused,
            ActionKind::CloseOrKill => Action::CloseOrKillFocused,
            ActionKind::Exit => Action::ExitManager,
        };
        Ok(action)
    }
}

fn tiling_bindings() -> Vec<Keybinding> {
    vec![
        Keybinding::launch(&["super"], "Return", &["konsole"]),
        Keybinding::launch(&["super"], "a", &["wofi", "--show", "drun"]),
        Keybinding::launch(&["super"], "d", &["dmenu_run"]),
        Keybinding::launch(&["super"], "e", &["dolphin"]),
        Keybinding::new(&["super"], "q", ActionKind::RequestClose),
        Keybinding::new(&["super", "shift"], "q", ActionKind::ForceKill),
        Keybinding::new(&["super"], "m", ActionKind::Exit),
    ]
}

fn statusbar_bindings() -> Vec<Keybinding> {
    vec![
        Keybinding::launch(&["super"], "Return", &["konsole"]),
        Keybinding::launch(&["super"], "d", &["dmenu_run"]),
        Keybinding::launch(&["super"], "e", &["dolphin"]),
        Keybinding::new(&["super"], "q", ActionKind::CloseOrKill),
        Keybinding::new(&["super", "shift"], "q", ActionKind::ForceKill),
        Keybinding::new(&["super"], "m", ActionKind::Exit),
    ]
}

/// Parse `#rrggbb` (the `#` is optional) into a TrueColor pixel.
fn parse_color(text: &str) -> Result<u32> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    ensure!(hex.len() == 6, "expected #rrggbb, got '{}'", text);
    u32::from_str_radix(hex, 16).with_context(|| format!("expected #rrggbb, got '{}'", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.layout_params(), LayoutParams::default());
        assert_eq!(config.bindings().unwrap().len(), 7);
    }

    #[test]
    fn test_presets_are_valid() {
        for name in ["tiling", "statusbar"] {
            Config::preset(name).unwrap().validate().unwrap();
        }
        assert!(Config::preset("dwm").is_err());
    }

    #[test]
    fn test_statusbar_preset_reserves_top() {
        let config = Config::preset("statusbar").unwrap();
        assert_eq!(config.layout_params().reserved_top, 20);

        let actions: Vec<_> = config.bindings().unwrap().into_iter().map(|(_, a)| a).collect();
        assert!(actions.contains(&Action::CloseOrKillFocused));
        assert!(!actions.contains(&Action::RequestCloseFocused));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r##"
[layout]
master_ratio = 0.5

[colors]
focused_border = "#ff8800"

[[keybindings]]
modifiers = ["super"]
key = "t"
action = "launch"
command = ["xterm", "-e", "htop"]
"##,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        config.validate().unwrap();

        assert_eq!(config.layout.master_ratio, 0.5);
        assert_eq!(config.layout.border_width, 2);
        assert_eq!(config.colors.focused_pixel().unwrap(), 0xff8800);
        assert_eq!(config.colors.unfocused_pixel().unwrap(), 0);
        assert!(!config.status_bar.enabled);

        let bindings = config.bindings().unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].0.modifiers, Modifiers::SUPER);
        assert_eq!(
            bindings[0].1,
            Action::Launch(vec!["xterm".into(), "-e".into(), "htop".into()])
        );
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_saved_default_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::save_default(&path).unwrap();
        let loaded = Config::load(Some(&path)).unwrap();

        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.layout.master_ratio = 1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.status_bar.enabled = true;
        config.status_bar.height = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.colors.unfocused_border = "black".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.input.drag_modifiers = vec!["hyper".into()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.keybindings = vec![Keybinding::new(&["super"], "t", ActionKind::Launch)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_drag_modifiers_allowed() {
        let mut config = Config::default();
        config.input.drag_modifiers.clear();
        assert_eq!(config.input.drag_mask().unwrap(), Modifiers::empty());
    }
}
