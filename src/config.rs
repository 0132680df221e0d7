//! Toolkit configuration.
use std::env;
use std::path::PathBuf;

use crate::types::BorderStyle;

/// Settings shared by every object created from one context.
#[derive(Clone, Debug, PartialEq)]
pub struct TkConfig {
    /// Style of boxes drawn around windows and widgets.
    pub border_style: BorderStyle,
    /// List dot-files in the file chooser.
    pub show_hidden: bool,
    /// Directory the file chooser opens in. `None` means the current directory.
    pub start_dir: Option<PathBuf>,
    /// Prefix of selected items in a selection list.
    pub selection_marker: String,
    /// Character drawn in the unused part of an entry field.
    pub entry_filler: char,
}

impl Default for TkConfig {
    fn default() -> Self {
        Self {
            border_style: BorderStyle::Single,
            show_hidden: false,
            start_dir: None,
            selection_marker: "-->".to_string(),
            entry_filler: '.',
        }
    }
}

impl TkConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TUI_BORDER_STYLE` - single, double, rounded, bold or ascii (default: single)
    /// - `TUI_SHOW_HIDDEN` - list dot-files in the file chooser (default: false)
    /// - `TUI_START_DIR` - file chooser start directory (default: current directory)
    /// - `TUI_SELECTION_MARKER` - marker of selected items (default: `-->`)
    /// - `TUI_ENTRY_FILLER` - entry field filler character (default: `.`)
    ///
    /// Values that do not parse are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construct configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(style) = lookup("TUI_BORDER_STYLE").and_then(|s| BorderStyle::from_name(&s)) {
            config.border_style = style;
        }
        if let Some(show) = lookup("TUI_SHOW_HIDDEN").and_then(|s| parse_flag(&s)) {
            config.show_hidden = show;
        }
        if let Some(dir) = lookup("TUI_START_DIR").filter(|s| !s.is_empty()) {
            config.start_dir = Some(PathBuf::from(dir));
        }
        if let Some(marker) = lookup("TUI_SELECTION_MARKER").filter(|s| !s.is_empty()) {
            config.selection_marker = marker;
        }
        if let Some(filler) = lookup("TUI_ENTRY_FILLER").and_then(|s| single_char(&s)) {
            config.entry_filler = filler;
        }

        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = TkConfig::from_lookup(|_| None);
        assert_eq!(config, TkConfig::default());
        assert_eq!(config.entry_filler, '.');
        assert_eq!(config.selection_marker, "-->");
    }

    #[test]
    fn test_reads_all_variables() {
        let config = TkConfig::from_lookup(lookup_from(&[
            ("TUI_BORDER_STYLE", "rounded"),
            ("TUI_SHOW_HIDDEN", "yes"),
            ("TUI_START_DIR", "/tmp"),
            ("TUI_SELECTION_MARKER", "*>"),
            ("TUI_ENTRY_FILLER", "_"),
        ]));
        assert_eq!(config.border_style, BorderStyle::Rounded);
        assert!(config.show_hidden);
        assert_eq!(config.start_dir, Some(PathBuf::from("/tmp")));
        assert_eq!(config.selection_marker, "*>");
        assert_eq!(config.entry_filler, '_');
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let config = TkConfig::from_lookup(lookup_from(&[
            ("TUI_BORDER_STYLE", "wavy"),
            ("TUI_SHOW_HIDDEN", "maybe"),
            ("TUI_ENTRY_FILLER", "ab"),
            ("TUI_SELECTION_MARKER", ""),
        ]));
        assert_eq!(config, TkConfig::default());
    }
}
