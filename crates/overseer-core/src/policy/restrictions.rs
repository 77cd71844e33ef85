//! Shell restrictions: file explorer exposure, taskbar, break-out key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which parts of the file system File Explorer may show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileExplorerAccess {
    /// No restriction block is emitted; the shell default applies.
    #[default]
    None,
    DownloadsOnly,
    RemovableOnly,
    DownloadsAndRemovable,
    Unrestricted,
}

impl FileExplorerAccess {
    pub fn allows_downloads(self) -> bool {
        matches!(
            self,
            FileExplorerAccess::DownloadsOnly | FileExplorerAccess::DownloadsAndRemovable
        )
    }

    pub fn allows_removable(self) -> bool {
        matches!(
            self,
            FileExplorerAccess::RemovableOnly | FileExplorerAccess::DownloadsAndRemovable
        )
    }

    /// Inverse of the two allowance flags plus the "no restriction" marker.
    pub fn from_parts(downloads: bool, removable: bool, unrestricted: bool) -> Self {
        if unrestricted {
            return FileExplorerAccess::Unrestricted;
        }
        match (downloads, removable) {
            (true, true) => FileExplorerAccess::DownloadsAndRemovable,
            (true, false) => FileExplorerAccess::DownloadsOnly,
            (false, true) => FileExplorerAccess::RemovableOnly,
            (false, false) => FileExplorerAccess::None,
        }
    }
}

/// Key chord that exits a single-app kiosk, e.g. `Ctrl+Alt+K`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakoutSequence {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    pub key: String,
}

impl BreakoutSequence {
    pub fn new(ctrl: bool, alt: bool, shift: bool, key: impl Into<String>) -> Self {
        Self {
            ctrl,
            alt,
            shift,
            key: key.into(),
        }
    }

    /// Parse `Ctrl+Alt+Shift+Key`. Modifiers may appear in any order and case;
    /// the last segment is the terminal key, which may itself be `+`.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let (head, key) = match trimmed.strip_suffix('+').map(str::trim_end) {
            Some("") => (None, "+"),
            Some(rest) if rest.ends_with('+') => (rest.strip_suffix('+'), "+"),
            _ => match trimmed.rsplit_once('+') {
                Some((head, key)) => (Some(head), key.trim()),
                None => (None, trimmed),
            },
        };
        if key.is_empty() {
            return None;
        }
        let mut sequence = Self::new(false, false, false, key);
        for modifier in head.into_iter().flat_map(|head| head.split('+')) {
            match modifier.trim().to_ascii_lowercase().as_str() {
                "ctrl" | "control" => sequence.ctrl = true,
                "alt" => sequence.alt = true,
                "shift" => sequence.shift = true,
                _ => return None,
            }
        }
        Some(sequence)
    }
}

impl fmt::Display for BreakoutSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        f.write_str(&self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restrictions {
    #[serde(default)]
    pub file_access: FileExplorerAccess,
    #[serde(default = "default_show_taskbar")]
    pub show_taskbar: bool,
    /// Single mode only.
    #[serde(default)]
    pub breakout: Option<BreakoutSequence>,
}

fn default_show_taskbar() -> bool {
    true
}

impl Default for Restrictions {
    fn default() -> Self {
        Self {
            file_access: FileExplorerAccess::None,
            show_taskbar: default_show_taskbar(),
            breakout: None,
        }
    }
}
