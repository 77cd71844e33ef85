//! Recognizing browsers and helper executables by path or app id.

use serde::{Deserialize, Serialize};

/// Install path of the Chromium-based Edge browser.
pub const EDGE_PATH: &str = r"%ProgramFiles(x86)%\Microsoft\Edge\Application\msedge.exe";
/// Packaged identity of Edge, used for site tiles and as an allowed dependency.
pub const EDGE_APP_ID: &str = "Microsoft.MicrosoftEdge.Stable_8wekyb3d8bbwe!App";
/// Helper executable Edge launches through for pinned sites.
pub const EDGE_PROXY_PATH: &str = r"%ProgramFiles(x86)%\Microsoft\Edge\Application\msedge_proxy.exe";

/// Browsers with some form of kiosk command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Edge,
    Chrome,
    Brave,
    Island,
    Firefox,
}

/// How much of the kiosk command line a browser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KioskSupport {
    /// Kiosk type switch, first-run suppression and idle timeout.
    Full,
    /// `--kiosk <url>` only, optionally with first-run suppression.
    Reduced,
}

impl BrowserKind {
    /// Detect a browser from an executable path or packaged app id.
    pub fn detect(value: &str) -> Option<Self> {
        let lower = value.to_ascii_lowercase();
        if is_edge(&lower) {
            Some(BrowserKind::Edge)
        } else if lower.ends_with("chrome.exe") {
            Some(BrowserKind::Chrome)
        } else if lower.ends_with("brave.exe") {
            Some(BrowserKind::Brave)
        } else if lower.ends_with("island.exe") {
            Some(BrowserKind::Island)
        } else if lower.ends_with("firefox.exe") {
            Some(BrowserKind::Firefox)
        } else {
            None
        }
    }

    pub fn kiosk_support(self) -> KioskSupport {
        match self {
            BrowserKind::Edge => KioskSupport::Full,
            BrowserKind::Chrome
            | BrowserKind::Brave
            | BrowserKind::Island
            | BrowserKind::Firefox => KioskSupport::Reduced,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BrowserKind::Edge => "Microsoft Edge",
            BrowserKind::Chrome => "Google Chrome",
            BrowserKind::Brave => "Brave",
            BrowserKind::Island => "Island",
            BrowserKind::Firefox => "Firefox",
        }
    }
}

fn is_edge(lower: &str) -> bool {
    lower.contains("msedge") || lower.contains("microsoftedge") || lower.contains(r"edge\application")
}

/// True for Edge executables and the Edge packaged identity.
pub fn is_edge_app(value: &str) -> bool {
    is_edge(&value.to_ascii_lowercase())
}

/// Updaters, proxies and crash handlers that are allowed but never launched directly.
pub fn is_helper_executable(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    ["_proxy.exe", "edgeupdate", "update.exe", "crashhandler"]
        .iter()
        .any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_browsers_by_executable() {
        assert_eq!(BrowserKind::detect(EDGE_PATH), Some(BrowserKind::Edge));
        assert_eq!(BrowserKind::detect(EDGE_APP_ID), Some(BrowserKind::Edge));
        assert_eq!(
            BrowserKind::detect(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            Some(BrowserKind::Chrome)
        );
        assert_eq!(
            BrowserKind::detect(r"C:\Program Files\Mozilla Firefox\FIREFOX.EXE"),
            Some(BrowserKind::Firefox)
        );
        assert_eq!(BrowserKind::detect(r"C:\Windows\System32\osk.exe"), None);
    }

    #[test]
    fn only_edge_has_full_support() {
        assert_eq!(BrowserKind::Edge.kiosk_support(), KioskSupport::Full);
        assert_eq!(BrowserKind::Brave.kiosk_support(), KioskSupport::Reduced);
    }

    #[test]
    fn helper_executables_are_recognized() {
        assert!(is_helper_executable(EDGE_PROXY_PATH));
        assert!(is_helper_executable(r"C:\Program Files (x86)\Microsoft\EdgeUpdate\MicrosoftEdgeUpdate.exe"));
        assert!(!is_helper_executable(EDGE_PATH));
    }
}
