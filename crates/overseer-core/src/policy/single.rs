//! The application shown by a single-app kiosk, and browser launch settings
//! shared with the multi-app auto-launch entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Edge kiosk presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKioskType {
    /// Digital signage / interactive display.
    #[default]
    Fullscreen,
    /// Public browsing with a restricted browser frame.
    PublicBrowsing,
}

impl EdgeKioskType {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKioskType::Fullscreen => "fullscreen",
            EdgeKioskType::PublicBrowsing => "public-browsing",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fullscreen" => Some(EdgeKioskType::Fullscreen),
            "public-browsing" => Some(EdgeKioskType::PublicBrowsing),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeKioskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the browser's start page comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "sourceType", content = "value", rename_all = "lowercase")]
pub enum LaunchSource {
    Url(String),
    /// A local file, converted to a `file:///` URL when encoded.
    File(String),
}

impl Default for LaunchSource {
    fn default() -> Self {
        LaunchSource::Url(String::new())
    }
}

impl LaunchSource {
    pub fn value(&self) -> &str {
        match self {
            LaunchSource::Url(v) | LaunchSource::File(v) => v,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value().trim().is_empty()
    }
}

/// Browser kiosk settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserLaunch {
    pub source: LaunchSource,
    #[serde(default)]
    pub kiosk_type: EdgeKioskType,
    /// Minutes of inactivity before the session resets. Zero disables it.
    #[serde(default)]
    pub idle_timeout_minutes: u32,
}

impl BrowserLaunch {
    pub fn url(url: impl Into<String>, kiosk_type: EdgeKioskType) -> Self {
        Self {
            source: LaunchSource::Url(url.into()),
            kiosk_type,
            idle_timeout_minutes: 0,
        }
    }

    pub fn with_idle_timeout(mut self, minutes: u32) -> Self {
        self.idle_timeout_minutes = minutes;
        self
    }
}

/// Discriminant of [`SingleApp`], used when switching variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SingleAppKind {
    Browser,
    Packaged,
    Desktop,
}

/// The one application a single-app kiosk runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "appType", rename_all = "camelCase")]
pub enum SingleApp {
    /// Edge in kiosk mode.
    Browser(BrowserLaunch),
    /// A packaged (UWP) app by application user model id.
    #[serde(rename_all = "camelCase")]
    Packaged { app_id: String },
    /// A classic desktop executable.
    #[serde(rename_all = "camelCase")]
    Desktop { path: String, arguments: String },
}

impl Default for SingleApp {
    fn default() -> Self {
        SingleApp::Browser(BrowserLaunch::default())
    }
}

impl SingleApp {
    pub fn kind(&self) -> SingleAppKind {
        match self {
            SingleApp::Browser(_) => SingleAppKind::Browser,
            SingleApp::Packaged { .. } => SingleAppKind::Packaged,
            SingleApp::Desktop { .. } => SingleAppKind::Desktop,
        }
    }

    /// An empty application of the given kind.
    pub fn blank(kind: SingleAppKind) -> Self {
        match kind {
            SingleAppKind::Browser => SingleApp::default(),
            SingleAppKind::Packaged => SingleApp::Packaged {
                app_id: String::new(),
            },
            SingleAppKind::Desktop => SingleApp::Desktop {
                path: String::new(),
                arguments: String::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kiosk_type_text_form() {
        assert_eq!(EdgeKioskType::PublicBrowsing.as_str(), "public-browsing");
        assert_eq!(
            EdgeKioskType::parse("fullscreen"),
            Some(EdgeKioskType::Fullscreen)
        );
        assert_eq!(EdgeKioskType::parse("kiosk"), None);
    }

    #[test]
    fn single_app_json_shape() {
        let app = SingleApp::Desktop {
            path: r"C:\App\app.exe".to_string(),
            arguments: "--full".to_string(),
        };
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["appType"], "desktop");
        assert_eq!(json["arguments"], "--full");

        let browser = SingleApp::Browser(BrowserLaunch::url(
            "https://example.com",
            EdgeKioskType::PublicBrowsing,
        ));
        let json = serde_json::to_value(&browser).unwrap();
        assert_eq!(json["appType"], "browser");
        assert_eq!(json["source"]["sourceType"], "url");
        assert_eq!(json["kioskType"], "public-browsing");
        let back: SingleApp = serde_json::from_value(json).unwrap();
        assert_eq!(back, browser);
    }

    #[test]
    fn blank_matches_requested_kind() {
        for kind in [
            SingleAppKind::Browser,
            SingleAppKind::Packaged,
            SingleAppKind::Desktop,
        ] {
            assert_eq!(SingleApp::blank(kind).kind(), kind);
        }
    }
}
