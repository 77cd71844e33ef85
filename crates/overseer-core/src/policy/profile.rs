//! Profile identity and lockdown mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Id used in drafts and emitted when no id has been set yet.
pub const PLACEHOLDER_PROFILE_ID: &str = "{00000000-0000-0000-0000-000000000000}";

/// Lockdown mode of a kiosk profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KioskMode {
    /// One application, full screen.
    #[default]
    Single,
    /// A Start menu restricted to an allow-list, bound to one account.
    Multi,
    /// Same shell as `Multi`, bound to a user group or every non-admin user.
    Restricted,
}

impl KioskMode {
    pub fn as_str(self) -> &'static str {
        match self {
            KioskMode::Single => "single",
            KioskMode::Multi => "multi",
            KioskMode::Restricted => "restricted",
        }
    }

    /// True for the two modes that use the allowed-application list.
    pub fn uses_app_list(self) -> bool {
        !matches!(self, KioskMode::Single)
    }
}

impl fmt::Display for KioskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KioskMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(KioskMode::Single),
            "multi" => Ok(KioskMode::Multi),
            "restricted" => Ok(KioskMode::Restricted),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Root of a kiosk policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    /// Braced, hyphenated GUID.
    pub id: String,
    pub mode: KioskMode,
    /// Used for file names only; never encoded into the policy document.
    pub config_name: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            id: PLACEHOLDER_PROFILE_ID.to_string(),
            mode: KioskMode::Single,
            config_name: String::new(),
        }
    }
}

impl Profile {
    /// A fresh braced lowercase v4 GUID.
    pub fn generate_id() -> String {
        Uuid::new_v4().braced().to_string()
    }

    /// Replace the id with a freshly generated one.
    pub fn regenerate_id(&mut self) {
        self.id = Self::generate_id();
    }

    /// Whether the id may be exported: canonical format and not the placeholder.
    pub fn has_exportable_id(&self) -> bool {
        is_canonical_guid(&self.id) && !is_placeholder_id(&self.id)
    }
}

/// `{8-4-4-4-12}` hex digits, case-insensitive.
pub fn is_canonical_guid(value: &str) -> bool {
    let Some(inner) = value
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    else {
        return false;
    };
    inner.len() == 36
        && inner.chars().filter(|c| *c == '-').count() == 4
        && Uuid::try_parse(inner).is_ok()
}

pub fn is_placeholder_id(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case(PLACEHOLDER_PROFILE_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_canonical() {
        let id = Profile::generate_id();
        assert!(is_canonical_guid(&id), "{id}");
        assert_eq!(id, id.to_lowercase());
        assert!(!is_placeholder_id(&id));
    }

    #[test]
    fn canonical_guid_rejects_other_forms() {
        assert!(is_canonical_guid("{6f1b0a3e-2c4d-4e5f-8a9b-0c1d2e3f4a5b}"));
        assert!(is_canonical_guid("{6F1B0A3E-2C4D-4E5F-8A9B-0C1D2E3F4A5B}"));
        assert!(!is_canonical_guid("6f1b0a3e-2c4d-4e5f-8a9b-0c1d2e3f4a5b"));
        assert!(!is_canonical_guid("{6f1b0a3e2c4d4e5f8a9b0c1d2e3f4a5b}"));
        assert!(!is_canonical_guid("{urn:uuid:6f1b0a3e-2c4d-4e5f-8a9b-0c1d2e3f4a5b}"));
        assert!(!is_canonical_guid("{zzzzzzzz-2c4d-4e5f-8a9b-0c1d2e3f4a5b}"));
        assert!(!is_canonical_guid(""));
    }

    #[test]
    fn draft_profile_is_not_exportable() {
        let mut profile = Profile::default();
        assert!(!profile.has_exportable_id());
        profile.regenerate_id();
        assert!(profile.has_exportable_id());
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Multi".parse::<KioskMode>(), Ok(KioskMode::Multi));
        assert!("kiosk".parse::<KioskMode>().is_err());
    }
}
