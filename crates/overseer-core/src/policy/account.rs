//! Account binding for a kiosk profile.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::profile::KioskMode;

/// Display name used when an auto-logon account has none.
pub const DEFAULT_DISPLAY_NAME: &str = "Kiosk";

/// Directory that owns a user group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupType {
    #[default]
    LocalGroup,
    ActiveDirectoryGroup,
    AzureActiveDirectoryGroup,
}

impl GroupType {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupType::LocalGroup => "LocalGroup",
            GroupType::ActiveDirectoryGroup => "ActiveDirectoryGroup",
            GroupType::AzureActiveDirectoryGroup => "AzureActiveDirectoryGroup",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LocalGroup" => Some(GroupType::LocalGroup),
            "ActiveDirectoryGroup" => Some(GroupType::ActiveDirectoryGroup),
            "AzureActiveDirectoryGroup" => Some(GroupType::AzureActiveDirectoryGroup),
            _ => None,
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who the profile applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "accountType", rename_all = "camelCase")]
pub enum Account {
    /// A local account created and signed in automatically.
    #[serde(rename_all = "camelCase")]
    AutoLogon { display_name: String },
    /// A pre-existing local, domain or Entra account.
    #[serde(rename_all = "camelCase")]
    ExistingUser { account_name: String },
    /// Every member of a group. Restricted mode only.
    #[serde(rename_all = "camelCase")]
    UserGroup {
        group_type: GroupType,
        group_name: String,
    },
    /// Every non-administrator account. Restricted mode only.
    GlobalProfile,
}

impl Default for Account {
    fn default() -> Self {
        Account::auto_logon(DEFAULT_DISPLAY_NAME)
    }
}

impl Account {
    pub fn auto_logon(display_name: impl Into<String>) -> Self {
        Account::AutoLogon {
            display_name: display_name.into(),
        }
    }

    pub fn existing(account_name: impl Into<String>) -> Self {
        Account::ExistingUser {
            account_name: account_name.into(),
        }
    }

    pub fn group(group_type: GroupType, group_name: impl Into<String>) -> Self {
        Account::UserGroup {
            group_type,
            group_name: group_name.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Account::AutoLogon { .. } => "Auto-logon",
            Account::ExistingUser { .. } => "Existing user",
            Account::UserGroup { .. } => "User group",
            Account::GlobalProfile => "Global profile",
        }
    }

    /// Whether this variant may be bound in `mode`.
    pub fn allowed_in(&self, mode: KioskMode) -> bool {
        match self {
            Account::AutoLogon { .. } | Account::ExistingUser { .. } => {
                mode != KioskMode::Restricted
            }
            Account::UserGroup { .. } | Account::GlobalProfile => mode == KioskMode::Restricted,
        }
    }

    /// Nearest legal variant for `mode`: a blank local group when entering
    /// Restricted, a default auto-logon account when leaving it.
    pub fn coerced_for(&self, mode: KioskMode) -> Option<Account> {
        if self.allowed_in(mode) {
            return None;
        }
        Some(match mode {
            KioskMode::Restricted => Account::group(GroupType::LocalGroup, ""),
            KioskMode::Single | KioskMode::Multi => Account::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restricted_mode_only_accepts_groups_and_global() {
        assert!(!Account::default().allowed_in(KioskMode::Restricted));
        assert!(Account::GlobalProfile.allowed_in(KioskMode::Restricted));
        assert!(!Account::GlobalProfile.allowed_in(KioskMode::Multi));
        assert!(Account::existing("kiosk").allowed_in(KioskMode::Single));
    }

    #[test]
    fn coercion_picks_nearest_default() {
        assert_eq!(
            Account::existing("kiosk").coerced_for(KioskMode::Restricted),
            Some(Account::group(GroupType::LocalGroup, ""))
        );
        assert_eq!(
            Account::GlobalProfile.coerced_for(KioskMode::Single),
            Some(Account::default())
        );
        assert_eq!(Account::default().coerced_for(KioskMode::Multi), None);
    }

    #[test]
    fn account_serializes_with_type_tag() {
        let json = serde_json::to_value(Account::auto_logon("Lobby")).unwrap();
        assert_eq!(json["accountType"], "autoLogon");
        assert_eq!(json["displayName"], "Lobby");

        let json = serde_json::to_value(Account::GlobalProfile).unwrap();
        assert_eq!(json["accountType"], "globalProfile");
    }
}
