//! Candidate lookup rules for the decoder.
//!
//! Several concepts moved between schema generations, so each field is found
//! through an ordered list of `(namespace, local name)` candidates. Supporting
//! a new spelling is a matter of adding a candidate here.

use tracing::debug;

use super::namespaces::{DEFAULT, ROOT_ELEMENT, RS5, V3, V4, V5};
use super::tree::{Ns, XmlElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NsMatch {
    Exact(&'static str),
    /// No namespace at all: unprefixed attributes, or elements in a document
    /// without a default namespace.
    Unqualified,
}

impl NsMatch {
    fn matches(self, ns: &Ns) -> bool {
        match (self, ns) {
            (NsMatch::Exact(want), Ns::Bound(have)) => want == have,
            (NsMatch::Unqualified, Ns::Unbound) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub ns: NsMatch,
    pub local: &'static str,
}

const fn exact(ns: &'static str, local: &'static str) -> Candidate {
    Candidate {
        ns: NsMatch::Exact(ns),
        local,
    }
}

const fn plain(local: &'static str) -> Candidate {
    Candidate {
        ns: NsMatch::Unqualified,
        local,
    }
}

/// Candidates in priority order.
pub type Rule = &'static [Candidate];

// Elements of the stable core.
pub const ROOT: Rule = &[exact(DEFAULT, ROOT_ELEMENT), plain(ROOT_ELEMENT)];
pub const PROFILES: Rule = &[exact(DEFAULT, "Profiles"), plain("Profiles")];
pub const PROFILE: Rule = &[exact(DEFAULT, "Profile"), plain("Profile")];
pub const KIOSK_MODE_APP: Rule = &[exact(DEFAULT, "KioskModeApp"), plain("KioskModeApp")];
pub const ALL_APPS_LIST: Rule = &[exact(DEFAULT, "AllAppsList"), plain("AllAppsList")];
pub const ALLOWED_APPS: Rule = &[exact(DEFAULT, "AllowedApps"), plain("AllowedApps")];
pub const APP: Rule = &[exact(DEFAULT, "App"), plain("App")];
pub const TASKBAR: Rule = &[exact(DEFAULT, "Taskbar"), plain("Taskbar")];
pub const CONFIGS: Rule = &[exact(DEFAULT, "Configs"), plain("Configs")];
pub const CONFIG: Rule = &[exact(DEFAULT, "Config"), plain("Config")];
pub const AUTO_LOGON_ACCOUNT: Rule = &[exact(DEFAULT, "AutoLogonAccount"), plain("AutoLogonAccount")];
pub const ACCOUNT: Rule = &[exact(DEFAULT, "Account"), plain("Account")];
pub const USER_GROUP: Rule = &[exact(DEFAULT, "UserGroup"), plain("UserGroup")];
pub const DEFAULT_PROFILE: Rule = &[exact(DEFAULT, "DefaultProfile"), plain("DefaultProfile")];

// Elements from extension generations.
pub const GLOBAL_PROFILE: Rule = &[exact(V3, "GlobalProfile"), exact(DEFAULT, "GlobalProfile")];
pub const BREAKOUT_SEQUENCE: Rule = &[exact(V4, "BreakoutSequence"), exact(DEFAULT, "BreakoutSequence")];
pub const FILE_EXPLORER_RESTRICTIONS: Rule = &[
    exact(RS5, "FileExplorerNamespaceRestrictions"),
    exact(DEFAULT, "FileExplorerNamespaceRestrictions"),
];
pub const ALLOWED_NAMESPACE: Rule = &[exact(RS5, "AllowedNamespace"), exact(V3, "AllowedNamespace")];
pub const ALLOW_REMOVABLE_DRIVES: Rule = &[
    exact(V3, "AllowRemovableDrives"),
    exact(RS5, "AllowRemovableDrives"),
];
pub const NO_RESTRICTION: Rule = &[exact(V3, "NoRestriction"), exact(RS5, "NoRestriction")];
pub const START_PINS: Rule = &[exact(V5, "StartPins")];
pub const TASKBAR_LAYOUT: Rule = &[exact(V5, "TaskbarLayout")];

// Attributes.
pub const ID: Rule = &[plain("Id")];
pub const APP_USER_MODEL_ID: Rule = &[plain("AppUserModelId")];
pub const DESKTOP_APP_PATH: Rule = &[plain("DesktopAppPath")];
pub const CLASSIC_APP_PATH: Rule = &[exact(V4, "ClassicAppPath"), plain("ClassicAppPath")];
pub const CLASSIC_APP_ARGUMENTS: Rule = &[
    exact(V4, "ClassicAppArguments"),
    plain("ClassicAppArguments"),
];
pub const AUTO_LAUNCH: Rule = &[exact(RS5, "AutoLaunch"), plain("AutoLaunch")];
pub const AUTO_LAUNCH_ARGUMENTS: Rule = &[
    exact(RS5, "AutoLaunchArguments"),
    plain("AutoLaunchArguments"),
];
pub const DISPLAY_NAME: Rule = &[exact(RS5, "DisplayName"), plain("DisplayName")];
pub const SHOW_TASKBAR: Rule = &[plain("ShowTaskbar")];
pub const TYPE: Rule = &[plain("Type")];
pub const NAME: Rule = &[plain("Name")];
pub const KEY: Rule = &[plain("Key")];

fn log_fallback(rule: Rule, index: usize) {
    if index > 0 {
        debug!(
            local = rule[index].local,
            ns = ?rule[index].ns,
            "matched fallback candidate"
        );
    }
}

impl XmlElement {
    /// First attribute value matching the rule, trying candidates in order.
    pub fn attr(&self, rule: Rule) -> Option<&str> {
        rule.iter().enumerate().find_map(|(index, candidate)| {
            let found = self
                .attributes
                .iter()
                .find(|a| a.local == candidate.local && candidate.ns.matches(&a.ns))?;
            log_fallback(rule, index);
            Some(found.value.as_str())
        })
    }

    /// First child matching the rule, trying candidates in order.
    pub fn child(&self, rule: Rule) -> Option<&XmlElement> {
        rule.iter().enumerate().find_map(|(index, candidate)| {
            let found = self.children.iter().find(|c| matches_candidate(c, candidate))?;
            log_fallback(rule, index);
            Some(found)
        })
    }

    /// All children matching any candidate of the rule, in document order.
    pub fn children_matching(&self, rule: Rule) -> impl Iterator<Item = &XmlElement> {
        self.children
            .iter()
            .filter(move |c| rule.iter().any(|candidate| matches_candidate(c, candidate)))
    }

    pub fn matches(&self, rule: Rule) -> bool {
        rule.iter().any(|candidate| matches_candidate(self, candidate))
    }
}

fn matches_candidate(element: &XmlElement, candidate: &Candidate) -> bool {
    element.local == candidate.local && candidate.ns.matches(&element.ns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tree::parse;

    #[test]
    fn primary_namespace_wins_over_fallback() {
        let doc = format!(
            r#"<App xmlns:rs5="{RS5}" AutoLaunch="false" rs5:AutoLaunch="true"/>"#
        );
        let app = parse(&doc).unwrap();
        assert_eq!(app.attr(AUTO_LAUNCH), Some("true"));
    }

    #[test]
    fn unqualified_spelling_is_accepted() {
        let app = parse(r#"<App AutoLaunchArguments="--foo"/>"#).unwrap();
        assert_eq!(app.attr(AUTO_LAUNCH_ARGUMENTS), Some("--foo"));
        assert!(app.matches(APP));
    }

    #[test]
    fn unrelated_namespace_is_ignored() {
        let doc = r#"<App xmlns:x="urn:other" x:AutoLaunch="true"/>"#;
        let app = parse(doc).unwrap();
        assert_eq!(app.attr(AUTO_LAUNCH), None);
    }

    #[test]
    fn children_found_in_either_generation() {
        let doc = format!(
            r#"<Configs xmlns="{DEFAULT}" xmlns:v3="{V3}"><GlobalProfile Id="a"/></Configs>"#
        );
        let configs = parse(&doc).unwrap();
        assert_eq!(configs.child(GLOBAL_PROFILE).and_then(|g| g.attr(ID)), Some("a"));
    }
}
