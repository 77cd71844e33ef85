//! Export artifacts: the policy document, the shortcut manifest that goes
//! with it, and the file name they are saved under.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::codec;
use crate::error::ExportError;
use crate::policy::{KioskMode, KioskPolicy, Pin};
use crate::validate::validate;

/// A shortcut the deployment script has to create before the policy applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShortcutEntry {
    pub name: String,
    pub target_path: String,
    pub arguments: String,
    pub working_directory: String,
    pub icon_location: String,
}

/// Everything written out on export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub xml: String,
    pub shortcuts: Vec<ShortcutEntry>,
    pub file_name: String,
}

/// Build the export artifact, refusing an invalid policy unless
/// `allow_invalid` is set.
pub fn prepare_export(policy: &KioskPolicy, allow_invalid: bool) -> Result<ExportArtifact, ExportError> {
    let errors = validate(policy);
    if !errors.is_empty() {
        if !allow_invalid {
            return Err(ExportError::Invalid(errors));
        }
        warn!(count = errors.len(), "exporting a policy that fails validation");
    }
    Ok(ExportArtifact {
        xml: codec::encode(policy),
        shortcuts: shortcut_manifest(policy),
        file_name: export_file_name(policy.config_name(), "xml"),
    })
}

/// Desktop-link pins that need a `.lnk` created for them. Pins pointing at an
/// existing system shortcut are skipped, and single mode has no pins at all.
pub fn shortcut_manifest(policy: &KioskPolicy) -> Vec<ShortcutEntry> {
    if policy.mode() == KioskMode::Single {
        return Vec::new();
    }
    policy
        .start_pins
        .iter()
        .chain(policy.taskbar_pins.iter())
        .filter_map(|pin| match pin {
            Pin::DesktopLink(link) if link.system_shortcut().is_none() => Some(ShortcutEntry {
                name: link.name.clone(),
                target_path: link.target.clone(),
                arguments: link.arguments.clone(),
                working_directory: link.working_dir.clone(),
                icon_location: link.icon_path.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// `AssignedAccess-<name>.<ext>`, with whitespace runs turned into hyphens and
/// characters Windows forbids in file names dropped.
pub fn export_file_name(config_name: &str, extension: &str) -> String {
    let name = config_name.trim();
    if name.is_empty() {
        return format!("AssignedAccessConfig.{extension}");
    }
    let sanitized: String = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect();
    format!("AssignedAccess-{sanitized}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{DesktopLink, Preset, SecondaryTile};

    #[test]
    fn file_name_is_sanitized() {
        assert_eq!(
            export_file_name("  Front  Desk: Lobby/1 ", "xml"),
            "AssignedAccess-Front-Desk-Lobby1.xml"
        );
        assert_eq!(export_file_name("", "ps1"), "AssignedAccessConfig.ps1");
        assert_eq!(export_file_name("   ", "xml"), "AssignedAccessConfig.xml");
    }

    #[test]
    fn invalid_policy_is_refused() {
        let draft = KioskPolicy::new();
        match prepare_export(&draft, false) {
            Err(ExportError::Invalid(errors)) => assert!(!errors.is_empty()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn override_exports_anyway() {
        let draft = KioskPolicy::new();
        let artifact = prepare_export(&draft, true).unwrap();
        assert!(artifact.xml.starts_with("<?xml"));
        assert_eq!(artifact.file_name, "AssignedAccessConfig.xml");
    }

    #[test]
    fn valid_preset_exports() {
        let mut policy = Preset::MultiApp.build().unwrap();
        policy.set_config_name("Lobby Kiosk");
        let artifact = prepare_export(&policy, false).unwrap();
        assert_eq!(artifact.file_name, "AssignedAccess-Lobby-Kiosk.xml");
        assert!(artifact.xml.contains("<AllAppsList>"));
    }

    #[test]
    fn manifest_lists_only_links_that_need_creating() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Multi);
        let mut link = DesktopLink::new("Point of Sale", r"C:\Apps\pos.exe");
        link.arguments = "--lane 3".into();
        link.working_dir = r"C:\Apps".into();
        policy.add_start_pin(Pin::DesktopLink(link)).unwrap();

        let mut existing = DesktopLink::new("Notepad", r"C:\Windows\notepad.exe");
        existing.system_shortcut_path =
            Some(r"%APPDATA%\Microsoft\Windows\Start Menu\Programs\Notepad.lnk".into());
        policy.add_start_pin(Pin::DesktopLink(existing)).unwrap();
        policy
            .add_start_pin(Pin::SecondaryTile(SecondaryTile::new("Portal", "https://p.local")))
            .unwrap();
        policy.add_start_pin(Pin::packaged("Calc", "Calc!App")).unwrap();

        let manifest = shortcut_manifest(&policy);
        assert_eq!(
            manifest,
            vec![ShortcutEntry {
                name: "Point of Sale".into(),
                target_path: r"C:\Apps\pos.exe".into(),
                arguments: "--lane 3".into(),
                working_directory: r"C:\Apps".into(),
                icon_location: String::new(),
            }]
        );

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json[0]["TargetPath"], r"C:\Apps\pos.exe");
        assert_eq!(json[0]["IconLocation"], "");
    }

    #[test]
    fn single_mode_has_no_shortcuts() {
        let mut policy = KioskPolicy::new();
        policy
            .add_start_pin(Pin::DesktopLink(DesktopLink::new("X", r"C:\x.exe")))
            .unwrap();
        assert!(shortcut_manifest(&policy).is_empty());
    }
}
