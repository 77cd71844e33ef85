//! Start menu and taskbar pins.

use serde::{Deserialize, Serialize};

use super::browser::{is_edge_app, EDGE_APP_ID};
use crate::error::PolicyError;

/// Folder generated shortcuts are created in.
pub const START_MENU_PROGRAMS: &str = r"%ALLUSERSPROFILE%\Microsoft\Windows\Start Menu\Programs";

/// A `.lnk` shortcut to a desktop executable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopLink {
    pub name: String,
    #[serde(default)]
    pub target: String,
    #[serde(default, rename = "args")]
    pub arguments: String,
    #[serde(default)]
    pub working_dir: String,
    #[serde(default)]
    pub icon_path: String,
    /// Existing shortcut to reference instead of creating one for `target`.
    #[serde(default, rename = "systemShortcut", skip_serializing_if = "Option::is_none")]
    pub system_shortcut_path: Option<String>,
}

impl DesktopLink {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// The system shortcut if one is set and non-blank.
    pub fn system_shortcut(&self) -> Option<&str> {
        self.system_shortcut_path
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// Path of the `.lnk` the pin references once deployed.
    pub fn link_path(&self) -> String {
        match self.system_shortcut() {
            Some(path) => path.to_string(),
            None => generated_link_path(&self.name),
        }
    }

    pub fn has_target(&self) -> bool {
        !self.target.trim().is_empty() || self.system_shortcut().is_some()
    }

    /// Launches Edge, directly or through a shortcut.
    pub fn is_edge_backed(&self) -> bool {
        if !self.target.is_empty() && is_edge_app(&self.target) {
            return true;
        }
        self.system_shortcut().is_some_and(|s| {
            let lower = s.to_ascii_lowercase();
            lower.contains("microsoft edge.lnk") || lower.contains(r"\microsoft\edge\application\")
        })
    }
}

/// Path of the shortcut created for a pin without a system shortcut.
pub fn generated_link_path(name: &str) -> String {
    format!(r"{START_MENU_PROGRAMS}\{name}.lnk")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagedAppPin {
    pub name: String,
    pub packaged_app_id: String,
}

/// A browser site tile. Start list only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryTile {
    pub name: String,
    #[serde(default = "default_tile_app_id")]
    pub packaged_app_id: String,
    /// URL the tile opens.
    #[serde(default, rename = "args")]
    pub launch_arguments: String,
    #[serde(default)]
    pub tile_id: String,
}

fn default_tile_app_id() -> String {
    EDGE_APP_ID.to_string()
}

impl SecondaryTile {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            packaged_app_id: default_tile_app_id(),
            launch_arguments: url.into(),
            tile_id: String::new(),
        }
    }

    /// Tile id, derived from the name when none was given.
    pub fn effective_tile_id(&self) -> String {
        if self.tile_id.trim().is_empty() {
            let compact: String = self
                .name
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect();
            format!("MSEdge._pin_{compact}")
        } else {
            self.tile_id.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pinType")]
pub enum Pin {
    #[serde(rename = "desktopAppLink")]
    DesktopLink(DesktopLink),
    #[serde(rename = "packagedAppId")]
    PackagedApp(PackagedAppPin),
    #[serde(rename = "secondaryTile")]
    SecondaryTile(SecondaryTile),
}

impl Pin {
    pub fn name(&self) -> &str {
        match self {
            Pin::DesktopLink(p) => &p.name,
            Pin::PackagedApp(p) => &p.name,
            Pin::SecondaryTile(p) => &p.name,
        }
    }

    pub fn set_name(&mut self, name: String) {
        match self {
            Pin::DesktopLink(p) => p.name = name,
            Pin::PackagedApp(p) => p.name = name,
            Pin::SecondaryTile(p) => p.name = name,
        }
    }

    pub fn packaged(name: impl Into<String>, app_id: impl Into<String>) -> Self {
        Pin::PackagedApp(PackagedAppPin {
            name: name.into(),
            packaged_app_id: app_id.into(),
        })
    }

    pub fn type_label(&self) -> &'static str {
        match self {
            Pin::DesktopLink(_) => "desktopAppLink",
            Pin::PackagedApp(_) => "packagedAppId",
            Pin::SecondaryTile(_) => "secondaryTile",
        }
    }
}

/// An ordered pin list whose names are unique, ignoring case.
///
/// Stored lists are rebuilt on load, renaming blank or colliding names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Pin>", into = "Vec<Pin>")]
pub struct PinList {
    pins: Vec<Pin>,
}

impl From<Vec<Pin>> for PinList {
    fn from(pins: Vec<Pin>) -> Self {
        let mut list = Self::new();
        for pin in pins {
            list.push_renaming(pin);
        }
        list
    }
}

impl From<PinList> for Vec<Pin> {
    fn from(list: PinList) -> Self {
        list.pins
    }
}

impl PinList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Pin] {
        &self.pins
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pin> {
        self.pins.iter()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pin> {
        self.pins.get(index)
    }

    pub fn find_by_name(&self, name: &str) -> Option<(usize, &Pin)> {
        self.pins
            .iter()
            .enumerate()
            .find(|(_, pin)| pin.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn find<P>(&self, mut predicate: P) -> Option<(usize, &Pin)>
    where
        P: FnMut(&Pin) -> bool,
    {
        self.pins.iter().enumerate().find(|(_, pin)| predicate(pin))
    }

    /// Append a pin. Rejects blank and duplicate names.
    pub fn add(&mut self, mut pin: Pin) -> Result<(), PolicyError> {
        let name = pin.name().trim().to_string();
        self.check_name(&name, None)?;
        pin.set_name(name);
        self.pins.push(pin);
        Ok(())
    }

    /// Replace the pin at `index`, re-checking name uniqueness against the others.
    pub fn replace(&mut self, index: usize, mut pin: Pin) -> Result<Pin, PolicyError> {
        self.check_index(index)?;
        let name = pin.name().trim().to_string();
        self.check_name(&name, Some(index))?;
        pin.set_name(name);
        Ok(std::mem::replace(&mut self.pins[index], pin))
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), PolicyError> {
        let mut pin = self
            .pins
            .get(index)
            .cloned()
            .ok_or_else(|| self.out_of_bounds(index))?;
        pin.set_name(name.to_string());
        self.replace(index, pin).map(|_| ())
    }

    pub fn remove(&mut self, index: usize) -> Result<Pin, PolicyError> {
        self.check_index(index)?;
        Ok(self.pins.remove(index))
    }

    pub fn move_pin(&mut self, from: usize, to: usize) -> Result<(), PolicyError> {
        self.check_index(from)?;
        self.check_index(to)?;
        let pin = self.pins.remove(from);
        self.pins.insert(to, pin);
        Ok(())
    }

    /// `base`, or `base (2)`, `base (3)`… whichever is free.
    pub fn unique_name(&self, base: &str) -> String {
        let trimmed = match base.trim() {
            "" => "Shortcut",
            other => other,
        };
        if self.find_by_name(trimmed).is_none() {
            return trimmed.to_string();
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{trimmed} ({counter})");
            if self.find_by_name(&candidate).is_none() {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Append a copy of the pin at `index` named `"<name> Copy"`; returns its position.
    pub fn duplicate(&mut self, index: usize) -> Result<usize, PolicyError> {
        let mut clone = self
            .pins
            .get(index)
            .cloned()
            .ok_or_else(|| self.out_of_bounds(index))?;
        let name = self.unique_name(&format!("{} Copy", clone.name()));
        clone.set_name(name);
        if let Pin::SecondaryTile(tile) = &mut clone {
            tile.tile_id.clear();
        }
        self.pins.push(clone);
        Ok(self.pins.len() - 1)
    }

    /// Append without the uniqueness check, renaming on collision. Used by
    /// importers, which must not drop entries.
    pub(crate) fn push_renaming(&mut self, mut pin: Pin) {
        let name = self.unique_name(pin.name());
        pin.set_name(name);
        self.pins.push(pin);
    }

    /// Keep only the pins matching `keep`; returns how many were dropped.
    pub(crate) fn retain<P>(&mut self, keep: P) -> usize
    where
        P: FnMut(&Pin) -> bool,
    {
        let before = self.pins.len();
        self.pins.retain(keep);
        before - self.pins.len()
    }

    fn check_name(&self, name: &str, exclude: Option<usize>) -> Result<(), PolicyError> {
        if name.is_empty() {
            return Err(PolicyError::EmptyPinName);
        }
        match self.find_by_name(name) {
            Some((i, _)) if Some(i) != exclude => Err(PolicyError::DuplicatePinName {
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), PolicyError> {
        if index < self.pins.len() {
            Ok(())
        } else {
            Err(self.out_of_bounds(index))
        }
    }

    fn out_of_bounds(&self, index: usize) -> PolicyError {
        PolicyError::OutOfBounds {
            collection: "pins",
            index,
            len: self.pins.len(),
        }
    }
}

impl<'a> IntoIterator for &'a PinList {
    type Item = &'a Pin;
    type IntoIter = std::slice::Iter<'a, Pin>;

    fn into_iter(self) -> Self::IntoIter {
        self.pins.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notepad() -> Pin {
        Pin::DesktopLink(DesktopLink::new("Notepad", r"C:\Windows\notepad.exe"))
    }

    #[test]
    fn stored_list_is_renamed_on_load() {
        let json = serde_json::json!([
            {"pinType": "packagedAppId", "name": "Calc", "packagedAppId": "Calc!App"},
            {"pinType": "packagedAppId", "name": " CALC ", "packagedAppId": "Calc!App"},
            {"pinType": "desktopAppLink", "name": "  ", "target": "C:\\a.exe"},
        ]);
        let pins: PinList = serde_json::from_value(json).unwrap();
        let names: Vec<&str> = pins.iter().map(Pin::name).collect();
        assert_eq!(names, vec!["Calc", "CALC (2)", "Shortcut"]);
    }

    #[test]
    fn duplicate_name_is_rejected_case_insensitively() {
        let mut pins = PinList::new();
        pins.add(notepad()).unwrap();
        let err = pins
            .add(Pin::packaged("NOTEPAD", "Microsoft.WindowsNotepad!App"))
            .unwrap_err();
        assert_eq!(
            err,
            PolicyError::DuplicatePinName {
                name: "NOTEPAD".to_string()
            }
        );
        assert_eq!(pins.len(), 1);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut pins = PinList::new();
        assert_eq!(
            pins.add(Pin::packaged("  ", "App!App")),
            Err(PolicyError::EmptyPinName)
        );
    }

    #[test]
    fn rename_to_existing_name_is_rejected() {
        let mut pins = PinList::new();
        pins.add(notepad()).unwrap();
        pins.add(Pin::packaged("Calculator", "Calc!App")).unwrap();
        assert!(pins.rename(1, "notepad").is_err());
        assert_eq!(pins.get(1).unwrap().name(), "Calculator");
        // Renaming a pin to its own name in another case is fine.
        pins.rename(0, "NotePad").unwrap();
        assert_eq!(pins.get(0).unwrap().name(), "NotePad");
    }

    #[test]
    fn unique_name_counts_up() {
        let mut pins = PinList::new();
        pins.add(notepad()).unwrap();
        assert_eq!(pins.unique_name("Notepad"), "Notepad (2)");
        pins.add(Pin::packaged("notepad (2)", "X!App")).unwrap();
        assert_eq!(pins.unique_name("Notepad"), "Notepad (3)");
        assert_eq!(pins.unique_name(""), "Shortcut");
    }

    #[test]
    fn duplicate_appends_copy_and_clears_tile_id() {
        let mut pins = PinList::new();
        let mut tile = SecondaryTile::new("Intranet", "https://intranet.local");
        tile.tile_id = "MSEdge._pin_Intranet".to_string();
        pins.add(Pin::SecondaryTile(tile)).unwrap();
        let index = pins.duplicate(0).unwrap();
        match pins.get(index).unwrap() {
            Pin::SecondaryTile(copy) => {
                assert_eq!(copy.name, "Intranet Copy");
                assert!(copy.tile_id.is_empty());
                assert_eq!(copy.launch_arguments, "https://intranet.local");
            }
            other => panic!("unexpected pin {other:?}"),
        }
    }

    #[test]
    fn move_pin_reorders() {
        let mut pins = PinList::new();
        pins.add(notepad()).unwrap();
        pins.add(Pin::packaged("Calculator", "Calc!App")).unwrap();
        pins.move_pin(1, 0).unwrap();
        assert_eq!(pins.get(0).unwrap().name(), "Calculator");
        assert!(pins.move_pin(0, 5).is_err());
    }

    #[test]
    fn link_path_prefers_system_shortcut() {
        let mut link = DesktopLink::new("Notepad", r"C:\Windows\notepad.exe");
        assert_eq!(
            link.link_path(),
            r"%ALLUSERSPROFILE%\Microsoft\Windows\Start Menu\Programs\Notepad.lnk"
        );
        link.system_shortcut_path = Some(
            r"%APPDATA%\Microsoft\Windows\Start Menu\Programs\Accessories\Notepad.lnk".to_string(),
        );
        assert!(link.link_path().starts_with("%APPDATA%"));
    }

    #[test]
    fn generated_tile_id_uses_alphanumerics() {
        let tile = SecondaryTile::new("Help Desk #1", "https://help.local");
        assert_eq!(tile.effective_tile_id(), "MSEdge._pin_HelpDesk1");
    }

    #[test]
    fn pin_json_uses_type_tag() {
        let json = serde_json::to_value(notepad()).unwrap();
        assert_eq!(json["pinType"], "desktopAppLink");
        assert_eq!(json["target"], r"C:\Windows\notepad.exe");
        assert!(json.get("systemShortcut").is_none());
    }
}
