//! The Start pin list, embedded as a compact JSON document.
//!
//! `{"pinnedList":[{"packagedAppId":…},{"desktopAppLink":…},{"secondaryTile":{…}}]}`

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::policy::{
    generated_link_path, DesktopLink, Pin, PinList, SecondaryTile, EDGE_APP_ID,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartPinsDocument<T> {
    pinned_list: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum PinEntry {
    PackagedAppId(String),
    DesktopAppLink(String),
    SecondaryTile(TileEntry),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TileEntry {
    #[serde(default)]
    tile_id: String,
    #[serde(default)]
    arguments: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    packaged_app_id: String,
}

/// Packaged pins and tiles without an app id are written as a shortcut named
/// after the pin.
fn entry_for(pin: &Pin) -> PinEntry {
    match pin {
        Pin::PackagedApp(p) if p.packaged_app_id.trim().is_empty() => {
            PinEntry::DesktopAppLink(generated_link_path(&p.name))
        }
        Pin::SecondaryTile(tile) if tile.packaged_app_id.trim().is_empty() => {
            PinEntry::DesktopAppLink(generated_link_path(&tile.name))
        }
        Pin::PackagedApp(p) => PinEntry::PackagedAppId(p.packaged_app_id.clone()),
        Pin::DesktopLink(link) => PinEntry::DesktopAppLink(link.link_path()),
        Pin::SecondaryTile(tile) => PinEntry::SecondaryTile(TileEntry {
            tile_id: tile.effective_tile_id(),
            arguments: tile.launch_arguments.clone(),
            display_name: tile.name.clone(),
            packaged_app_id: tile.packaged_app_id.clone(),
        }),
    }
}

/// Serialize the Start pins; `None` when there are none.
pub fn encode(pins: &PinList) -> Option<String> {
    if pins.is_empty() {
        return None;
    }
    let document = StartPinsDocument {
        pinned_list: pins.iter().map(entry_for).collect(),
    };
    // Only strings and plain structs: serialization cannot fail.
    serde_json::to_string(&document).ok()
}

/// Name a desktop link after its shortcut file, and keep the path as a
/// system shortcut unless it is the one generated for that name.
pub(crate) fn desktop_link_from_path(path: &str) -> DesktopLink {
    let file = path.rsplit(['\\', '/']).next().unwrap_or(path);
    let name = match file.len().checked_sub(4) {
        Some(cut) if file.is_char_boundary(cut) && file[cut..].eq_ignore_ascii_case(".lnk") => {
            &file[..cut]
        }
        _ => file,
    };
    let mut link = DesktopLink::new(name, "");
    if path != generated_link_path(name) {
        link.system_shortcut_path = Some(path.to_string());
    }
    link
}

fn pin_from_entry(entry: PinEntry) -> Pin {
    match entry {
        PinEntry::PackagedAppId(id) => Pin::packaged(id.clone(), id),
        PinEntry::DesktopAppLink(path) => Pin::DesktopLink(desktop_link_from_path(&path)),
        PinEntry::SecondaryTile(tile) => Pin::SecondaryTile(SecondaryTile {
            name: tile.display_name,
            packaged_app_id: if tile.packaged_app_id.is_empty() {
                EDGE_APP_ID.to_string()
            } else {
                tile.packaged_app_id
            },
            launch_arguments: tile.arguments,
            tile_id: tile.tile_id,
        }),
    }
}

/// Parse an embedded Start pin document. Unreadable documents yield no pins;
/// unknown entries are skipped.
pub fn decode(text: &str) -> PinList {
    let mut pins = PinList::new();
    let document: StartPinsDocument<serde_json::Value> = match serde_json::from_str(text.trim()) {
        Ok(document) => document,
        Err(e) => {
            warn!(error = %e, "unreadable start pin document, ignoring pins");
            return pins;
        }
    };
    for value in document.pinned_list {
        match serde_json::from_value::<PinEntry>(value) {
            Ok(entry) => pins.push_renaming(pin_from_entry(entry)),
            Err(e) => debug!(error = %e, "skipping unrecognized start pin entry"),
        }
    }
    pins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_each_pin_kind() {
        let mut pins = PinList::new();
        pins.add(Pin::packaged("Calculator", "Microsoft.WindowsCalculator_8wekyb3d8bbwe!App"))
            .unwrap();
        pins.add(Pin::DesktopLink(DesktopLink::new("Notepad", r"C:\Windows\notepad.exe")))
            .unwrap();
        pins.add(Pin::SecondaryTile(SecondaryTile::new("Intranet", "https://intranet.local")))
            .unwrap();
        let json = encode(&pins).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let list = value["pinnedList"].as_array().unwrap();
        assert_eq!(list[0]["packagedAppId"], "Microsoft.WindowsCalculator_8wekyb3d8bbwe!App");
        assert_eq!(
            list[1]["desktopAppLink"],
            r"%ALLUSERSPROFILE%\Microsoft\Windows\Start Menu\Programs\Notepad.lnk"
        );
        assert_eq!(list[2]["secondaryTile"]["tileId"], "MSEdge._pin_Intranet");
        assert_eq!(list[2]["secondaryTile"]["arguments"], "https://intranet.local");
        assert_eq!(list[2]["secondaryTile"]["displayName"], "Intranet");
    }

    #[test]
    fn pins_without_app_id_become_shortcuts() {
        let mut pins = PinList::new();
        pins.add(Pin::packaged("Scanner", "  ")).unwrap();
        let mut tile = SecondaryTile::new("Menu", "https://menu.local");
        tile.packaged_app_id = String::new();
        pins.add(Pin::SecondaryTile(tile)).unwrap();
        let json = encode(&pins).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let list = value["pinnedList"].as_array().unwrap();
        assert_eq!(list[0]["desktopAppLink"], generated_link_path("Scanner"));
        assert_eq!(list[1]["desktopAppLink"], generated_link_path("Menu"));
        assert!(list[1].get("secondaryTile").is_none());
    }

    #[test]
    fn empty_list_is_omitted() {
        assert_eq!(encode(&PinList::new()), None);
    }

    #[test]
    fn desktop_link_names_come_from_the_shortcut() {
        let generated = desktop_link_from_path(
            r"%ALLUSERSPROFILE%\Microsoft\Windows\Start Menu\Programs\Notepad.lnk",
        );
        assert_eq!(generated.name, "Notepad");
        assert_eq!(generated.system_shortcut_path, None);

        let system =
            desktop_link_from_path(r"%APPDATA%\Microsoft\Windows\Start Menu\Programs\Tools\Paint.LNK");
        assert_eq!(system.name, "Paint");
        assert!(system.system_shortcut_path.is_some());
    }

    #[test]
    fn decode_renames_collisions_and_skips_unknown_entries() {
        let pins = decode(
            r#"{"pinnedList":[{"packagedAppId":"A!App"},{"futurePin":1},{"packagedAppId":"a!app"}]}"#,
        );
        let names: Vec<&str> = pins.iter().map(Pin::name).collect();
        assert_eq!(names, vec!["A!App", "a!app (2)"]);
    }

    #[test]
    fn unreadable_document_yields_no_pins() {
        assert!(decode("{not json").is_empty());
    }
}
