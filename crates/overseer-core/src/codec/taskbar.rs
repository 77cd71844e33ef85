//! The taskbar pin list, embedded as a layout modification XML fragment.

use tracing::{debug, warn};

use super::escape::push_escaped;
use super::namespaces::{FULL_DEFAULT_LAYOUT, LAYOUT_MODIFICATION, START_LAYOUT, TASKBAR_LAYOUT};
use super::start_pins::desktop_link_from_path;
use super::tree;
use crate::policy::{Pin, PinList};

const ENTRY_INDENT: &str = "                ";

/// Serialize the taskbar pins. Site tiles are skipped; `None` when nothing
/// is left.
pub fn encode(pins: &PinList) -> Option<String> {
    let entries: Vec<String> = pins
        .iter()
        .filter_map(|pin| {
            let (attribute, value) = match pin {
                Pin::DesktopLink(link) => ("DesktopApplicationLinkPath", link.link_path()),
                Pin::PackagedApp(p) if !p.packaged_app_id.is_empty() => {
                    ("DesktopApplicationID", p.packaged_app_id.clone())
                }
                Pin::PackagedApp(_) => return None,
                Pin::SecondaryTile(tile) => {
                    debug!(name = %tile.name, "site tiles cannot be pinned to the taskbar, skipping");
                    return None;
                }
            };
            let mut entry = format!("<taskbar:DesktopApp {attribute}=\"");
            push_escaped(&mut entry, &value);
            entry.push_str("\"/>");
            Some(entry)
        })
        .collect();
    if entries.is_empty() {
        return None;
    }

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<LayoutModificationTemplate\n");
    out.push_str(&format!("    xmlns=\"{LAYOUT_MODIFICATION}\"\n"));
    out.push_str(&format!("    xmlns:defaultlayout=\"{FULL_DEFAULT_LAYOUT}\"\n"));
    out.push_str(&format!("    xmlns:start=\"{START_LAYOUT}\"\n"));
    out.push_str(&format!("    xmlns:taskbar=\"{TASKBAR_LAYOUT}\"\n"));
    out.push_str("    Version=\"1\">\n");
    out.push_str("    <CustomTaskbarLayoutCollection>\n");
    out.push_str("        <defaultlayout:TaskbarLayout>\n");
    out.push_str("            <taskbar:TaskbarPinList>\n");
    for entry in entries {
        out.push_str(ENTRY_INDENT);
        out.push_str(&entry);
        out.push('\n');
    }
    out.push_str("            </taskbar:TaskbarPinList>\n");
    out.push_str("        </defaultlayout:TaskbarLayout>\n");
    out.push_str("    </CustomTaskbarLayoutCollection>\n");
    out.push_str("</LayoutModificationTemplate>");
    Some(out)
}

/// Parse an embedded taskbar layout. Unreadable fragments yield no pins.
pub fn decode(text: &str) -> PinList {
    let mut pins = PinList::new();
    let root = match tree::parse(text.trim()) {
        Ok(root) => root,
        Err(e) => {
            warn!(error = %e, "unreadable taskbar layout, ignoring pins");
            return pins;
        }
    };
    for element in root.descendants() {
        if element.local != "DesktopApp" {
            continue;
        }
        let attribute = |name: &str| {
            element
                .attributes
                .iter()
                .find(|a| a.local == name)
                .map(|a| a.value.as_str())
        };
        if let Some(path) = attribute("DesktopApplicationLinkPath") {
            pins.push_renaming(Pin::DesktopLink(desktop_link_from_path(path)));
        } else if let Some(id) = attribute("DesktopApplicationID") {
            pins.push_renaming(Pin::packaged(id, id));
        } else {
            debug!("taskbar entry without a target, skipping");
        }
    }
    pins
}
