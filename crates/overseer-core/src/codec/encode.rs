//! Policy → assigned access document.

use super::escape::{push_cdata, push_escaped};
use super::launch::launch_arguments;
use super::namespaces::{DEFAULT, PREFIXED, ROOT_ELEMENT};
use super::{start_pins, taskbar};
use crate::policy::{
    is_placeholder_id, Account, AllowedApp, AppKind, BrowserKind, FileExplorerAccess, KioskPolicy,
    SingleApp, DEFAULT_DISPLAY_NAME, EDGE_PATH, PLACEHOLDER_PROFILE_ID,
};

const PROFILE_BODY: &str = "            ";
const APP_ENTRY: &str = "                    ";

/// Append ` name="value"` with the value escaped.
fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    push_escaped(out, value);
    out.push('"');
}

/// Render `policy` as an assigned access document.
///
/// Always succeeds, valid or not, so callers can preview work in progress.
pub fn encode(policy: &KioskPolicy) -> String {
    let id = if is_placeholder_id(policy.id()) {
        PLACEHOLDER_PROFILE_ID
    } else {
        policy.id()
    };

    let mut out = String::with_capacity(2048);
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push('<');
    out.push_str(ROOT_ELEMENT);
    out.push('\n');
    out.push_str(&format!("    xmlns=\"{DEFAULT}\""));
    for (prefix, uri) in PREFIXED {
        out.push_str(&format!("\n    xmlns:{prefix}=\"{uri}\""));
    }
    out.push_str(">\n");

    out.push_str("    <Profiles>\n");
    out.push_str("        <Profile");
    push_attr(&mut out, "Id", id);
    out.push_str(">\n");
    if policy.mode().uses_app_list() {
        push_app_list_profile(&mut out, policy);
    } else {
        push_single_app_profile(&mut out, policy);
    }
    out.push_str("        </Profile>\n");
    out.push_str("    </Profiles>\n");

    push_configs(&mut out, policy.account(), id);

    out.push_str("</");
    out.push_str(ROOT_ELEMENT);
    out.push('>');
    out
}

fn push_single_app_profile(out: &mut String, policy: &KioskPolicy) {
    out.push_str(PROFILE_BODY);
    out.push_str("<KioskModeApp");
    match &policy.single_app {
        SingleApp::Browser(launch) => {
            push_attr(out, "v4:ClassicAppPath", EDGE_PATH);
            let args = launch_arguments(Some(BrowserKind::Edge), launch);
            push_attr(out, "v4:ClassicAppArguments", &args);
        }
        SingleApp::Packaged { app_id } => push_attr(out, "AppUserModelId", app_id),
        SingleApp::Desktop { path, arguments } => {
            push_attr(out, "v4:ClassicAppPath", path);
            if !arguments.is_empty() {
                push_attr(out, "v4:ClassicAppArguments", arguments);
            }
        }
    }
    out.push_str("/>\n");

    if let Some(breakout) = &policy.restrictions.breakout {
        out.push_str(PROFILE_BODY);
        out.push_str("<v4:BreakoutSequence");
        push_attr(out, "Key", &breakout.to_string());
        out.push_str("/>\n");
    }
}

/// Arguments carried by the auto-launch entry, if any.
fn auto_launch_arguments(policy: &KioskPolicy, app: &AllowedApp) -> Option<String> {
    let args = match app.browser() {
        Some(browser) => launch_arguments(Some(browser), &policy.auto_launch.browser),
        None if app.kind == AppKind::DesktopPath => policy.auto_launch.arguments.trim().to_string(),
        None => String::new(),
    };
    (!args.is_empty()).then_some(args)
}

fn push_app_list_profile(out: &mut String, policy: &KioskPolicy) {
    out.push_str(PROFILE_BODY);
    out.push_str("<AllAppsList>\n");
    out.push_str("                <AllowedApps>\n");
    for (index, app) in policy.apps.iter().enumerate() {
        out.push_str(APP_ENTRY);
        out.push_str("<App");
        match app.kind {
            AppKind::PackagedApp => push_attr(out, "AppUserModelId", &app.value),
            AppKind::DesktopPath => push_attr(out, "DesktopAppPath", &app.value),
        }
        if policy.apps.auto_launch() == Some(index) {
            out.push_str(" rs5:AutoLaunch=\"true\"");
            if let Some(args) = auto_launch_arguments(policy, app) {
                push_attr(out, "rs5:AutoLaunchArguments", &args);
            }
        }
        out.push_str("/>\n");
    }
    out.push_str("                </AllowedApps>\n");
    out.push_str(PROFILE_BODY);
    out.push_str("</AllAppsList>\n");

    push_file_explorer_restrictions(out, policy.restrictions.file_access);

    if let Some(json) = start_pins::encode(&policy.start_pins) {
        out.push_str(PROFILE_BODY);
        out.push_str("<v5:StartPins>");
        push_cdata(out, &json);
        out.push_str("</v5:StartPins>\n");
    }

    out.push_str(PROFILE_BODY);
    out.push_str(&format!(
        "<Taskbar ShowTaskbar=\"{}\"/>\n",
        policy.restrictions.show_taskbar
    ));

    if let Some(layout) = taskbar::encode(&policy.taskbar_pins) {
        out.push_str(PROFILE_BODY);
        out.push_str("<v5:TaskbarLayout>");
        push_cdata(out, &layout);
        out.push_str("</v5:TaskbarLayout>\n");
    }
}

fn push_file_explorer_restrictions(out: &mut String, access: FileExplorerAccess) {
    if access == FileExplorerAccess::None {
        return;
    }
    out.push_str(PROFILE_BODY);
    out.push_str("<rs5:FileExplorerNamespaceRestrictions>\n");
    if access == FileExplorerAccess::Unrestricted {
        out.push_str("                <v3:NoRestriction/>\n");
    }
    if access.allows_downloads() {
        out.push_str("                <rs5:AllowedNamespace Name=\"Downloads\"/>\n");
    }
    if access.allows_removable() {
        out.push_str("                <v3:AllowRemovableDrives/>\n");
    }
    out.push_str(PROFILE_BODY);
    out.push_str("</rs5:FileExplorerNamespaceRestrictions>\n");
}

fn push_configs(out: &mut String, account: &Account, id: &str) {
    out.push_str("    <Configs>\n");
    if let Account::GlobalProfile = account {
        out.push_str("        <v3:GlobalProfile");
        push_attr(out, "Id", id);
        out.push_str("/>\n");
    } else {
        out.push_str("        <Config>\n");
        out.push_str(PROFILE_BODY);
        match account {
            Account::AutoLogon { display_name } => {
                let name = if display_name.is_empty() {
                    DEFAULT_DISPLAY_NAME
                } else {
                    display_name.as_str()
                };
                out.push_str("<AutoLogonAccount");
                push_attr(out, "rs5:DisplayName", name);
                out.push_str("/>\n");
            }
            Account::ExistingUser { account_name } => {
                out.push_str("<Account>");
                push_escaped(out, account_name);
                out.push_str("</Account>\n");
            }
            Account::UserGroup {
                group_type,
                group_name,
            } => {
                out.push_str("<UserGroup");
                push_attr(out, "Type", group_type.as_str());
                push_attr(out, "Name", group_name);
                out.push_str("/>\n");
            }
            Account::GlobalProfile => {}
        }
        out.push_str(PROFILE_BODY);
        out.push_str("<DefaultProfile");
        push_attr(out, "Id", id);
        out.push_str("/>\n");
        out.push_str("        </Config>\n");
    }
    out.push_str("    </Configs>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{
        AllowedApp, BreakoutSequence, BrowserLaunch, EdgeKioskType, GroupType, KioskMode,
        LaunchSource,
    };
    use indoc::indoc;

    const ID: &str = "{6f1b0a3e-2c4d-4e5f-8a9b-0c1d2e3f4a5b}";

    fn single(app: SingleApp) -> KioskPolicy {
        let mut policy = KioskPolicy::new();
        policy.set_id(ID);
        policy.single_app = app;
        policy
    }

    #[test]
    fn single_edge_document_layout() {
        let policy = single(SingleApp::Browser(
            BrowserLaunch::url("https://example.com", EdgeKioskType::Fullscreen)
                .with_idle_timeout(5),
        ));
        let expected = indoc! {r#"
            <?xml version="1.0" encoding="utf-8"?>
            <AssignedAccessConfiguration
                xmlns="http://schemas.microsoft.com/AssignedAccess/2017/config"
                xmlns:rs5="http://schemas.microsoft.com/AssignedAccess/201810/config"
                xmlns:v3="http://schemas.microsoft.com/AssignedAccess/2020/config"
                xmlns:v4="http://schemas.microsoft.com/AssignedAccess/2021/config"
                xmlns:v5="http://schemas.microsoft.com/AssignedAccess/2022/config">
                <Profiles>
                    <Profile Id="{6f1b0a3e-2c4d-4e5f-8a9b-0c1d2e3f4a5b}">
                        <KioskModeApp v4:ClassicAppPath="%ProgramFiles(x86)%\Microsoft\Edge\Application\msedge.exe" v4:ClassicAppArguments="--kiosk https://example.com --edge-kiosk-type=fullscreen --no-first-run --kiosk-idle-timeout-minutes=5"/>
                    </Profile>
                </Profiles>
                <Configs>
                    <Config>
                        <AutoLogonAccount rs5:DisplayName="Kiosk"/>
                        <DefaultProfile Id="{6f1b0a3e-2c4d-4e5f-8a9b-0c1d2e3f4a5b}"/>
                    </Config>
                </Configs>
            </AssignedAccessConfiguration>"#};
        assert_eq!(encode(&policy), expected);
    }

    #[test]
    fn empty_id_uses_placeholder() {
        let mut policy = KioskPolicy::new();
        policy.set_id("");
        assert!(encode(&policy).contains(r#"<Profile Id="{00000000-0000-0000-0000-000000000000}">"#));
    }

    #[test]
    fn desktop_single_app_omits_empty_arguments_and_adds_breakout() {
        let mut policy = single(SingleApp::Desktop {
            path: r"C:\Apps\viewer.exe".to_string(),
            arguments: String::new(),
        });
        policy.restrictions.breakout = Some(BreakoutSequence::new(true, true, false, "K"));
        let xml = encode(&policy);
        assert!(xml.contains(r#"<KioskModeApp v4:ClassicAppPath="C:\Apps\viewer.exe"/>"#));
        assert!(xml.contains(r#"<v4:BreakoutSequence Key="Ctrl+Alt+K"/>"#));
    }

    #[test]
    fn file_source_becomes_file_url() {
        let policy = single(SingleApp::Browser(BrowserLaunch {
            source: LaunchSource::File(r"C:\Kiosk\home page.html".to_string()),
            kiosk_type: EdgeKioskType::PublicBrowsing,
            idle_timeout_minutes: 0,
        }));
        assert!(encode(&policy).contains(
            "--kiosk file:///C:/Kiosk/home%20page.html --edge-kiosk-type=public-browsing --no-first-run\""
        ));
    }

    #[test]
    fn second_app_carries_auto_launch_and_literal_arguments() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Multi);
        policy.add_app(AllowedApp::packaged("Microsoft.WindowsCalculator_8wekyb3d8bbwe!App"));
        policy.add_app(AllowedApp::desktop(r"C:\Tools\kiosk.exe"));
        policy.apps.set_auto_launch(Some(1)).unwrap();
        policy.auto_launch.arguments = "--foo".to_string();
        let xml = encode(&policy);
        assert!(xml.contains(
            r#"<App AppUserModelId="Microsoft.WindowsCalculator_8wekyb3d8bbwe!App"/>"#
        ));
        assert!(xml.contains(
            r#"<App DesktopAppPath="C:\Tools\kiosk.exe" rs5:AutoLaunch="true" rs5:AutoLaunchArguments="--foo"/>"#
        ));
        assert!(xml.contains(r#"<Taskbar ShowTaskbar="true"/>"#));
    }

    #[test]
    fn restriction_block_shapes() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Multi);
        policy.restrictions.file_access = FileExplorerAccess::DownloadsAndRemovable;
        let xml = encode(&policy);
        assert!(xml.contains(concat!(
            "            <rs5:FileExplorerNamespaceRestrictions>\n",
            "                <rs5:AllowedNamespace Name=\"Downloads\"/>\n",
            "                <v3:AllowRemovableDrives/>\n",
            "            </rs5:FileExplorerNamespaceRestrictions>\n",
        )));

        policy.restrictions.file_access = FileExplorerAccess::None;
        assert!(!encode(&policy).contains("FileExplorerNamespaceRestrictions"));
    }

    #[test]
    fn group_and_global_accounts() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Restricted);
        policy
            .set_account(Account::group(GroupType::AzureActiveDirectoryGroup, "Kiosk <Users>"))
            .unwrap();
        assert!(encode(&policy).contains(
            r#"<UserGroup Type="AzureActiveDirectoryGroup" Name="Kiosk &lt;Users&gt;"/>"#
        ));

        policy.set_account(Account::GlobalProfile).unwrap();
        let xml = encode(&policy);
        assert!(xml.contains("<v3:GlobalProfile Id=\"{"));
        assert!(!xml.contains("<Config>"));
    }

    #[test]
    fn existing_account_name_is_escaped_text() {
        let mut policy = KioskPolicy::new();
        policy.set_account(Account::existing(r"CONTOSO\kiosk&co")).unwrap();
        assert!(encode(&policy).contains(r"<Account>CONTOSO\kiosk&amp;co</Account>"));
    }
}
