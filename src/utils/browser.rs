//! Open a URL in the default browser.
//!
//! Native desktops only: Windows, macOS, Linux.

use std::process::Command;

/// Open `url` in the default browser.
///
/// Returns `true` if the launcher command could be started:
/// - **Linux**: `xdg-open`
/// - **macOS**: `open`
/// - **Windows**: `cmd /c start`
pub fn open_browser(url: &str) -> bool {
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .args(["/c", "start", "", url])
            .spawn()
            .is_ok()
    }

    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).spawn().is_ok()
    }

    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open").arg(url).spawn().is_ok()
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        let _ = url;
        false
    }
}

/// Browser URL of a gist from its id.
pub fn gist_web_url(gist_id: &str) -> String {
    format!("https://gist.github.com/{gist_id}")
}
