//! Application-wide constants
//!
//! This module contains the magic numbers and string literals used throughout
//! the plugin, providing a single source of truth for constant values.

/// Configuration paths and filenames
pub mod paths {
    /// Host application directory name under the per-OS application-data dir
    pub const APP_DIR: &str = "electron-spirit";

    /// Host-managed API discovery file (read-only to this plugin)
    pub const HOST_CONFIG_FILENAME: &str = "api.json";

    /// Plugin-owned settings file
    pub const SETTINGS_FILENAME: &str = "plugin-settings.json";
}

/// UI element category keys
pub mod elements {
    /// Category key for the inline-content demo element
    pub const BASIC_KEY: &str = "ex-1";

    /// Category key for the embedded-view demo element
    pub const VIEW_KEY: &str = "ex-2";

    /// Number of live elements required before the demo script proceeds
    /// to the visibility-toggle segment
    pub const REQUIRED_COUNT: u32 = 2;
}

/// Demo script timing (wall-clock sleeps between steps, in seconds)
pub mod timing {
    /// Delay after the element gate releases, before hiding the view element
    pub const BEFORE_HIDE_SECS: u64 = 2;

    /// Delay between hiding and re-showing the view element
    pub const BEFORE_SHOW_SECS: u64 = 1;

    /// Delay after executing the script snippet, before removing the hook
    pub const BEFORE_UNHOOK_SECS: u64 = 5;

    /// Delay after the notification, before logging completion
    pub const BEFORE_DONE_SECS: u64 = 1;
}

/// Default settings values
/// Used when the settings file is absent or a key fails schema validation
pub mod defaults {
    /// Default input hook key combination
    pub const HOOK_KEY: &str = "ctrl+alt+d";

    /// Style rule scoped to the inline-content element category
    pub const CSS: &str = ".es-basic { position: relative; width: 100%; height: 100%; \
        padding: 10px; background-color: rgba(250, 250, 250, 200); \
        border: 1px solid black; text-align: center; box-sizing: border-box; \
        overflow: auto; }";

    /// Default body for the inline-content element
    pub const BASIC_CONTENT: &str = "<div class='es-basic'>Hello</div>";

    /// Default page loaded by the embedded-view element
    pub const VIEW_URL: &str = "https://example.com";

    /// Default placement of the inline-content element (x, y, w, h)
    pub const BASIC_BOUND: (i32, i32, u32, u32) = (200, 200, 100, 50);

    /// Default placement of the embedded-view element (x, y, w, h)
    pub const VIEW_BOUND: (i32, i32, u32, u32) = (300, 300, 300, 300);
}

/// Demo script payloads
pub mod demo {
    /// Script snippet executed inside the embedded-view element
    pub const SNIPPET: &str =
        "document.body.insertAdjacentHTML('beforeend', '<p>hello from spirit-plugin</p>')";

    /// Notification title shown near the end of the script
    pub const NOTIFY_TITLE: &str = "spirit-plugin";

    /// Notification body text
    pub const NOTIFY_TEXT: &str = "Demo sequence finished";

    /// Liveness probe payload emitted right after connecting
    pub const ECHO_PROBE: &str = "Hello World!";
}
