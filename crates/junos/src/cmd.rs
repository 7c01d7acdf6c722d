//! Junos CLI command strings.

/// Operational command prefix for configuration display.
pub const SHOW_CONFIGURATION: &str = "show configuration";

/// Pipe turning hierarchical output into relative `set` lines.
pub const DISPLAY_SET_RELATIVE: &str = "| display set relative";

/// `show configuration <path> | display set relative`
pub fn show_config(path: &str) -> String {
    format!("{SHOW_CONFIGURATION} {path} {DISPLAY_SET_RELATIVE}")
}

/// The configuration path of a command built by [`show_config`].
pub fn show_config_path(cmd: &str) -> Option<&str> {
    cmd.trim()
        .strip_prefix(SHOW_CONFIGURATION)?
        .strip_suffix(DISPLAY_SET_RELATIVE)
        .map(str::trim)
        .filter(|path| !path.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_config_roundtrip() {
        let cmd = show_config("applications application app1");
        assert_eq!(
            cmd,
            "show configuration applications application app1 | display set relative"
        );
        assert_eq!(show_config_path(&cmd), Some("applications application app1"));
    }

    #[test]
    fn test_rejects_other_commands() {
        assert_eq!(show_config_path("show version"), None);
        assert_eq!(show_config_path("show configuration | display set relative"), None);
        assert_eq!(show_config_path("show configuration system"), None);
    }
}
