//! Hostname resolution, done once at startup.

use std::path::Path;

use crate::collector::traits::FileSystem;

/// Returns the host name used to scope store keys.
///
/// Order: explicit override, `<proc>/sys/kernel/hostname`, `/etc/hostname`,
/// `$HOSTNAME`, then `localhost`.
pub fn resolve_hostname<F: FileSystem>(fs: &F, proc_path: &str, explicit: Option<&str>) -> String {
    if let Some(name) = explicit.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    let kernel = format!("{}/sys/kernel/hostname", proc_path);
    for path in [kernel.as_str(), "/etc/hostname"] {
        if let Ok(content) = fs.read_to_string(Path::new(path)) {
            let name = content.trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }

    std::env::var("HOSTNAME")
        .ok()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MockFs;

    #[test]
    fn test_explicit_name_wins() {
        let fs = MockFs::typical_host();
        assert_eq!(resolve_hostname(&fs, "/proc", Some(" host1 ")), "host1");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let fs = MockFs::typical_host();
        assert_eq!(resolve_hostname(&fs, "/proc", Some("  ")), "pi-node");
    }

    #[test]
    fn test_kernel_hostname() {
        let fs = MockFs::typical_host();
        assert_eq!(resolve_hostname(&fs, "/proc", None), "pi-node");
    }

    #[test]
    fn test_etc_hostname_fallback() {
        let fs = MockFs::new();
        fs.add_file("/etc/hostname", "garage-pi\n");
        assert_eq!(resolve_hostname(&fs, "/proc", None), "garage-pi");
    }
}
