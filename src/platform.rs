//! Platform detection for selecting the correct bottle

use crate::error::Result;

/// Detect the OS flavor used to index the bottle file map.
///
/// macOS hosts produce `<arch>_<codename>` (Homebrew spells the Apple
/// Silicon arch "arm64", not "aarch64"); Linux hosts are always the literal
/// `x86_64_linux`. Anything else is unsupported.
pub fn os_flavor() -> Result<String> {
    #[cfg(target_os = "macos")]
    {
        let arch = match std::env::consts::ARCH {
            "aarch64" => "arm64",
            other => other,
        };
        let version = macos_version()?;
        Ok(format!("{}_{}", arch, macos_codename(&version)))
    }

    #[cfg(target_os = "linux")]
    {
        Ok("x86_64_linux".to_string())
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        Err(crate::error::BrError::UnsupportedPlatform)
    }
}

#[cfg(target_os = "macos")]
fn macos_version() -> Result<String> {
    use anyhow::Context;

    let output = std::process::Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .context("Failed to run sw_vers")?;

    let version = String::from_utf8(output.stdout)
        .context("Invalid UTF-8 in sw_vers output")?
        .trim()
        .to_string();

    Ok(version)
}

/// Map a macOS product version to the codename Homebrew uses in bottle tags.
/// Versions newer or older than the map fall back to `ventura`.
#[allow(dead_code)]
fn macos_codename(version: &str) -> &'static str {
    // 10.x needs the minor component; everything since Big Sur is major-only.
    if version == "10.15" || version.starts_with("10.15.") {
        return "catalina";
    }

    let major: u32 = version
        .split('.')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    match major {
        26 => "tahoe",
        15 => "sequoia",
        14 => "sonoma",
        13 => "ventura",
        12 => "monterey",
        11 => "big_sur",
        _ => "ventura",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macos_codenames() {
        assert_eq!(macos_codename("26.0"), "tahoe");
        assert_eq!(macos_codename("15.1"), "sequoia");
        assert_eq!(macos_codename("14.0"), "sonoma");
        assert_eq!(macos_codename("13.2"), "ventura");
        assert_eq!(macos_codename("12.0"), "monterey");
        assert_eq!(macos_codename("11.7"), "big_sur");
        assert_eq!(macos_codename("10.15"), "catalina");
        assert_eq!(macos_codename("10.15.7"), "catalina");
    }

    #[test]
    fn test_unknown_version_falls_back() {
        assert_eq!(macos_codename("99.0"), "ventura");
        assert_eq!(macos_codename("garbage"), "ventura");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_flavor_is_literal() {
        assert_eq!(os_flavor().unwrap(), "x86_64_linux");
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_flavor_has_arch_prefix() {
        let flavor = os_flavor().unwrap();
        assert!(flavor.starts_with("arm64_") || flavor.starts_with("x86_64_"));
    }
}
