// Host platform identification
// Used only to decide which plugins are discoverable

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported host operating systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    Linux,
    MacOS,
    FreeBSD,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Windows,
        Platform::Linux,
        Platform::MacOS,
        Platform::FreeBSD,
    ];

    /// Platform this binary was built for
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "freebsd") {
            Platform::FreeBSD
        } else {
            Platform::Linux
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::MacOS => "macOS",
            Platform::FreeBSD => "FreeBSD",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_os = "linux")]
    fn test_current_linux() {
        assert_eq!(Platform::current(), Platform::Linux);
    }

    #[test]
    fn test_current_is_listed() {
        assert!(Platform::ALL.contains(&Platform::current()));
    }
}
