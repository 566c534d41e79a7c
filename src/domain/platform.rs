//! Platform domain types
//!
//! A [`Platform`] is one build target; a [`PlatformMask`] is the set of
//! targets a catalog entry ships on.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{AddressableError, Result};

/// A build target platform
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Windows,
    Macos,
    Linux,
    Webgl,
}

bitflags! {
    /// Set of platforms an entry is available on
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PlatformMask: u32 {
        const ANDROID = 1 << 0;
        const IOS = 1 << 1;
        const WINDOWS = 1 << 2;
        const MACOS = 1 << 3;
        const LINUX = 1 << 4;
        const WEBGL = 1 << 5;
        const MOBILE = Self::ANDROID.bits() | Self::IOS.bits();
        const STANDALONE = Self::WINDOWS.bits() | Self::MACOS.bits() | Self::LINUX.bits();
    }
}

impl Default for PlatformMask {
    fn default() -> Self {
        Self::all()
    }
}

impl Platform {
    /// All known platforms, in declaration order
    pub const ALL: [Platform; 6] = [
        Platform::Android,
        Platform::Ios,
        Platform::Windows,
        Platform::Macos,
        Platform::Linux,
        Platform::Webgl,
    ];

    /// The single-bit mask for this platform
    pub fn mask(self) -> PlatformMask {
        match self {
            Platform::Android => PlatformMask::ANDROID,
            Platform::Ios => PlatformMask::IOS,
            Platform::Windows => PlatformMask::WINDOWS,
            Platform::Macos => PlatformMask::MACOS,
            Platform::Linux => PlatformMask::LINUX,
            Platform::Webgl => PlatformMask::WEBGL,
        }
    }

    /// Lowercase identifier used in file names and configuration
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Windows => "windows",
            Platform::Macos => "macos",
            Platform::Linux => "linux",
            Platform::Webgl => "webgl",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AddressableError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == lowered)
            .ok_or_else(|| AddressableError::ConfigInvalid {
                message: format!(
                    "Unknown platform '{s}'. Supported: android, ios, windows, macos, linux, webgl"
                ),
            })
    }
}

impl PlatformMask {
    /// Check whether the mask includes `platform`
    pub fn targets(self, platform: Platform) -> bool {
        self.contains(platform.mask())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_display_and_parse() {
        for platform in Platform::ALL {
            let parsed: Platform = platform.to_string().parse().unwrap();
            assert_eq!(parsed, platform);
        }
        assert_eq!("Android".parse::<Platform>().unwrap(), Platform::Android);
        assert!("dreamcast".parse::<Platform>().is_err());
    }

    #[test]
    fn test_mask_targets() {
        let mask = PlatformMask::MOBILE;
        assert!(mask.targets(Platform::Android));
        assert!(mask.targets(Platform::Ios));
        assert!(!mask.targets(Platform::Windows));
        assert!(PlatformMask::default().targets(Platform::Webgl));
    }

    #[test]
    fn test_mask_json_round_trip() {
        let mask = PlatformMask::ANDROID | PlatformMask::LINUX;
        let json = serde_json::to_string(&mask).unwrap();
        let back: PlatformMask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mask);
    }
}
