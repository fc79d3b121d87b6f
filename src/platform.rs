//! Platform Artifact Selection
//!
//! Maps a platform identifier to the file name of the native extension
//! built for that platform.

use std::fmt;

macro_rules! artifact_stem {
    () => {
        "MllmFFIExtension"
    };
}

/// Base name shared by every build of the native extension.
pub const ARTIFACT_STEM: &str = artifact_stem!();

/// Identifier prefix for Windows hosts.
pub const WINDOWS_PREFIX: &str = "win32";

/// Identifier prefix for macOS hosts.
pub const DARWIN_PREFIX: &str = "darwin";

/// Shared-library flavour of a native artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Windows dynamic-link library
    Dll,
    /// Mach-O dynamic library
    Dylib,
    /// ELF shared object, assumed for every other platform
    So,
}

impl ArtifactKind {
    /// Select the artifact kind for a platform identifier.
    ///
    /// Prefixes are checked in order: `win32`, then `darwin`. Anything else,
    /// including an empty identifier, falls through to [`ArtifactKind::So`].
    pub fn from_platform(platform: &str) -> Self {
        if platform.starts_with(WINDOWS_PREFIX) {
            ArtifactKind::Dll
        } else if platform.starts_with(DARWIN_PREFIX) {
            ArtifactKind::Dylib
        } else {
            ArtifactKind::So
        }
    }

    /// File extension without the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Dll => "dll",
            ArtifactKind::Dylib => "dylib",
            ArtifactKind::So => "so",
        }
    }

    /// Full artifact file name
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Dll => concat!(artifact_stem!(), ".dll"),
            ArtifactKind::Dylib => concat!(artifact_stem!(), ".dylib"),
            ArtifactKind::So => concat!(artifact_stem!(), ".so"),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Artifact file name for a platform identifier.
pub fn artifact_name(platform: &str) -> &'static str {
    ArtifactKind::from_platform(platform).file_name()
}

/// Platform identifier of the running process.
///
/// Windows and macOS report `win32` and `darwin`; other systems report
/// their target OS name unchanged.
pub fn host_platform() -> &'static str {
    match std::env::consts::OS {
        "windows" => "win32",
        "macos" => "darwin",
        other => other,
    }
}
