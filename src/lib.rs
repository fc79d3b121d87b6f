//! mllm-ffi - Native Extension Bootstrap
//!
//! Loads the precompiled `MllmFFIExtension` shared library that ships next
//! to this crate and keeps a single handle to it for the whole process.
//! Higher-level bindings call into the library through that handle.
//!
//! # Artifact Layout
//!
//! | Platform              | File name                |
//! |-----------------------|--------------------------|
//! | Windows (`win32*`)    | `MllmFFIExtension.dll`   |
//! | macOS (`darwin*`)     | `MllmFFIExtension.dylib` |
//! | anything else         | `MllmFFIExtension.so`    |
//!
//! # Flow
//!
//! ```text
//! bootstrap_dir()          directory of the object containing this crate
//!       │
//!       ▼
//! artifact_name(platform)  prefix match on the platform identifier
//!       │
//!       ▼
//! artifact_path()          base_dir.join(name), no existence check
//!       │
//!       ▼
//! ModuleLoader             libloading by default
//!       │
//!       ▼
//! ModuleCell               one-shot, never unloaded
//! ```
//!
//! # Example
//!
//! ```no_run
//! let module = mllm_ffi::init()?;
//! println!("loaded {}", module.path().display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(clippy::all)]

pub mod bootstrap;
pub mod config;
pub mod loader;
pub mod location;
pub mod platform;

// Re-export commonly used types
pub use bootstrap::{artifact_path, init, lib, Bootstrap, BootstrapError, ModuleCell};
pub use config::{BootstrapConfig, ConfigError};
pub use loader::{DylibLoader, LoadError, ModuleLoader, NativeModule};
pub use location::bootstrap_dir;
pub use platform::{artifact_name, host_platform, ArtifactKind};
