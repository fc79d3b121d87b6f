//! Bootstrap
//!
//! Resolves where the native extension lives, loads it once and keeps the
//! handle for the rest of the process.

use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::config::BootstrapConfig;
use crate::loader::{DylibLoader, LoadError, ModuleLoader, NativeModule};
use crate::location::bootstrap_dir;
use crate::platform::{artifact_name, host_platform};

/// Bootstrap failure
///
/// Loader failures are carried as-is: `Display` and `source()` are those of
/// the loader's own error.
#[derive(Debug, Error)]
pub enum BootstrapError<E: std::error::Error + Send + Sync + 'static> {
    #[error("Failed to resolve bootstrap location: {0}")]
    Locate(#[source] io::Error),

    #[error(transparent)]
    Load(E),
}

impl<E: std::error::Error + Send + Sync + 'static> BootstrapError<E> {
    /// The loader's error, if the failure came from the loader
    pub fn load_error(&self) -> Option<&E> {
        match self {
            BootstrapError::Load(e) => Some(e),
            BootstrapError::Locate(_) => None,
        }
    }

    /// Take the loader's error out of the bootstrap error
    pub fn into_load_error(self) -> Option<E> {
        match self {
            BootstrapError::Load(e) => Some(e),
            BootstrapError::Locate(_) => None,
        }
    }
}

/// Join a base directory with the artifact name for `platform`.
///
/// The file is not checked for existence.
pub fn artifact_path(base_dir: &Path, platform: &str) -> PathBuf {
    base_dir.join(artifact_name(platform))
}

/// One-shot loader configuration.
///
/// Without overrides the artifact is looked up next to the bootstrap unit,
/// using the host's platform identifier.
#[derive(Debug, Clone, Default)]
pub struct Bootstrap {
    base_dir: Option<PathBuf>,
    platform: Option<String>,
}

impl Bootstrap {
    /// Create a bootstrap with no overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bootstrap from a loaded configuration
    pub fn from_config(config: &BootstrapConfig) -> Self {
        Self {
            base_dir: config.bootstrap.lib_dir.clone(),
            platform: config.bootstrap.platform.clone(),
        }
    }

    /// Look for the artifact in `dir` instead of the bootstrap directory
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Use `platform` instead of the host's identifier
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Directory the artifact is expected in
    pub fn base_dir(&self) -> io::Result<PathBuf> {
        match &self.base_dir {
            Some(dir) => Ok(dir.clone()),
            None => bootstrap_dir(),
        }
    }

    /// Platform identifier used for artifact selection
    pub fn platform(&self) -> &str {
        self.platform.as_deref().unwrap_or(host_platform())
    }

    /// Full path of the artifact to load
    pub fn artifact_path(&self) -> io::Result<PathBuf> {
        let base = self.base_dir()?;
        let path = artifact_path(&base, self.platform());
        log::debug!(
            "native artifact for platform '{}': {}",
            self.platform(),
            path.display()
        );
        Ok(path)
    }

    /// Resolve the artifact path and hand it to `loader`.
    ///
    /// The loader is called exactly once, and its result is returned
    /// without modification.
    pub fn load<L: ModuleLoader>(&self, loader: &L) -> Result<L::Module, BootstrapError<L::Error>> {
        let path = self.artifact_path().map_err(BootstrapError::Locate)?;
        loader.load_module(&path).map_err(BootstrapError::Load)
    }
}

/// Slot holding a module handle loaded at most once.
///
/// Concurrent callers of [`ModuleCell::get_or_load`] block on a single
/// initialisation. A failed load leaves the slot empty.
#[derive(Debug)]
pub struct ModuleCell<M> {
    module: OnceCell<M>,
}

impl<M> ModuleCell<M> {
    /// Create an empty slot
    pub const fn new() -> Self {
        Self {
            module: OnceCell::new(),
        }
    }

    /// The loaded module, if any
    pub fn get(&self) -> Option<&M> {
        self.module.get()
    }

    /// Return the loaded module, running `bootstrap` with `loader` if the
    /// slot is still empty.
    pub fn get_or_load<L>(
        &self,
        bootstrap: &Bootstrap,
        loader: &L,
    ) -> Result<&M, BootstrapError<L::Error>>
    where
        L: ModuleLoader<Module = M>,
    {
        self.module.get_or_try_init(|| bootstrap.load(loader))
    }
}

impl<M> Default for ModuleCell<M> {
    fn default() -> Self {
        Self::new()
    }
}

static LIB: ModuleCell<NativeModule> = ModuleCell::new();

/// Load `MllmFFIExtension` from the bootstrap directory.
///
/// The first successful call loads the library; later calls return the
/// same handle. The library stays loaded until the process exits.
pub fn init() -> Result<&'static NativeModule, BootstrapError<LoadError>> {
    LIB.get_or_load(&Bootstrap::new(), &DylibLoader)
}

/// The process-wide handle, if [`init`] has succeeded.
pub fn lib() -> Option<&'static NativeModule> {
    LIB.get()
}
