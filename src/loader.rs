//! Native Module Loader
//!
//! The loader seam used by the bootstrap, and its default implementation on
//! top of libloading.

use std::ffi::CString;
use std::fmt;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use thiserror::Error;

/// Errors raised while opening a native module or resolving its symbols
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to load library '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Symbol '{name}' not found in '{}': {source}", path.display())]
    Symbol {
        name: String,
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Invalid symbol name: {0}")]
    InvalidSymbol(String),
}

/// Something that turns a path to a compiled shared library into a module
/// handle.
///
/// The bootstrap passes exactly the path it constructed and hands back
/// whatever the loader returns, success or error.
pub trait ModuleLoader {
    /// Handle produced by a successful load
    type Module;
    /// Failure reported by the loader
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the library at `path`
    fn load_module(&self, path: &Path) -> Result<Self::Module, Self::Error>;
}

/// Loader backed by the platform dynamic linker
#[derive(Debug, Clone, Copy, Default)]
pub struct DylibLoader;

impl ModuleLoader for DylibLoader {
    type Module = NativeModule;
    type Error = LoadError;

    fn load_module(&self, path: &Path) -> Result<NativeModule, LoadError> {
        NativeModule::open(path)
    }
}

/// A native library loaded into the process
pub struct NativeModule {
    /// Path the library was opened from
    path: PathBuf,
    /// The loaded library handle
    library: Library,
}

impl NativeModule {
    /// Open the library at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();

        // Safety: loading a library runs its initialisers. The artifact is
        // trusted because it ships next to this crate.
        let library = unsafe { Library::new(&path) }.map_err(|source| LoadError::Open {
            path: path.clone(),
            source,
        })?;

        log::info!("loaded native module {}", path.display());
        Ok(Self { path, library })
    }

    /// Path the library was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the library exports `name`
    pub fn has_symbol(&self, name: &str) -> bool {
        // Safety: the symbol is only looked up, never dereferenced or called.
        unsafe { self.symbol::<*const ()>(name) }.is_ok()
    }

    /// Look up an exported symbol
    ///
    /// # Safety
    ///
    /// `T` must match the actual type of the exported item. Calling through
    /// a mistyped function pointer is undefined behaviour.
    pub unsafe fn symbol<T>(&self, name: &str) -> Result<Symbol<'_, T>, LoadError> {
        let c_name = CString::new(name)
            .map_err(|_| LoadError::InvalidSymbol(name.to_string()))?;

        unsafe { self.library.get(c_name.as_bytes_with_nul()) }.map_err(|source| {
            LoadError::Symbol {
                name: name.to_string(),
                path: self.path.clone(),
                source,
            }
        })
    }
}

impl fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeModule")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
