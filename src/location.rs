//! Bootstrap Location
//!
//! Finds the directory holding the object file that contains this crate,
//! which is where the native extension is expected to sit.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

/// Absolute, symlink-resolved directory of the bootstrap unit.
///
/// On Unix the containing object is looked up with `dladdr`, so a `cdylib`
/// build resolves to its own shared object rather than the host executable.
/// When the code lives in the main program, or the lookup yields nothing
/// usable, the current executable is used, and any I/O error from that step
/// is returned unchanged.
pub fn bootstrap_dir() -> io::Result<PathBuf> {
    let unit = bootstrap_unit()?;
    parent_dir(&unit)
}

/// Absolute path of the object file containing this code.
pub fn bootstrap_unit() -> io::Result<PathBuf> {
    #[cfg(unix)]
    {
        let argv0 = std::env::args_os().next();
        if let Some(path) = containing_object() {
            if is_shared_object_path(&path, argv0.as_deref()) {
                match path.canonicalize() {
                    Ok(resolved) => return Ok(resolved),
                    Err(e) => log::debug!(
                        "cannot resolve '{}' ({}), using current executable",
                        path.display(),
                        e
                    ),
                }
            }
        }
    }

    std::env::current_exe()?.canonicalize()
}

fn parent_dir(unit: &Path) -> io::Result<PathBuf> {
    unit.parent().map(Path::to_path_buf).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("'{}' has no parent directory", unit.display()),
        )
    })
}

/// Whether a `dladdr` file name names a loaded shared object.
///
/// For code in the main program glibc reports `argv[0]`, which the caller
/// controls and may be relative. Such names never identify the image.
#[cfg_attr(not(unix), allow(dead_code))]
fn is_shared_object_path(reported: &Path, argv0: Option<&OsStr>) -> bool {
    reported.is_absolute() && argv0.map_or(true, |arg| reported.as_os_str() != arg)
}

/// Path of the object that `dladdr` reports for this function.
#[cfg(unix)]
fn containing_object() -> Option<PathBuf> {
    use std::ffi::CStr;
    use std::os::unix::ffi::OsStrExt;

    let anchor = containing_object as fn() -> Option<PathBuf>;
    let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };

    // Safety: `info` is a valid out-pointer and the address is a function in
    // this image. dladdr only reads loader metadata.
    let found = unsafe { libc::dladdr(anchor as *const libc::c_void, &mut info) };
    if found == 0 || info.dli_fname.is_null() {
        return None;
    }

    // Safety: dli_fname is a NUL-terminated string owned by the dynamic
    // loader and lives as long as the object stays mapped.
    let bytes = unsafe { CStr::from_ptr(info.dli_fname) }.to_bytes();
    if bytes.is_empty() {
        return None;
    }

    let path = PathBuf::from(OsStr::from_bytes(bytes));
    log::debug!("bootstrap unit reported by dladdr: {}", path.display());
    Some(path)
}
