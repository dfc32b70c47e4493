//! Purpose: Report existence, type and access rights for a path.
//! Exports: `Inspection`, `inspect`.
//! Role: Read-only probe; a missing path is a normal result, not an error.
//! Notes: Answers are advisory and may be stale by the time they are acted on.
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Inspection {
    pub exists: bool,
    pub is_dir: bool,
    pub readable: bool,
    pub writable: bool,
    pub executable: bool,
    pub deletable: bool,
    pub len: u64,
    pub modified: Option<String>,
}

pub fn inspect(path: &Path) -> Inspection {
    let Ok(meta) = std::fs::metadata(path) else {
        return Inspection::default();
    };
    let deletable = path
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                access::writable(Path::new("."))
            } else {
                access::writable(parent)
            }
        })
        .unwrap_or(false);
    Inspection {
        exists: true,
        is_dir: meta.is_dir(),
        readable: access::readable(path),
        writable: access::writable(path),
        executable: access::executable(path),
        deletable,
        len: meta.len(),
        modified: meta.modified().ok().and_then(format_system_time),
    }
}

pub(crate) fn format_system_time(time: SystemTime) -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = time.duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

#[cfg(unix)]
mod access {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    fn check(path: &Path, mode: libc::c_int) -> bool {
        let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
            return false;
        };
        // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
        unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
    }

    pub(super) fn readable(path: &Path) -> bool {
        check(path, libc::R_OK)
    }

    pub(super) fn writable(path: &Path) -> bool {
        check(path, libc::W_OK)
    }

    pub(super) fn executable(path: &Path) -> bool {
        check(path, libc::X_OK)
    }
}

#[cfg(not(unix))]
mod access {
    use std::path::Path;

    pub(super) fn readable(path: &Path) -> bool {
        std::fs::metadata(path).is_ok()
    }

    pub(super) fn writable(path: &Path) -> bool {
        std::fs::metadata(path).is_ok_and(|meta| !meta.permissions().readonly())
    }

    pub(super) fn executable(path: &Path) -> bool {
        let is_dir = std::fs::metadata(path).is_ok_and(|meta| meta.is_dir());
        is_dir
            || path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext, "exe" | "bat" | "cmd"))
    }
}

#[cfg(test)]
mod tests {
    use super::inspect;

    #[test]
    fn missing_path_reports_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let report = inspect(&temp.path().join("nope.txt"));
        assert!(!report.exists);
        assert!(!report.readable);
        assert!(!report.deletable);
        assert_eq!(report.modified, None);
    }

    #[test]
    fn directory_and_file_flags() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = inspect(temp.path());
        assert!(dir.exists);
        assert!(dir.is_dir);
        assert!(dir.readable);
        assert!(dir.executable);

        let file = temp.path().join("hello.txt");
        std::fs::write(&file, "Hello World!").expect("write");
        let report = inspect(&file);
        assert!(report.exists);
        assert!(!report.is_dir);
        assert!(report.readable);
        assert!(report.deletable);
        assert_eq!(report.len, 12);
        assert!(report.modified.is_some());
    }
}
