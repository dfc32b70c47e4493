//! Purpose: List a directory and walk a directory tree.
//! Exports: `ListOptions`, `list_dir`, `Walker`.
//! Role: Enumeration with deterministic order and caller-controlled error handling.
//! Invariants: Entries are sorted by file name within each directory.
//! Invariants: Symlinked directories are yielded but never descended into.
//! Notes: Tree traversal is `walkdir`; this module adds hidden-entry filtering and the error callback.
use std::path::{Path, PathBuf};

use crate::core::error::{Error, ErrorKind, io_error_kind};

#[derive(Clone, Copy, Debug, Default)]
pub struct ListOptions {
    pub skip_hidden: bool,
}

pub fn list_dir(dir: &Path, options: ListOptions) -> Result<Vec<PathBuf>, Error> {
    read_sorted(dir, options.skip_hidden)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn read_sorted(dir: &Path, skip_hidden: bool) -> Result<Vec<PathBuf>, Error> {
    let entries =
        std::fs::read_dir(dir).map_err(|err| Error::io(err, "failed to read directory", dir))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read directory entry")
                .with_path(dir)
                .with_source(err)
        })?;
        let path = entry.path();
        if skip_hidden && is_hidden(&path) {
            continue;
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

type ErrorHandler<'a> = Box<dyn FnMut(&Path, &Error) -> bool + 'a>;
type Entries<'a> = Box<dyn Iterator<Item = walkdir::Result<walkdir::DirEntry>> + 'a>;

/// Depth-first, pre-order iterator over every path below `root`.
///
/// Unreadable directories are reported to the error handler, which returns
/// `true` to keep walking or `false` to end the walk. Without a handler the
/// error is logged and the walk continues.
pub struct Walker<'a> {
    root: PathBuf,
    skip_hidden: bool,
    on_error: Option<ErrorHandler<'a>>,
    entries: Option<Entries<'a>>,
    stopped: bool,
}

impl<'a> Walker<'a> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            skip_hidden: false,
            on_error: None,
            entries: None,
            stopped: false,
        }
    }

    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&Path, &Error) -> bool + 'a,
    {
        self.on_error = Some(Box::new(handler));
        self
    }

    fn entries(&mut self) -> &mut Entries<'a> {
        let root = &self.root;
        let skip_hidden = self.skip_hidden;
        self.entries.get_or_insert_with(|| {
            let walk = walkdir::WalkDir::new(root)
                .min_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(move |entry| {
                    entry.depth() == 0 || !(skip_hidden && is_hidden(entry.path()))
                });
            let entries: Entries<'a> = Box::new(walk);
            entries
        })
    }

    fn report(&mut self, err: walkdir::Error) {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        let kind = err.io_error().map(io_error_kind).unwrap_or(ErrorKind::Io);
        let err = Error::new(kind)
            .with_message("failed to read directory")
            .with_path(&path)
            .with_source(err);
        let keep_going = match self.on_error.as_mut() {
            Some(handler) => handler(&path, &err),
            None => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable directory");
                true
            }
        };
        if !keep_going {
            self.stopped = true;
        }
    }
}

impl Iterator for Walker<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        while !self.stopped {
            match self.entries().next()? {
                Ok(entry) => return Some(entry.into_path()),
                Err(err) => self.report(err),
            }
        }
        None
    }
}
