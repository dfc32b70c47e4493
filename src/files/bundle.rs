//! Purpose: Locate read-only resources shipped alongside the program.
//! Exports: `Bundle`.
//! Role: Resolves `(name, ext)` against an ordered list of resource directories.
//! Invariants: Search order is explicit dir, env var, `<exe dir>/resources`, crate `resources/`.
//! Invariants: A missing resource is `None`; only read failures are errors.
use std::path::{Path, PathBuf};

use crate::core::error::{Error, ErrorKind};

pub const RESOURCES_ENV: &str = "PLAYGROUNDS_RESOURCES";

#[derive(Clone, Debug)]
pub struct Bundle {
    search: Vec<PathBuf>,
}

impl Bundle {
    pub fn new(search: Vec<PathBuf>) -> Self {
        Self { search }
    }

    /// The default search path, with `explicit` (e.g. `--resources`) first.
    pub fn main(explicit: Option<&Path>) -> Self {
        let mut search = Vec::new();
        if let Some(dir) = explicit {
            search.push(dir.to_path_buf());
        }
        if let Some(dir) = std::env::var_os(RESOURCES_ENV).filter(|v| !v.is_empty()) {
            search.push(PathBuf::from(dir));
        }
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|parent| parent.join("resources")))
        {
            search.push(dir);
        }
        search.push(Path::new(env!("CARGO_MANIFEST_DIR")).join("resources"));
        Self { search }
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search
    }

    pub fn path_for_resource(&self, name: &str, ext: &str) -> Option<PathBuf> {
        let file_name = if ext.is_empty() {
            name.to_string()
        } else {
            format!("{name}.{ext}")
        };
        self.search
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
    }

    pub fn read(&self, name: &str, ext: &str) -> Result<Vec<u8>, Error> {
        let path = self.require(name, ext)?;
        std::fs::read(&path).map_err(|err| Error::io(err, "failed to read resource", &path))
    }

    pub fn read_string(&self, name: &str, ext: &str) -> Result<String, Error> {
        let path = self.require(name, ext)?;
        std::fs::read_to_string(&path)
            .map_err(|err| Error::io(err, "failed to read resource", &path))
    }

    fn require(&self, name: &str, ext: &str) -> Result<PathBuf, Error> {
        self.path_for_resource(name, ext).ok_or_else(|| {
            Error::new(ErrorKind::NotFound)
                .with_message(format!("resource {name}.{ext} not found"))
                .with_hint(format!(
                    "Pass --resources <dir> or set {RESOURCES_ENV} to a directory containing it."
                ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Bundle;
    use crate::core::error::ErrorKind;
    use std::path::Path;

    #[test]
    fn earlier_directories_win() {
        let first = tempfile::tempdir().expect("tempdir");
        let second = tempfile::tempdir().expect("tempdir");
        std::fs::write(first.path().join("a.txt"), "first").expect("write");
        std::fs::write(second.path().join("a.txt"), "second").expect("write");
        std::fs::write(second.path().join("b.txt"), "only second").expect("write");

        let bundle = Bundle::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        assert_eq!(bundle.read_string("a", "txt").expect("a"), "first");
        assert_eq!(bundle.read_string("b", "txt").expect("b"), "only second");
        assert!(bundle.path_for_resource("c", "txt").is_none());
        assert_eq!(
            bundle.read("c", "txt").expect_err("missing").kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn explicit_dir_is_searched_first() {
        let explicit = tempfile::tempdir().expect("tempdir");
        let bundle = Bundle::main(Some(explicit.path()));
        let search = bundle.search_path();
        assert_eq!(search.first().map(|p| p.as_path()), Some(explicit.path()));
        assert_eq!(
            search.last(),
            Some(&Path::new(env!("CARGO_MANIFEST_DIR")).join("resources"))
        );
    }

    #[test]
    fn crate_resources_are_always_searched() {
        let bundle = Bundle::main(None);
        let text = bundle.read_string("BundledFile", "txt").expect("bundled file");
        assert!(!text.trim().is_empty());
        assert!(bundle.path_for_resource("test", "json").is_some());
    }
}
