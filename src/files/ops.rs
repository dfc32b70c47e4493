//! Purpose: Create, copy, move and remove files and directories.
//! Exports: `create_file`, `copy`, `move_item`, `remove_item`.
//! Role: Thin, logged wrappers that attach the path to every failure.
//! Invariants: `create_file` never truncates an existing file.
//! Invariants: `move_item` falls back to copy + remove when rename crosses devices, for files and trees.
//! Invariants: Errors carry the path of the side that failed.
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::core::error::{Error, ErrorKind};

pub fn create_file(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| Error::io(err, "failed to create file", path))?;
    file.write_all(contents)
        .map_err(|err| Error::io(err, "failed to write file", path))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "created file");
    Ok(())
}

/// Copies a regular file. The destination must not already exist.
pub fn copy(from: &Path, to: &Path) -> Result<u64, Error> {
    let mut src = File::open(from).map_err(|err| Error::io(err, "failed to open copy source", from))?;
    let perms = src
        .metadata()
        .map_err(|err| Error::io(err, "failed to read copy source", from))?
        .permissions();
    let mut dst = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(to)
        .map_err(|err| Error::io(err, "failed to create copy destination", to))?;
    let bytes = io::copy(&mut src, &mut dst).map_err(|err| Error::io(err, "failed to copy", to))?;
    std::fs::set_permissions(to, perms)
        .map_err(|err| Error::io(err, "failed to set permissions", to))?;
    tracing::debug!(from = %from.display(), to = %to.display(), bytes, "copied file");
    Ok(bytes)
}

pub fn move_item(from: &Path, to: &Path) -> Result<(), Error> {
    if to.exists() {
        return Err(Error::new(ErrorKind::AlreadyExists)
            .with_message("move destination already exists")
            .with_path(to));
    }
    match std::fs::rename(from, to) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => copy_then_remove(from, to)?,
        Err(err) => return Err(Error::io(err, "failed to move", from)),
    }
    tracing::debug!(from = %from.display(), to = %to.display(), "moved item");
    Ok(())
}

/// The cross-device half of `move_item`: copy the file or tree, then remove the source.
pub(crate) fn copy_then_remove(from: &Path, to: &Path) -> Result<(), Error> {
    let meta = std::fs::symlink_metadata(from)
        .map_err(|err| Error::io(err, "failed to move", from))?;
    if meta.is_dir() {
        copy_tree(from, to)?;
    } else {
        copy(from, to)?;
    }
    remove_item(from)
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), Error> {
    for entry in walkdir::WalkDir::new(from) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(from).to_path_buf();
            Error::new(ErrorKind::Io)
                .with_message("failed to read directory")
                .with_path(path)
                .with_source(err)
        })?;
        let relative = entry.path().strip_prefix(from).map_err(|_| {
            Error::new(ErrorKind::Internal)
                .with_message("walked outside the source tree")
                .with_path(entry.path())
        })?;
        let target = to.join(relative);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            std::fs::create_dir(&target)
                .map_err(|err| Error::io(err, "failed to create directory", &target))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<(), Error> {
    let link = std::fs::read_link(from).map_err(|err| Error::io(err, "failed to read link", from))?;
    std::os::unix::fs::symlink(&link, to).map_err(|err| Error::io(err, "failed to create link", to))
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> Result<(), Error> {
    copy(from, to).map(|_| ())
}

pub fn remove_item(path: &Path) -> Result<(), Error> {
    let meta = std::fs::symlink_metadata(path)
        .map_err(|err| Error::io(err, "failed to remove", path))?;
    let result = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.map_err(|err| Error::io(err, "failed to remove", path))?;
    tracing::debug!(path = %path.display(), "removed item");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{copy, copy_then_remove, create_file, move_item, remove_item};
    use crate::core::error::ErrorKind;

    #[test]
    fn create_copy_move_remove_cycle() {
        let temp = tempfile::tempdir().expect("tempdir");
        let orig = temp.path().join("origfile.txt");
        let copied = temp.path().join("copyfile.txt");
        let moved = temp.path().join("movefile.txt");

        create_file(&orig, b"Hello World!").expect("create");
        assert_eq!(copy(&orig, &copied).expect("copy"), 12);
        move_item(&orig, &moved).expect("move");
        assert!(!orig.exists());
        assert_eq!(std::fs::read_to_string(&moved).expect("read"), "Hello World!");

        remove_item(&copied).expect("remove copy");
        remove_item(&moved).expect("remove moved");
        assert!(!copied.exists());
        assert!(!moved.exists());
    }

    #[test]
    fn create_refuses_to_clobber() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("exists.txt");
        create_file(&path, b"one").expect("create");
        let err = create_file(&path, b"two").expect_err("clobber");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "one");
    }

    #[test]
    fn missing_sources_are_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("missing.txt");
        let target = temp.path().join("target.txt");
        assert_eq!(copy(&missing, &target).expect_err("copy").kind(), ErrorKind::NotFound);
        assert_eq!(
            move_item(&missing, &target).expect_err("move").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(remove_item(&missing).expect_err("remove").kind(), ErrorKind::NotFound);
    }

    #[test]
    fn copy_reports_the_failing_side() {
        let temp = tempfile::tempdir().expect("tempdir");
        let src = temp.path().join("src.txt");
        std::fs::write(&src, "data").expect("write");
        let dst = temp.path().join("no-such-dir").join("dst.txt");
        let err = copy(&src, &dst).expect_err("missing parent");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.path(), Some(dst.as_path()));

        std::fs::write(temp.path().join("taken.txt"), "mine").expect("write");
        let err = copy(&src, &temp.path().join("taken.txt")).expect_err("exists");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("taken.txt")).expect("read"),
            "mine"
        );
    }

    #[test]
    fn copy_then_remove_moves_directory_trees() {
        let temp = tempfile::tempdir().expect("tempdir");
        let from = temp.path().join("tree");
        std::fs::create_dir_all(from.join("a/b")).expect("dirs");
        std::fs::write(from.join("top.txt"), "top").expect("write");
        std::fs::write(from.join("a/b/c.txt"), "c").expect("write");
        let to = temp.path().join("moved");

        copy_then_remove(&from, &to).expect("move tree");
        assert!(!from.exists());
        assert_eq!(std::fs::read_to_string(to.join("top.txt")).expect("read"), "top");
        assert_eq!(std::fs::read_to_string(to.join("a/b/c.txt")).expect("read"), "c");

        let file = temp.path().join("single.txt");
        std::fs::write(&file, "one").expect("write");
        let moved = temp.path().join("single-moved.txt");
        copy_then_remove(&file, &moved).expect("move file");
        assert!(!file.exists());
        assert_eq!(std::fs::read_to_string(&moved).expect("read"), "one");
    }

    #[test]
    fn remove_handles_directory_trees() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("tree");
        std::fs::create_dir_all(dir.join("a/b")).expect("dirs");
        std::fs::write(dir.join("a/b/c.txt"), "c").expect("write");
        remove_item(&dir).expect("remove");
        assert!(!dir.exists());
    }
}
