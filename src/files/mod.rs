//! Purpose: The file-system playground and the helpers it demonstrates.
//! Exports: submodules plus `FilesTour` and `tour`.
//! Role: Runs paths, special dirs, inspection, listing, walking, file ops, temp and bundle steps.
//! Invariants: Every step's failure is recorded in the transcript and the tour moves on.
//! Invariants: Files the tour creates are removed before it returns; files it did not create are left alone.
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::core::error::Error;
use crate::transcript::Transcript;

pub mod bundle;
pub mod inspect;
pub mod ops;
pub mod paths;
pub mod special;
pub mod temp;
pub mod walk;

use bundle::Bundle;
use special::{DirEnv, SpecialDir, special_dir};
use walk::{ListOptions, Walker};

const LIST_LIMIT: usize = 50;
const WALK_LIMIT: usize = 200;

#[derive(Clone, Debug)]
pub struct FilesTour {
    /// Where the copy/move/delete demo creates its files.
    pub workdir: PathBuf,
    /// Directory to list; defaults to the applications directory.
    pub list_dir: Option<PathBuf>,
    /// Tree to walk; defaults to the documents directory.
    pub walk_root: Option<PathBuf>,
    pub env: DirEnv,
    pub bundle: Bundle,
}

pub fn tour(cfg: &FilesTour) -> Transcript {
    let mut out = Transcript::new("files");
    let home = cfg.env.home_str();

    out.section("paths (strings)");
    out.value("append component", paths::append_component("/tmp", "junk"));
    out.value("append extension", paths::append_extension("/tmp/file", "txt"));
    out.value("delete extension", paths::delete_extension("/tmp/junk"));
    out.value("delete extension", paths::delete_extension("/tmp/file.txt"));
    out.value("current directory", cfg.workdir.display().to_string());
    out.value("expand tilde", paths::expand_tilde("~/", home));
    out.value("standardize", paths::standardize("~", home));
    out.value("standardize", paths::standardize("/tmp/junk/path/../../", home));

    out.section("paths (urls)");
    url_steps(&mut out, &cfg.workdir);

    out.section("special paths");
    for dir in SpecialDir::ALL {
        let located = special_dir(dir, &cfg.env).map(|p| p.display().to_string());
        out.value(dir.label(), located);
    }

    out.section("inspecting");
    let report = inspect::inspect(&cfg.workdir);
    if report.is_dir {
        out.value("is directory", "YES!");
    }
    out.value("inspect", &report);

    out.section("listing");
    let list_target = cfg
        .list_dir
        .clone()
        .or_else(|| special_dir(SpecialDir::Applications, &cfg.env));
    match list_target {
        Some(dir) => list_step(&mut out, &dir),
        None => out.note("no directory to list"),
    }

    out.section("walking");
    let walk_target = cfg
        .walk_root
        .clone()
        .or_else(|| special_dir(SpecialDir::Documents, &cfg.env));
    match walk_target {
        Some(root) => walk_step(&mut out, &root),
        None => out.note("no directory to walk"),
    }

    out.section("basic ops");
    file_ops_step(&mut out, &cfg.workdir);

    out.section("temp files");
    temp_step(&mut out, &cfg.env);

    out.section("bundle");
    match cfg.bundle.read_string("BundledFile", "txt") {
        Ok(text) => out.value("BundledFile.txt", text),
        Err(err) => out.error("BundledFile.txt", &err),
    }

    out
}

fn url_steps(out: &mut Transcript, workdir: &Path) {
    let result = (|| -> Result<(), Error> {
        let tmp = paths::file_url("/tmp", false)?;
        let tmp_dir = paths::file_url("/tmp", true)?;
        let file = paths::file_url("/tmp/file", false)?;
        let junk_dir = paths::file_url("/tmp/junk/", true)?;
        let junk = paths::file_url("/tmp/junk", false)?;
        let txt = paths::file_url("/tmp/file.txt", false)?;

        out.value(
            "append component",
            paths::url_append_component(&tmp, "junk", false)?.as_str(),
        );
        out.value(
            "append component",
            paths::url_append_component(&tmp_dir, "junk", true)?.as_str(),
        );
        out.value(
            "append extension",
            paths::url_append_extension(&file, "txt")?.as_str(),
        );
        out.value(
            "delete last component",
            paths::url_delete_last_component(&junk_dir)?.as_str(),
        );
        out.value(
            "delete last component",
            paths::url_delete_last_component(&junk)?.as_str(),
        );
        out.value("delete extension", paths::url_delete_extension(&txt)?.as_str());

        let cwd = paths::file_url(&workdir.display().to_string(), true)?;
        out.value("current directory", cwd.as_str());

        let base = paths::file_url("/tmp/junk/path/", true)?;
        out.value("relative", paths::url_relative("../../", &base)?.as_str());
        Ok(())
    })();
    if let Err(err) = result {
        out.error("url", &err);
    }
}

fn list_step(out: &mut Transcript, dir: &Path) {
    match walk::list_dir(dir, ListOptions { skip_hidden: true }) {
        Ok(entries) => {
            out.value("directory", dir.display().to_string());
            out.value("count", entries.len());
            let names: Vec<String> = entries
                .iter()
                .take(LIST_LIMIT)
                .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect();
            out.value("entries", names);
            if entries.len() > LIST_LIMIT {
                out.note(format!("showing the first {LIST_LIMIT} entries"));
            }
        }
        Err(err) => out.error("list", &err),
    }
}

fn walk_step(out: &mut Transcript, root: &Path) {
    // Errors and paths share one log so they are recorded in walk order.
    let log: RefCell<Vec<Result<PathBuf, String>>> = RefCell::new(Vec::new());
    let walker = Walker::new(root).skip_hidden(true).on_error(|path, err| {
        log.borrow_mut()
            .push(Err(format!("Error {err} at {}", path.display())));
        true
    });
    let mut walked = 0;
    let mut truncated = false;
    for path in walker {
        if walked == WALK_LIMIT {
            truncated = true;
            break;
        }
        walked += 1;
        log.borrow_mut().push(Ok(path));
    }

    for event in log.into_inner() {
        match event {
            Ok(path) => out.value("url", format!("url -> {}", path.display())),
            Err(message) => out.value("walk error", message),
        }
    }
    if truncated {
        out.note(format!("stopped after {WALK_LIMIT} entries"));
    }
}

fn file_ops_step(out: &mut Transcript, workdir: &Path) {
    let orig = workdir.join("origfile.txt");
    let copied = workdir.join("copyfile.txt");
    let moved = workdir.join("movefile.txt");

    if let Err(err) = ops::create_file(&orig, b"Hello World!") {
        // an existing file here is not ours to copy, move or delete
        out.error("create", &err);
        return;
    }
    out.value("create", "File Created!");

    let mut cleanup = Vec::new();
    match ops::copy(&orig, &copied) {
        Ok(_) => {
            out.value("copy", "File Copied!");
            cleanup.push(("delete copy", copied));
        }
        Err(err) => out.error("copy", &err),
    }
    match ops::move_item(&orig, &moved) {
        Ok(()) => {
            out.value("move", "File Moved!");
            cleanup.push(("delete moved", moved));
        }
        Err(err) => {
            out.error("move", &err);
            cleanup.push(("delete original", orig));
        }
    }
    for (label, path) in cleanup {
        match ops::remove_item(&path) {
            Ok(()) => out.value(label, format!("File {} removed!", path.display())),
            Err(err) => out.error(label, &err),
        }
    }
}

fn temp_step(out: &mut Transcript, env: &DirEnv) {
    let tmp = env.temp.clone();
    out.value("temp directory", tmp.display().to_string());
    out.value(
        "cache directory",
        special_dir(SpecialDir::Caches, env).map(|p| p.display().to_string()),
    );
    match temp::available_space(&tmp) {
        Ok(bytes) => out.value("available space", format_bytes(bytes)),
        Err(err) => out.error("available space", &err),
    }

    let result = (|| -> Result<(), Error> {
        let template = temp::TempTemplate::parse("prefix.XXXXXX.suffix")?;
        let mut file = temp::create_temp_file(&tmp, &template)?;
        let path = file.path().to_path_buf();
        out.value("temp file", path.display().to_string());

        let io_err = |err| Error::io(err, "failed to use temp file", &path);
        file.as_file().try_lock_exclusive().map_err(io_err)?;
        file.write_all(b"some stuff").map_err(io_err)?;
        file.as_file().unlock().map_err(io_err)?;
        match file.close() {
            Ok(()) => out.value("temp file removed", true),
            Err(err) => out.error("temp file removed", &Error::io(err, "failed to remove", &path)),
        }

        let template = temp::TempTemplate::parse("dir-prefix.XXXXXX.suffix")?;
        let dir = temp::create_temp_dir(&tmp, &template)?;
        let dir_path = dir.path().to_path_buf();
        out.value("temp dir", dir_path.display().to_string());
        match dir.close() {
            Ok(()) => out.value("temp dir removed", true),
            Err(err) => out.error(
                "temp dir removed",
                &Error::io(err, "failed to remove", &dir_path),
            ),
        }
        Ok(())
    })();
    if let Err(err) = result {
        out.error("temp", &err);
    }
}

pub(crate) fn format_bytes(value: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    const GIB: u64 = 1024 * 1024 * 1024;
    if value < KIB {
        return value.to_string();
    }
    let (unit, suffix) = if value >= GIB {
        (GIB, "G")
    } else if value >= MIB {
        (MIB, "M")
    } else {
        (KIB, "K")
    };
    if value.is_multiple_of(unit) {
        return format!("{}{}", value / unit, suffix);
    }
    format!("{:.1}{}", (value as f64) / (unit as f64), suffix)
}
