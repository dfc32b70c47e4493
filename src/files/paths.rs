//! Purpose: Pure path manipulation, string-style and `file://` URL-style.
//! Exports: string helpers (`append_component`, `standardize`, ...) and URL helpers (`file_url`, ...).
//! Role: No I/O; every function is a lexical transform of its input.
//! Invariants: `..` is resolved lexically (symlinks are not consulted).
//! Invariants: URL helpers only accept absolute paths and hierarchical URLs.
use url::Url;

use crate::core::error::{Error, ErrorKind};

pub fn append_component(base: &str, component: &str) -> String {
    if base.is_empty() {
        return component.to_string();
    }
    let component = component.trim_start_matches('/');
    let base = base.trim_end_matches('/');
    format!("{base}/{component}")
}

pub fn append_extension(path: &str, ext: &str) -> String {
    let trimmed = trim_trailing_separators(path);
    let ext = ext.trim_start_matches('.');
    if ext.is_empty() || trimmed.is_empty() || trimmed == "/" {
        return trimmed.to_string();
    }
    format!("{trimmed}.{ext}")
}

pub fn delete_extension(path: &str) -> String {
    let trimmed = trim_trailing_separators(path);
    let name_start = trimmed.rfind('/').map(|idx| idx + 1).unwrap_or(0);
    let name = &trimmed[name_start..];
    match name.rfind('.') {
        // A leading dot names a hidden file, not an extension.
        Some(dot) if dot > 0 => trimmed[..name_start + dot].to_string(),
        _ => trimmed.to_string(),
    }
}

pub fn delete_last_component(path: &str) -> String {
    let trimmed = trim_trailing_separators(path);
    match trimmed.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
        None => String::new(),
    }
}

/// Expands a leading `~` or `~/` using `home`. `~user` is left alone.
pub fn expand_tilde(path: &str, home: Option<&str>) -> String {
    let Some(home) = home else {
        return path.to_string();
    };
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return path.to_string(),
    };
    let home = home.trim_end_matches('/');
    let joined = format!("{home}{rest}");
    trim_trailing_separators(&joined).to_string()
}

pub fn standardize(path: &str, home: Option<&str>) -> String {
    let expanded = expand_tilde(path, home);
    let absolute = expanded.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for component in expanded.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

fn trim_trailing_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

pub fn file_url(path: &str, is_dir: bool) -> Result<Url, Error> {
    let converted = if is_dir {
        Url::from_directory_path(path)
    } else {
        Url::from_file_path(path)
    };
    converted.map_err(|_| {
        Error::new(ErrorKind::Usage)
            .with_message("file urls require an absolute path")
            .with_path(path)
    })
}

pub fn url_append_component(url: &Url, component: &str, is_dir: bool) -> Result<Url, Error> {
    let mut out = url.clone();
    {
        let mut segments = out.path_segments_mut().map_err(|_| cannot_be_base(url))?;
        segments.pop_if_empty().push(component);
        if is_dir {
            segments.push("");
        }
    }
    Ok(out)
}

pub fn url_append_extension(url: &Url, ext: &str) -> Result<Url, Error> {
    let ext = ext.trim_start_matches('.');
    rewrite_last_segment(url, |name| {
        if name.is_empty() || ext.is_empty() {
            name.to_string()
        } else {
            format!("{name}.{ext}")
        }
    })
}

pub fn url_delete_extension(url: &Url) -> Result<Url, Error> {
    rewrite_last_segment(url, |name| match name.rfind('.') {
        Some(dot) if dot > 0 => name[..dot].to_string(),
        _ => name.to_string(),
    })
}

pub fn url_delete_last_component(url: &Url) -> Result<Url, Error> {
    let up = if url.path().ends_with('/') { "../" } else { "./" };
    url_relative(up, url)
}

pub fn url_relative(relative: &str, base: &Url) -> Result<Url, Error> {
    base.join(relative).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("cannot resolve `{relative}` against base url"))
            .with_url(base.as_str())
            .with_source(err)
    })
}

fn rewrite_last_segment<F>(url: &Url, rewrite: F) -> Result<Url, Error>
where
    F: FnOnce(&str) -> String,
{
    let mut segments: Vec<String> = url
        .path_segments()
        .ok_or_else(|| cannot_be_base(url))?
        .map(str::to_string)
        .collect();
    let trailing_slash = segments.last().is_some_and(|last| last.is_empty());
    if trailing_slash {
        segments.pop();
    }
    if let Some(last) = segments.last_mut() {
        *last = rewrite(last);
    }
    if trailing_slash {
        segments.push(String::new());
    }

    let mut out = url.clone();
    out.path_segments_mut()
        .map_err(|_| cannot_be_base(url))?
        .clear()
        .extend(segments.iter().map(String::as_str));
    Ok(out)
}

fn cannot_be_base(url: &Url) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message("url has no hierarchical path")
        .with_url(url.as_str())
}
