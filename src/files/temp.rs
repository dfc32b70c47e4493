//! Purpose: Create uniquely named temp files and directories from a name template.
//! Exports: `TempTemplate`, `create_temp_file`, `create_temp_dir`, `available_space`.
//! Role: Template parsing plus the `tempfile` builder; cleanup stays with the caller.
//! Invariants: The random part replaces the last run of at least three `X`s.
use std::path::Path;

use tempfile::{Builder, NamedTempFile, TempDir};

use crate::core::error::{Error, ErrorKind};

const MIN_RANDOM: usize = 3;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TempTemplate {
    pub prefix: String,
    pub random_len: usize,
    pub suffix: String,
}

impl TempTemplate {
    pub fn parse(template: &str) -> Result<Self, Error> {
        let invalid = || {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid temp name template `{template}`"))
                .with_hint("Include a run of at least three `X` characters, e.g. prefix.XXXXXX.suffix.")
        };
        let end = template.rfind('X').ok_or_else(invalid)? + 1;
        let start = template[..end]
            .char_indices()
            .rev()
            .find(|&(_, ch)| ch != 'X')
            .map(|(idx, ch)| idx + ch.len_utf8())
            .unwrap_or(0);
        let random_len = end - start;
        if random_len < MIN_RANDOM {
            return Err(invalid());
        }
        Ok(Self {
            prefix: template[..start].to_string(),
            random_len,
            suffix: template[end..].to_string(),
        })
    }

    fn builder(&self) -> Builder<'_, '_> {
        let mut builder = Builder::new();
        builder
            .prefix(&self.prefix)
            .suffix(&self.suffix)
            .rand_bytes(self.random_len);
        builder
    }
}

pub fn create_temp_file(dir: &Path, template: &TempTemplate) -> Result<NamedTempFile, Error> {
    let file = template
        .builder()
        .tempfile_in(dir)
        .map_err(|err| Error::io(err, "failed to create temp file", dir))?;
    tracing::debug!(path = %file.path().display(), "created temp file");
    Ok(file)
}

pub fn create_temp_dir(dir: &Path, template: &TempTemplate) -> Result<TempDir, Error> {
    let created = template
        .builder()
        .tempdir_in(dir)
        .map_err(|err| Error::io(err, "failed to create temp dir", dir))?;
    tracing::debug!(path = %created.path().display(), "created temp dir");
    Ok(created)
}

pub fn available_space(dir: &Path) -> Result<u64, Error> {
    fs2::available_space(dir).map_err(|err| Error::io(err, "failed to query free space", dir))
}
