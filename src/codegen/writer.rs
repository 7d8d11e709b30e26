//! Indented text output.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

const INDENT: &str = "    ";

/// Line-oriented buffer with block indentation.
#[derive(Debug, Default)]
pub struct Writer {
    output: String,
    level: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current indentation.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.level {
                self.output.push_str(INDENT);
            }
            self.output.push_str(text);
        }
        self.output.push('\n');
    }

    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    /// Run `body` one level deeper.
    pub fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        self.level += 1;
        body(self);
        self.level -= 1;
    }

    /// `head {`, the indented body, then `}`.
    pub fn block(&mut self, head: impl AsRef<str>, body: impl FnOnce(&mut Self)) {
        self.block_with(head, "}", body);
    }

    pub fn block_with(
        &mut self,
        head: impl AsRef<str>,
        close: impl AsRef<str>,
        body: impl FnOnce(&mut Self),
    ) {
        self.line(format!("{} {{", head.as_ref()));
        self.indented(body);
        self.line(close);
    }

    pub fn finish(self) -> String {
        self.output
    }
}

/// One file of generated output, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

/// Write `files` under `dir`, creating it if needed.
pub fn write_files(dir: &Path, files: &[GeneratedFile]) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for file in files {
        let path = dir.join(&file.path);
        fs::write(&path, &file.contents).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = file.contents.len(), "wrote file");
    }
    Ok(())
}
