// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! JSON lines writer

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::Result;

/// Writes one JSON document per line
pub struct JsonlWriter<W: Write> {
    inner: Mutex<BufWriter<W>>,
}

impl JsonlWriter<File> {
    /// Append to `path`, creating it and its parent directories
    pub fn append(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> JsonlWriter<W> {
    /// Wrap a writer with buffering
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(BufWriter::new(writer)),
        }
    }

    /// Write one value as a line
    pub fn write<T: Serialize>(&self, value: &T) -> Result<()> {
        let mut out = self.inner.lock();
        serde_json::to_writer(&mut *out, value)?;
        out.write_all(b"\n")?;
        Ok(())
    }

    /// Flush buffered lines
    pub fn flush(&self) -> Result<()> {
        self.inner.lock().flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}
