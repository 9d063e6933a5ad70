// Copyright (C) 2026 Brian Johnson
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use std::path::{Path, PathBuf};

// ============================================================================
// FileSink Trait
// ============================================================================

/// Destination for completed transfers.
///
/// `save` may block on user interaction or disk I/O; the receive loop
/// calls it synchronously and stalls until it resolves.
pub trait FileSink {
    /// Writes the received bytes under a destination derived from
    /// `suggested_name`. Returns `Ok(None)` when the destination prompt
    /// was cancelled.
    fn save(&mut self, suggested_name: &str, bytes: &[u8]) -> std::io::Result<Option<PathBuf>>;
}

// ============================================================================
// Directory Sink
// ============================================================================

/// Saves received files into a fixed output directory.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: PathBuf) -> Self {
        DirectorySink { dir }
    }
}

impl FileSink for DirectorySink {
    fn save(&mut self, suggested_name: &str, bytes: &[u8]) -> std::io::Result<Option<PathBuf>> {
        // Only the final path component is trusted; a sender-controlled
        // name must not escape the output directory.
        let name = Path::new(suggested_name)
            .file_name()
            .map(|n| n.to_owned())
            .unwrap_or_else(|| "received.bin".into());
        let path = self.dir.join(name);
        std::fs::write(&path, bytes)?;
        Ok(Some(path))
    }
}

// ============================================================================
// Mock Sink for Testing
// ============================================================================

#[cfg(test)]
pub struct MockSink {
    pub saved: Vec<(String, Vec<u8>)>,
    pub cancel: bool,
}

#[cfg(test)]
impl MockSink {
    pub fn new() -> Self {
        MockSink {
            saved: Vec::new(),
            cancel: false,
        }
    }

    pub fn cancelling() -> Self {
        MockSink {
            saved: Vec::new(),
            cancel: true,
        }
    }
}

#[cfg(test)]
impl FileSink for MockSink {
    fn save(&mut self, suggested_name: &str, bytes: &[u8]) -> std::io::Result<Option<PathBuf>> {
        if self.cancel {
            return Ok(None);
        }
        self.saved.push((suggested_name.to_string(), bytes.to_vec()));
        Ok(Some(PathBuf::from(suggested_name)))
    }
}

// ============================================================================
// Tests
// ============================================================================
