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

use std::path::Path;

use tracing::{debug, info};

use crate::chunker;
use crate::command::Command;
use crate::error::TransferError;
use crate::frame;
use crate::protocol::MAX_FRAGMENT_SIZE;
use crate::serial::LinkPort;

/// Sends one file over the link.
///
/// The whole send path is a blocking sequential loop: announce transmit
/// mode and the file, write one data frame per planned fragment, then the
/// file-end token. Returns only after the last line is written; there is
/// no cancellation of an in-flight send.
pub fn send_file(link: &mut dyn LinkPort, path: &Path) -> Result<(), TransferError> {
    let bytes = std::fs::read(path).map_err(TransferError::File)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed.bin")
        .to_string();

    let plan = chunker::plan(&bytes, MAX_FRAGMENT_SIZE);
    let total = plan.len() as u32;

    link.write_line(&Command::TxMode.to_string())
        .map_err(TransferError::Link)?;
    link.write_line(
        &Command::FileBegin {
            filename: filename.clone(),
            fragments: total,
            bytes: bytes.len() as u64,
        }
        .to_string(),
    )
    .map_err(TransferError::Link)?;

    for fragment in &plan {
        let encoded = frame::encode(
            fragment.kind,
            fragment.sequence,
            fragment.total,
            &fragment.payload,
            &filename,
        )?;
        link.write_line(&Command::Data(encoded).to_string())
            .map_err(TransferError::Link)?;
        debug!(seq = fragment.sequence, total, "sent packet");
    }

    link.write_line(
        &Command::FileEnd {
            filename: filename.clone(),
        }
        .to_string(),
    )
    .map_err(TransferError::Link)?;

    info!(
        file = %filename,
        fragments = total,
        size = bytes.len(),
        "file sent"
    );
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::MockLinkPort;

    /// Builds the exact line script `send_file` must produce for a file.
    fn expected_lines(name: &str, content: &[u8]) -> Vec<String> {
        let plan = chunker::plan(content, MAX_FRAGMENT_SIZE);
        let total = plan.len() as u32;

        let mut lines = vec![
            Command::TxMode.to_string(),
            Command::FileBegin {
                filename: name.to_string(),
                fragments: total,
                bytes: content.len() as u64,
            }
            .to_string(),
        ];
        for fragment in &plan {
            let encoded = frame::encode(
                fragment.kind,
                fragment.sequence,
                fragment.total,
                &fragment.payload,
                name,
            )
            .unwrap();
            lines.push(Command::Data(encoded).to_string());
        }
        lines.push(
            Command::FileEnd {
                filename: name.to_string(),
            }
            .to_string(),
        );
        lines
    }

    #[test]
    fn test_send_small_file() {
        let test_file = std::env::temp_dir().join("rflink_send_small.txt");
        std::fs::write(&test_file, b"Test data").unwrap();

        let expected = expected_lines("rflink_send_small.txt", b"Test data");
        let mut link = MockLinkPort::new(vec![], expected);

        send_file(&mut link, &test_file).unwrap();

        std::fs::remove_file(&test_file).ok();
    }

    #[test]
    fn test_send_multi_fragment_file() {
        let test_file = std::env::temp_dir().join("rflink_send_multi.bin");
        let content: Vec<u8> = (0..300).map(|i| (i % 256) as u8).collect();
        std::fs::write(&test_file, &content).unwrap();

        let expected = expected_lines("rflink_send_multi.bin", &content);
        // 300 bytes -> 400 base64 characters -> 7 fragments.
        assert_eq!(expected.len(), 2 + 7 + 1);
        let mut link = MockLinkPort::new(vec![], expected);

        send_file(&mut link, &test_file).unwrap();

        std::fs::remove_file(&test_file).ok();
    }

    #[test]
    fn test_send_empty_file() {
        let test_file = std::env::temp_dir().join("rflink_send_empty.bin");
        std::fs::write(&test_file, b"").unwrap();

        let expected = expected_lines("rflink_send_empty.bin", b"");
        // Even an empty file produces one START fragment.
        assert_eq!(expected.len(), 4);
        let mut link = MockLinkPort::new(vec![], expected);

        send_file(&mut link, &test_file).unwrap();

        std::fs::remove_file(&test_file).ok();
    }

    #[test]
    fn test_send_missing_file() {
        let mut link = MockLinkPort::new(vec![], vec![]);
        let result = send_file(
            &mut link,
            Path::new("/nonexistent/rflink_no_such_file.bin"),
        );
        assert!(matches!(result, Err(TransferError::File(_))));
    }
}
