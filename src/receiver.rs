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

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::command::Command;
use crate::error::{ProtocolError, TransferError};
use crate::frame;
use crate::reassembly::{CompletedFile, Reassembler};
use crate::serial::LinkPort;
use crate::sink::FileSink;

/// How long one poll of the link blocks before the reader checks again.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// Receive Session
// ============================================================================

/// Per-session receive state: the reassembler plus the destination sink.
///
/// Packet-level failures are logged and absorbed here; only the link
/// itself can end a session.
pub struct ReceiveSession<'a> {
    reassembler: Reassembler,
    sink: &'a mut dyn FileSink,
}

impl<'a> ReceiveSession<'a> {
    pub fn new(sink: &'a mut dyn FileSink) -> Self {
        ReceiveSession {
            reassembler: Reassembler::new(),
            sink,
        }
    }

    /// Processes one line of link traffic.
    pub fn handle_line(&mut self, line: &str) {
        match Command::parse(line) {
            Some(Command::Data(wire)) => self.handle_packet(&wire),
            Some(Command::Status(text)) => info!(%text, "device status"),
            Some(Command::DeviceError(text)) => warn!(%text, "device error"),
            Some(Command::FileBegin {
                filename,
                fragments,
                bytes,
            }) => info!(file = %filename, fragments, bytes, "incoming file announced"),
            Some(Command::FileEnd { filename }) => {
                match self.reassembler.in_flight() {
                    Some((name, received, expected)) => warn!(
                        file = %name,
                        received,
                        expected,
                        "file end announced but transfer is incomplete"
                    ),
                    None => debug!(file = %filename, "file end announced"),
                }
            }
            Some(Command::TxMode | Command::RxMode | Command::RxReady) => {
                debug!(%line, "mode announcement")
            }
            Some(Command::SetFrequency(mhz)) => debug!(mhz = %mhz, "frequency command echoed"),
            None => warn!(%line, "unrecognized line, dropping"),
        }
    }

    fn handle_packet(&mut self, wire: &str) {
        let packet = match frame::decode(wire) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(error = %ProtocolError::Malformed(e), "dropping packet");
                return;
            }
        };
        debug!(
            seq = packet.sequence,
            total = packet.total,
            "packet received"
        );

        match self.reassembler.accept(packet) {
            Ok(Some(file)) => self.deliver(file),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "packet rejected"),
        }
    }

    /// Hands a completed transfer to the sink. Runs synchronously in the
    /// receive loop's thread of control; a slow destination stalls
    /// further receive processing until it resolves.
    fn deliver(&mut self, file: CompletedFile) {
        match self.sink.save(&file.name, &file.bytes) {
            Ok(Some(path)) => info!(
                file = %file.name,
                path = %path.display(),
                size = file.bytes.len(),
                "file saved"
            ),
            Ok(None) => warn!(file = %file.name, "save cancelled, discarding received file"),
            Err(e) => {
                // The transfer is already consumed; there is no re-save.
                error!(file = %file.name, error = %TransferError::Sink(e), "could not save received file")
            }
        }
    }
}

// ============================================================================
// Receive Loop
// ============================================================================

/// Receives files until the link closes.
///
/// Announces receive mode, then moves the link into a dedicated reader
/// thread that blocks on `read_line` and forwards each result over a
/// channel. The calling thread consumes the channel and feeds every line
/// into the session. The only exit is a link error, which is returned.
pub fn receive_files(
    mut link: Box<dyn LinkPort>,
    sink: &mut dyn FileSink,
) -> Result<(), TransferError> {
    link.write_line(&Command::RxMode.to_string())
        .map_err(TransferError::Link)?;
    link.write_line(&Command::RxReady.to_string())
        .map_err(TransferError::Link)?;

    let (line_tx, line_rx) = mpsc::channel();
    let reader = thread::Builder::new()
        .name("link-reader".to_string())
        .spawn(move || reader_loop(link, line_tx))
        .map_err(TransferError::Link)?;

    let mut session = ReceiveSession::new(sink);
    let mut link_result = Ok(());
    for event in line_rx {
        match event {
            Ok(line) => session.handle_line(&line),
            Err(e) => {
                link_result = Err(TransferError::Link(e));
                break;
            }
        }
    }

    if reader.join().is_err() {
        return Err(TransferError::Link(std::io::Error::new(
            std::io::ErrorKind::Other,
            "link reader thread panicked",
        )));
    }
    link_result
}

/// Blocks on the link and forwards complete lines. Exits when the link
/// errors or the consumer hangs up. A timed-out poll just polls again,
/// so the loop never busy-waits.
fn reader_loop(
    mut link: Box<dyn LinkPort>,
    line_tx: mpsc::Sender<Result<String, std::io::Error>>,
) {
    loop {
        match link.read_line(POLL_INTERVAL) {
            Ok(Some(line)) => {
                if line_tx.send(Ok(line)).is_err() {
                    break;
                }
            }
            Ok(None) => continue,
            Err(e) => {
                let _ = line_tx.send(Err(e));
                break;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker;
    use crate::protocol::MAX_FRAGMENT_SIZE;
    use crate::serial::MockLinkPort;
    use crate::sink::MockSink;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    /// Builds the `<DATA|…>` lines a sender would produce for a file.
    fn data_lines(name: &str, content: &[u8]) -> Vec<String> {
        chunker::plan(content, MAX_FRAGMENT_SIZE)
            .iter()
            .map(|fragment| {
                let encoded = frame::encode(
                    fragment.kind,
                    fragment.sequence,
                    fragment.total,
                    &fragment.payload,
                    name,
                )
                .unwrap();
                Command::Data(encoded).to_string()
            })
            .collect()
    }

    #[test]
    fn test_session_receives_file() {
        let content: Vec<u8> = (0..200).map(|i| i as u8).collect();
        let mut sink = MockSink::new();
        {
            let mut session = ReceiveSession::new(&mut sink);
            for line in data_lines("blob.bin", &content) {
                session.handle_line(&line);
            }
        }

        assert_eq!(sink.saved.len(), 1);
        assert_eq!(sink.saved[0].0, "blob.bin");
        assert_eq!(sink.saved[0].1, content);
    }

    #[test]
    fn test_session_ignores_noise_lines() {
        let mut sink = MockSink::new();
        {
            let mut session = ReceiveSession::new(&mut sink);
            session.handle_line("<STATUS|RX_MODE>");
            session.handle_line("<ERROR|JSON:InvalidInput>");
            session.handle_line("<FILE|hi.txt|1|2>");
            session.handle_line("line noise ~~~");
            session.handle_line("<DATA|%%%not-base64%%%>");
            for line in data_lines("hi.txt", b"hi") {
                session.handle_line(&line);
            }
            session.handle_line("<FILE_END|hi.txt>");
        }

        assert_eq!(sink.saved.len(), 1);
        assert_eq!(sink.saved[0].1, b"hi");
    }

    #[test]
    fn test_session_stalls_on_corrupted_fragment() {
        let content: Vec<u8> = (0..200).map(|i| i as u8).collect();
        let mut lines = data_lines("blob.bin", &content);
        assert!(lines.len() > 2);

        // Replace one mid-transfer fragment with a frame whose checksum
        // does not match its payload.
        let mut forged = br#"{"type":"DATA","seq":3,"total":5,"filename":"blob.bin","checksum":"00"}"#.to_vec();
        forged.extend_from_slice(b"||QUJD");
        lines[2] = Command::Data(STANDARD.encode(forged)).to_string();

        let mut sink = MockSink::new();
        {
            let mut session = ReceiveSession::new(&mut sink);
            for line in &lines {
                session.handle_line(line);
            }
        }

        // The corrupted fragment was dropped, the count never reached the
        // announced total, and no file was emitted.
        assert!(sink.saved.is_empty());
    }

    #[test]
    fn test_session_cancelled_save() {
        let mut sink = MockSink::cancelling();
        {
            let mut session = ReceiveSession::new(&mut sink);
            for line in data_lines("hi.txt", b"hi") {
                session.handle_line(&line);
            }
        }
        assert!(sink.saved.is_empty());
    }

    #[test]
    fn test_receive_files_until_link_closes() {
        let mut responses: Vec<Option<String>> = vec![
            Some("<STATUS|RX_READY>".to_string()),
            None, // quiet poll
        ];
        responses.extend(data_lines("hi.txt", b"hi").into_iter().map(Some));
        responses.push(Some("<FILE_END|hi.txt>".to_string()));

        let link = MockLinkPort::new(
            responses,
            vec![
                Command::RxMode.to_string(),
                Command::RxReady.to_string(),
            ],
        );

        let mut sink = MockSink::new();
        let result = receive_files(Box::new(link), &mut sink);

        // The exhausted script reads as a closed link.
        assert!(matches!(result, Err(TransferError::Link(_))));
        assert_eq!(sink.saved.len(), 1);
        assert_eq!(sink.saved[0].0, "hi.txt");
        assert_eq!(sink.saved[0].1, b"hi");
    }
}
