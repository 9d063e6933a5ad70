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

use std::time::Duration;

use serialport::{DataBits, Parity, SerialPort as SerialPortTrait, StopBits};

// ============================================================================
// LinkPort Trait
// ============================================================================

/// Duplex line-oriented view of the serial link to the radio module.
///
/// Every protocol exchange is a complete newline-terminated line; the
/// framing above this trait never sees partial lines.
pub trait LinkPort: Send {
    /// Writes one line, appending the terminator, and flushes.
    fn write_line(&mut self, line: &str) -> std::io::Result<()>;

    /// Reads one line, blocking up to `timeout`. Returns `Ok(None)` when
    /// no complete line arrived in time; an error means the link is
    /// closed or broken.
    fn read_line(&mut self, timeout: Duration) -> std::io::Result<Option<String>>;
}

/// Extracts the first complete line from `pending`, stripping the
/// terminator (and a preceding carriage return, if any).
fn take_line(pending: &mut Vec<u8>) -> Option<String> {
    let position = pending.iter().position(|&byte| byte == b'\n')?;
    let mut line: Vec<u8> = pending.drain(..=position).collect();
    while matches!(line.last(), Some(b'\n') | Some(b'\r')) {
        line.pop();
    }
    Some(String::from_utf8_lossy(&line).into_owned())
}

// ============================================================================
// Real Serial Port Implementation
// ============================================================================

/// Real serial link that wraps the serialport crate.
pub struct RealSerialPort {
    port: Box<dyn SerialPortTrait>,
    pending: Vec<u8>,
}

impl RealSerialPort {
    pub fn open(
        port_name: &str,
        baud_rate: u32,
        data_bits: DataBits,
        parity: Parity,
        stop_bits: StopBits,
    ) -> Result<Self, serialport::Error> {
        let port = serialport::new(port_name, baud_rate)
            .data_bits(data_bits)
            .parity(parity)
            .stop_bits(stop_bits)
            .timeout(Duration::from_millis(100))
            .open()?;

        Ok(RealSerialPort {
            port,
            pending: Vec::new(),
        })
    }
}

impl LinkPort for RealSerialPort {
    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.port.write_all(line.as_bytes())?;
        self.port.write_all(b"\n")?;
        self.port.flush()?;
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> std::io::Result<Option<String>> {
        loop {
            if let Some(line) = take_line(&mut self.pending) {
                return Ok(Some(line));
            }

            self.port
                .set_timeout(timeout)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

            let mut buf = [0u8; 256];
            match self.port.read(&mut buf) {
                Ok(0) => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "serial link closed",
                    ));
                }
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => return Ok(None),
                Err(e) => return Err(e),
            }
        }
    }
}

// ============================================================================
// Mock Link for Testing
// ============================================================================

#[cfg(test)]
pub struct MockLinkPort {
    // Lines to return on reads (None = timeout); exhaustion = link closed
    responses: Vec<Option<String>>,
    read_pos: usize,
    // Track what was written
    write_log: Vec<String>,
    // Expected writes for verification
    expected_writes: Vec<String>,
}

#[cfg(test)]
impl MockLinkPort {
    pub fn new(responses: Vec<Option<String>>, expected_writes: Vec<String>) -> Self {
        MockLinkPort {
            responses,
            read_pos: 0,
            write_log: Vec::new(),
            expected_writes,
        }
    }
}

#[cfg(test)]
impl LinkPort for MockLinkPort {
    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.write_log.push(line.to_string());
        Ok(())
    }

    fn read_line(&mut self, _timeout: Duration) -> std::io::Result<Option<String>> {
        if self.read_pos >= self.responses.len() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock link closed",
            ));
        }

        let response = self.responses[self.read_pos].clone();
        self.read_pos += 1;
        Ok(response)
    }
}

#[cfg(test)]
impl Drop for MockLinkPort {
    fn drop(&mut self) {
        assert_eq!(
            self.read_pos,
            self.responses.len(),
            "MockLinkPort dropped with {} unconsumed responses",
            self.responses.len() - self.read_pos
        );

        assert_eq!(
            &self.write_log, &self.expected_writes,
            "MockLinkPort write log mismatch!\nExpected {} lines:\n{:?}\nGot {} lines:\n{:?}",
            self.expected_writes.len(),
            self.expected_writes,
            self.write_log.len(),
            self.write_log
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
