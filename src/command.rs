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

//! Control tokens multiplexed with data frames on the serial link.
//!
//! Commands are plain delimited lines, not base64-wrapped, carry no
//! checksum, and are best-effort in both directions.

use std::fmt;

/// One line of link traffic, either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch the radio to transmit mode.
    TxMode,
    /// Switch the radio to receive mode.
    RxMode,
    /// Announce readiness to receive.
    RxReady,
    /// Announce an upcoming file transfer.
    FileBegin {
        filename: String,
        fragments: u32,
        bytes: u64,
    },
    /// Announce the end of a file transfer.
    FileEnd { filename: String },
    /// Free-text status, e.g. TX_SUCCESS or CHECKSUM_ERR from the radio.
    Status(String),
    /// Error report from the radio firmware.
    DeviceError(String),
    /// Tune the radio to a frequency in MHz. The trailing field is
    /// reserved by the firmware.
    SetFrequency(f32),
    /// A data frame; the inner text is packet wire text.
    Data(String),
}

impl Command {
    /// Parses one link line. Returns `None` for lines that match no
    /// recognized token; callers log and drop those.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        match line {
            "<TXMODE>" => return Some(Command::TxMode),
            "<RXMODE>" => return Some(Command::RxMode),
            "<RX_READY>" => return Some(Command::RxReady),
            _ => {}
        }

        let inner = line.strip_prefix('<')?.strip_suffix('>')?;
        if let Some(payload) = inner.strip_prefix("DATA|") {
            return Some(Command::Data(payload.to_string()));
        }
        if let Some(text) = inner.strip_prefix("STATUS|") {
            return Some(Command::Status(text.to_string()));
        }
        if let Some(text) = inner.strip_prefix("ERROR|") {
            return Some(Command::DeviceError(text.to_string()));
        }
        if let Some(rest) = inner.strip_prefix("FILE_END|") {
            return Some(Command::FileEnd {
                filename: rest.to_string(),
            });
        }
        if let Some(rest) = inner.strip_prefix("FILE|") {
            let mut fields = rest.splitn(3, '|');
            let filename = fields.next()?.to_string();
            let fragments = fields.next()?.parse().ok()?;
            let bytes = fields.next()?.parse().ok()?;
            return Some(Command::FileBegin {
                filename,
                fragments,
                bytes,
            });
        }
        if let Some(rest) = inner.strip_prefix("SET|") {
            let mhz = rest.split(',').next()?.parse().ok()?;
            return Some(Command::SetFrequency(mhz));
        }
        None
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::TxMode => write!(f, "<TXMODE>"),
            Command::RxMode => write!(f, "<RXMODE>"),
            Command::RxReady => write!(f, "<RX_READY>"),
            Command::FileBegin {
                filename,
                fragments,
                bytes,
            } => write!(f, "<FILE|{}|{}|{}>", filename, fragments, bytes),
            Command::FileEnd { filename } => write!(f, "<FILE_END|{}>", filename),
            Command::Status(text) => write!(f, "<STATUS|{}>", text),
            Command::DeviceError(text) => write!(f, "<ERROR|{}>", text),
            Command::SetFrequency(mhz) => write!(f, "<SET|{},0>", mhz),
            Command::Data(payload) => write!(f, "<DATA|{}>", payload),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
