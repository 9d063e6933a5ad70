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

//! Error types for the transfer protocol and the surrounding I/O.

use thiserror::Error;

/// A data frame that could not be parsed back into a packet.
///
/// Malformed frames are dropped by the receive loop; they never abort an
/// in-flight transfer.
#[derive(Debug, Error)]
pub enum MalformedPacket {
    /// The frame text is not valid base64.
    #[error("invalid transport encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The decoded frame does not contain the header delimiter.
    #[error("header delimiter not found")]
    MissingDelimiter,

    /// The header bytes before the delimiter are not UTF-8.
    #[error("header is not valid UTF-8")]
    HeaderNotUtf8,

    /// The header text is not a valid header record (bad JSON, missing or
    /// mistyped field).
    #[error("invalid header: {0}")]
    Header(#[from] serde_json::Error),

    /// A transfer announcing zero fragments can never complete.
    #[error("fragment count of zero")]
    ZeroTotal,
}

/// Per-packet protocol failure, surfaced by the packet consumer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed packet: {0}")]
    Malformed(#[from] MalformedPacket),

    /// The integrity tag recomputed over the payload does not match the
    /// tag carried in the header. The packet is dropped; the transfer
    /// context is retained.
    #[error("checksum mismatch: header says {expected}, payload computes to {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

/// Failure of a whole send or receive operation.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Read or write failure on the serial link.
    #[error("link error: {0}")]
    Link(#[source] std::io::Error),

    /// The source file could not be read.
    #[error("file error: {0}")]
    File(#[source] std::io::Error),

    /// The destination could not be written.
    #[error("sink error: {0}")]
    Sink(#[source] std::io::Error),

    /// A packet header could not be serialized.
    #[error("could not encode packet: {0}")]
    Encode(#[from] serde_json::Error),
}
