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

//! Packet framing: the bijective mapping between a packet and its wire
//! text form.
//!
//! A data frame is `base64(header_json || "||" || payload)`. The header is
//! a compact JSON record `{type, seq, total, filename, checksum}`; the
//! payload is an opaque byte fragment. The whole concatenation is base64
//! encoded so a frame can travel as a single line over the radio link.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::MalformedPacket;
use crate::protocol::{HEADER_DELIMITER, TAG_HEX_LEN};

// ============================================================================
// Packet Model
// ============================================================================

/// Position of a packet within a transfer.
///
/// START opens a transfer and carries the filename; DATA and END carry
/// subsequent fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PacketKind {
    Start,
    Data,
    End,
}

/// The atomic unit on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub kind: PacketKind,
    /// 1-based position of this fragment within the transfer.
    pub sequence: u32,
    /// Total fragment count, constant across the transfer.
    pub total: u32,
    /// Logical name of the file being transferred.
    pub filename: String,
    /// Integrity tag the sender computed over `payload`.
    pub checksum: String,
    /// Opaque fragment of the base64-encoded file content.
    pub payload: Vec<u8>,
}

/// The header record as it appears on the wire.
#[derive(Serialize, Deserialize)]
struct Header {
    #[serde(rename = "type")]
    kind: PacketKind,
    seq: u32,
    total: u32,
    filename: String,
    checksum: String,
}

// ============================================================================
// Framing
// ============================================================================

/// Computes the integrity tag for a payload: the first two hex characters
/// of its MD5 digest.
///
/// The two-character truncation is part of the wire format and is kept for
/// compatibility with deployed firmware. It is weak: roughly one random
/// corruption in 256 passes undetected.
pub fn integrity_tag(payload: &[u8]) -> String {
    let digest = format!("{:x}", md5::compute(payload));
    digest[..TAG_HEX_LEN].to_string()
}

/// Encodes a packet into its wire text form. The output contains no
/// newline and is fully reversible via [`decode`].
pub fn encode(
    kind: PacketKind,
    sequence: u32,
    total: u32,
    payload: &[u8],
    filename: &str,
) -> Result<String, serde_json::Error> {
    let header = Header {
        kind,
        seq: sequence,
        total,
        filename: filename.to_owned(),
        checksum: integrity_tag(payload),
    };
    let mut raw = serde_json::to_vec(&header)?;
    raw.extend_from_slice(HEADER_DELIMITER);
    raw.extend_from_slice(payload);
    Ok(STANDARD.encode(raw))
}

/// Decodes wire text back into a packet.
///
/// Splits on the first occurrence of the header delimiter, so payload
/// bytes may themselves contain `||`. Checksum verification is NOT done
/// here; that policy belongs to the consumer, which can choose to drop
/// the packet without aborting the transfer.
pub fn decode(wire_line: &str) -> Result<Packet, MalformedPacket> {
    let raw = STANDARD.decode(wire_line)?;
    let split = raw
        .windows(HEADER_DELIMITER.len())
        .position(|window| window == HEADER_DELIMITER)
        .ok_or(MalformedPacket::MissingDelimiter)?;
    let header_text =
        std::str::from_utf8(&raw[..split]).map_err(|_| MalformedPacket::HeaderNotUtf8)?;
    let header: Header = serde_json::from_str(header_text)?;
    Ok(Packet {
        kind: header.kind,
        sequence: header.seq,
        total: header.total,
        filename: header.filename,
        checksum: header.checksum,
        payload: raw[split + HEADER_DELIMITER.len()..].to_vec(),
    })
}

// ============================================================================
// Tests
// ============================================================================
