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

//! Receive-side accumulation of packets back into a complete file.
//!
//! At most one transfer is in flight at a time. A START packet opens a
//! fresh context (dropping any incomplete one), each validated payload is
//! appended in arrival order, and when the announced fragment count is
//! reached the joined payload text is decoded back into the original file
//! bytes. Fragments are not reordered by sequence number: the link is a
//! reliable ordered stream, and a lost fragment simply stalls the transfer
//! until the next START.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::warn;

use crate::error::{MalformedPacket, ProtocolError};
use crate::frame::{self, Packet, PacketKind};

// ============================================================================
// Transfer Context
// ============================================================================

/// Accumulation state for the single in-flight transfer.
struct TransferContext {
    name: String,
    expected_total: u32,
    /// Payload chunks in arrival order, append-only.
    received: Vec<Vec<u8>>,
}

/// A transfer that reached its announced fragment count.
#[derive(Debug, PartialEq, Eq)]
pub struct CompletedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

// ============================================================================
// Reassembler
// ============================================================================

/// The receive-side state machine. Exclusively owns the transfer context;
/// mutated only by the receive loop, so it needs no locking.
#[derive(Default)]
pub struct Reassembler {
    context: Option<TransferContext>,
}

impl Reassembler {
    pub fn new() -> Self {
        Reassembler { context: None }
    }

    /// Feeds one decoded packet into the state machine.
    ///
    /// Returns `Ok(Some(file))` when this packet completed a transfer,
    /// `Ok(None)` when the packet was absorbed (or dropped while idle).
    /// A checksum mismatch rejects the packet but keeps the context, so a
    /// noisy fragment does not abort the whole transfer; without
    /// retransmission the transfer then stalls short of its announced
    /// count, which is the sole completion failure mode.
    pub fn accept(&mut self, packet: Packet) -> Result<Option<CompletedFile>, ProtocolError> {
        let actual = frame::integrity_tag(&packet.payload);
        if actual != packet.checksum {
            return Err(ProtocolError::ChecksumMismatch {
                expected: packet.checksum,
                actual,
            });
        }

        match packet.kind {
            PacketKind::Start => {
                if packet.total == 0 {
                    return Err(MalformedPacket::ZeroTotal.into());
                }
                if let Some(old) = self.context.take() {
                    warn!(
                        file = %old.name,
                        received = old.received.len(),
                        expected = old.expected_total,
                        "new transfer started, dropping incomplete transfer"
                    );
                }
                self.context = Some(TransferContext {
                    name: packet.filename,
                    expected_total: packet.total,
                    received: vec![packet.payload],
                });
            }
            PacketKind::Data | PacketKind::End => match self.context.as_mut() {
                Some(context) => context.received.push(packet.payload),
                None => {
                    warn!(
                        seq = packet.sequence,
                        "fragment arrived with no transfer in progress, dropping"
                    );
                    return Ok(None);
                }
            },
        }

        self.try_complete()
    }

    /// The in-flight transfer as `(name, received, expected)`, if any.
    pub fn in_flight(&self) -> Option<(&str, usize, u32)> {
        self.context
            .as_ref()
            .map(|c| (c.name.as_str(), c.received.len(), c.expected_total))
    }

    fn try_complete(&mut self) -> Result<Option<CompletedFile>, ProtocolError> {
        match self.context.take() {
            Some(context) if context.received.len() == context.expected_total as usize => {
                let joined = context.received.concat();
                let bytes = STANDARD
                    .decode(&joined)
                    .map_err(MalformedPacket::Encoding)?;
                Ok(Some(CompletedFile {
                    name: context.name,
                    bytes,
                }))
            }
            incomplete => {
                self.context = incomplete;
                Ok(None)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
