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

//! Splits a file into wire-sized fragments for transmission.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::frame::PacketKind;

/// One planned fragment of a transfer, in send order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: PacketKind,
    /// 1-based position within the transfer.
    pub sequence: u32,
    /// Total fragment count for the transfer.
    pub total: u32,
    /// At most `max_fragment_size` characters of the base64-encoded file.
    pub payload: Vec<u8>,
}

/// Plans the fragment sequence for a file.
///
/// The raw file bytes are base64-encoded so the fragment stream is
/// representable on the line-oriented channel, then the encoded text is
/// sliced into consecutive fragments of at most `max_fragment_size`
/// characters, the final one possibly shorter. The first fragment is
/// START; the rest are DATA. An empty file yields exactly one zero-length
/// START fragment.
///
/// Deterministic: identical input always yields the identical plan.
/// `max_fragment_size` must be at least 1.
pub fn plan(file_bytes: &[u8], max_fragment_size: usize) -> Vec<Fragment> {
    let encoded = STANDARD.encode(file_bytes);
    if encoded.is_empty() {
        return vec![Fragment {
            kind: PacketKind::Start,
            sequence: 1,
            total: 1,
            payload: Vec::new(),
        }];
    }

    let chunks: Vec<&[u8]> = encoded.as_bytes().chunks(max_fragment_size).collect();
    let total = chunks.len() as u32;
    chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| Fragment {
            kind: if index == 0 {
                PacketKind::Start
            } else {
                PacketKind::Data
            },
            sequence: index as u32 + 1,
            total,
            payload: chunk.to_vec(),
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MAX_FRAGMENT_SIZE;

    #[test]
    fn test_small_file_single_fragment() {
        // base64("hi") = "aGk=", four characters, fits in one fragment.
        let fragments = plan(b"hi", 4);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].kind, PacketKind::Start);
        assert_eq!(fragments[0].sequence, 1);
        assert_eq!(fragments[0].total, 1);
        assert_eq!(fragments[0].payload, b"aGk=");
    }

    #[test]
    fn test_empty_file_single_empty_fragment() {
        let fragments = plan(b"", MAX_FRAGMENT_SIZE);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].kind, PacketKind::Start);
        assert_eq!(fragments[0].sequence, 1);
        assert_eq!(fragments[0].total, 1);
        assert!(fragments[0].payload.is_empty());
    }

    #[test]
    fn test_multi_fragment_plan() {
        // 200 bytes -> 268 base64 characters -> 5 fragments of 64,64,64,64,12.
        let data: Vec<u8> = (0..200).map(|i| i as u8).collect();
        let fragments = plan(&data, MAX_FRAGMENT_SIZE);

        assert_eq!(fragments.len(), 5);
        for (index, fragment) in fragments.iter().enumerate() {
            assert_eq!(fragment.sequence, index as u32 + 1);
            assert_eq!(fragment.total, 5);
            let expected_kind = if index == 0 {
                PacketKind::Start
            } else {
                PacketKind::Data
            };
            assert_eq!(fragment.kind, expected_kind);
        }
        let lengths: Vec<usize> = fragments.iter().map(|f| f.payload.len()).collect();
        assert_eq!(lengths, vec![64, 64, 64, 64, 12]);
    }

    #[test]
    fn test_exact_boundary() {
        // 48 bytes -> exactly 64 base64 characters -> one full fragment.
        let fragments = plan(&[0u8; 48], MAX_FRAGMENT_SIZE);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].payload.len(), 64);

        // One more input byte spills into a second fragment.
        let fragments = plan(&[0u8; 49], MAX_FRAGMENT_SIZE);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].payload.len(), 64);
        assert_eq!(fragments[1].payload.len(), 4);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let data = b"determinism matters for the round-trip property";
        assert_eq!(plan(data, 7), plan(data, 7));
    }

    #[test]
    fn test_fragments_reconstruct_encoding() {
        let data = b"some file content that spans several fragments";
        let fragments = plan(data, 7);

        let mut joined = Vec::new();
        for fragment in &fragments {
            joined.extend_from_slice(&fragment.payload);
        }
        assert_eq!(STANDARD.decode(&joined).unwrap(), data);
    }
}
