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

//! RFLINK protocol constants

/// Maximum number of base64 characters carried in one data packet payload.
/// The ceiling is imposed by the radio link's packet buffer.
pub const MAX_FRAGMENT_SIZE: usize = 64;

/// Separates the serialized packet header from the payload bytes inside
/// a data frame. Never occurs inside the serialized header itself.
pub const HEADER_DELIMITER: &[u8] = b"||";

/// Width of the payload integrity tag in hex characters.
pub const TAG_HEX_LEN: usize = 2;

/// Serial line rate used by the radio module.
pub const DEFAULT_BAUD: u32 = 115200;
