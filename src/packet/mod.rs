// Copyright 2026 The dcSCTP Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Wire formats for the chunks the receive path handles: the TLV framing
//! shared by all chunks, DATA, FORWARD-TSN and SACK. Chunk types outside the
//! receive path are left to the association layer.

use thiserror::Error;

pub mod chunk;
pub mod data;
pub mod data_chunk;
pub mod forward_tsn_chunk;
pub mod sack_chunk;

/// Size of the Type-Length-Value header shared by all chunks.
pub(crate) const TLV_HEADER_SIZE: usize = 4;

/// Chunks are padded to 4-byte boundaries on the wire.
#[inline]
pub(crate) fn round_up_to_4(n: usize) -> usize {
    (n + 3) & !3
}

macro_rules! read_u16_be {
    ($buf: expr) => {
        u16::from_be_bytes($buf[..2].try_into().unwrap())
    };
}

macro_rules! read_u32_be {
    ($buf: expr) => {
        u32::from_be_bytes($buf[..4].try_into().unwrap())
    };
}

macro_rules! write_u16_be {
    ($buf: expr, $n: expr) => {
        $buf[..2].copy_from_slice(&($n as u16).to_be_bytes());
    };
}

macro_rules! write_u32_be {
    ($buf: expr, $n: expr) => {
        $buf[..4].copy_from_slice(&($n as u32).to_be_bytes());
    };
}

macro_rules! ensure {
    ($cond: expr, $err: expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}

pub(crate) use ensure;
pub(crate) use read_u16_be;
pub(crate) use read_u32_be;
pub(crate) use write_u16_be;
pub(crate) use write_u32_be;

/// Trait for serialization/deserialization methods on TLV data types that
/// share the framing but handle their metadata (type, flags) differently.
pub trait SerializableTlv {
    /// Serializes this TLV object to a byte array. Callers are expected to
    /// call [`Self::serialized_size`] first to size `output` correctly.
    fn serialize_to(&self, output: &mut [u8]);

    /// The number of value bytes, excluding the TLV header.
    fn value_size(&self) -> usize;

    /// The number of bytes this TLV object serializes to.
    fn serialized_size(&self) -> usize {
        TLV_HEADER_SIZE + self.value_size()
    }
}

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ChunkParseError {
    #[error("The TLV data has an invalid length field, or payload size")]
    InvalidLength,

    #[error("Unexpected TLV type")]
    InvalidType,
}
