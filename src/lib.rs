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

//! An in-memory SCTP inbound-data engine.
//!
//! This crate implements the receive path of an SCTP association: it consumes
//! the DATA and FORWARD-TSN chunks of incoming packets, tracks which TSNs have
//! been received, decides when a SACK must be produced and what it contains,
//! reassembles fragmented messages, enforces per-stream ordered delivery, and
//! publishes completed messages on a readable queue that supports partial
//! reads.
//!
//! The engine is purely synchronous and single-writer: every entry point takes
//! `&mut self`, and the caller (the association layer) is expected to hold its
//! own serialization lock around them. Connection lifecycle, path selection,
//! the outbound send path and congestion control are the caller's concern; the
//! engine only hands back an [`RxError`] when the caller needs to react
//! (malformed input, buffer exhaustion, protocol violations) and a
//! ready-to-serialize [`packet::sack_chunk::SackChunk`] when an ack is due.

pub mod config;
pub mod packet;
pub mod rx;
pub mod types;

pub use crate::config::Config;
pub use crate::rx::dispatcher::InboundDispatcher;
pub use crate::rx::dispatcher::RxError;
pub use crate::rx::dispatcher::RxMetrics;
pub use crate::rx::read_queue::ReadEntry;

#[cfg(test)]
pub(crate) mod testing;

/// Returns the version of this crate.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
