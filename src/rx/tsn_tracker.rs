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

use crate::config::Config;
use crate::packet::sack_chunk::GapAckBlock;
use crate::packet::sack_chunk::SackChunk;
use crate::types::Tsn;
use std::ops::Range;

/// Scheduling state for the next SACK.
#[derive(Debug, PartialEq)]
enum AckState {
    /// Nothing to acknowledge.
    Idle,

    /// Data has been received; the SACK may wait for the packet-count rate
    /// limiter.
    Deferred,

    /// A SACK must be produced as soon as possible.
    Immediate,
}

/// Tracks which TSNs have been received and handles all logic for _when_ a
/// SACK must be produced and _what_ it contains.
///
/// It only operates on TSNs and doesn't need to be aware of streams. Received
/// TSNs above the cumulative ack point are kept as disjoint half-open ranges,
/// which map one-to-one onto the gap-ack-blocks of a SACK.
///
/// This component owns no timers: rate limiting is expressed as a packet
/// counter (`Config::sack_every_packets`), and the caller may force an
/// immediate SACK from its own timing machinery.
pub struct TsnTracker {
    /// All TSNs up to and including this value have been received. Moves
    /// monotonically forward for the lifetime of the association.
    cumulative_tsn_ack: Tsn,

    /// Received TSNs not directly following `cumulative_tsn_ack`, as sorted,
    /// disjoint, non-adjacent half-open ranges.
    pending_blocks: Vec<Range<Tsn>>,

    /// Duplicates to report in the next SACK, bounded by configuration.
    reported_duplicates: Vec<Tsn>,

    /// Lifetime count of duplicate chunks, for diagnostics.
    duplicate_count: u64,

    seen_any_data: bool,
    ack_state: AckState,
    packets_since_sack: u32,

    sack_every_packets: u32,
    max_reported_duplicate_tsns: usize,
    max_reported_gap_blocks: usize,
    max_tsn_offset: u32,
}

impl TsnTracker {
    pub fn new(peer_initial_tsn: Tsn, config: &Config) -> TsnTracker {
        TsnTracker {
            cumulative_tsn_ack: peer_initial_tsn - 1,
            pending_blocks: vec![],
            reported_duplicates: vec![],
            duplicate_count: 0,
            seen_any_data: false,
            ack_state: AckState::Idle,
            packets_since_sack: 0,
            sack_every_packets: config.sack_every_packets,
            max_reported_duplicate_tsns: config.max_reported_duplicate_tsns,
            max_reported_gap_blocks: config.max_reported_gap_blocks,
            max_tsn_offset: config.max_tsn_offset,
        }
    }

    pub fn cumulative_tsn_ack(&self) -> Tsn {
        self.cumulative_tsn_ack
    }

    pub fn duplicate_count(&self) -> u64 {
        self.duplicate_count
    }

    /// Whether `tsn` is close enough to the cumulative ack point to be
    /// buffered at all. Old TSNs are still acceptable, as receiving them
    /// affects the duplicate report of the next SACK.
    pub fn is_tsn_acceptable(&self, tsn: Tsn) -> bool {
        tsn.distance_to(self.cumulative_tsn_ack) <= self.max_tsn_offset
    }

    pub fn will_advance_cumulative_ack(&self, tsn: Tsn) -> bool {
        tsn == self.cumulative_tsn_ack + 1
    }

    /// Records a received TSN. Returns `true` if `tsn` was seen for the first
    /// time, `false` for a duplicate (which is counted and reported, but must
    /// not reach the reassembly side again).
    pub fn record(&mut self, tsn: Tsn) -> bool {
        debug_assert!(self.is_tsn_acceptable(tsn));

        let mut is_duplicate = false;
        if tsn <= self.cumulative_tsn_ack {
            self.note_duplicate(tsn);
            is_duplicate = true;
        } else if self.will_advance_cumulative_ack(tsn) {
            self.cumulative_tsn_ack = tsn;
            self.absorb_contiguous_blocks();
        } else if !self.insert_pending(tsn) {
            self.note_duplicate(tsn);
            is_duplicate = true;
        }

        // From <https://datatracker.ietf.org/doc/html/rfc9260#section-6.2>:
        //
        //   When a packet arrives with duplicate DATA chunk(s) and with no new
        //   DATA chunk(s), the endpoint MUST immediately send a SACK with no
        //   delay.
        if is_duplicate {
            self.ack_state = AckState::Immediate;
        }

        // From <https://datatracker.ietf.org/doc/html/rfc9260#section-6.7>:
        //
        //   If the endpoint detects a gap in the received DATA chunk sequence,
        //   it SHOULD send a SACK with Gap Ack Blocks immediately.
        if !self.pending_blocks.is_empty() {
            self.ack_state = AckState::Immediate;
        }

        // From <https://datatracker.ietf.org/doc/html/rfc9260#section-5.1-8>:
        //
        //   After the reception of the first DATA chunk in an association, the
        //   endpoint MUST immediately respond with a SACK chunk.
        if !self.seen_any_data {
            self.seen_any_data = true;
            self.ack_state = AckState::Immediate;
        }

        if self.ack_state == AckState::Idle {
            self.ack_state = AckState::Deferred;
        }
        !is_duplicate
    }

    /// Applies a FORWARD-TSN advisory: the peer has abandoned everything up to
    /// `new_cumulative_tsn`. Returns whether the advisory had any effect; a
    /// stale advisory (at or behind the current ack point) is ignored, but
    /// still forces a SACK since it may indicate that a previous SACK was lost
    /// (RFC 3758 §3.6).
    pub fn advance_to(&mut self, new_cumulative_tsn: Tsn) -> bool {
        if new_cumulative_tsn <= self.cumulative_tsn_ack {
            self.ack_state = AckState::Immediate;
            return false;
        }

        self.cumulative_tsn_ack = new_cumulative_tsn;
        self.pending_blocks.retain_mut(|b| {
            if b.end <= new_cumulative_tsn {
                false
            } else {
                if b.start <= new_cumulative_tsn {
                    b.start = new_cumulative_tsn + 1;
                }
                true
            }
        });
        self.absorb_contiguous_blocks();

        // A SACK must follow promptly so the peer learns the skip was
        // accepted.
        self.ack_state = AckState::Immediate;
        true
    }

    /// Called at the end of processing one inbound packet; drives the
    /// packet-count rate limiter.
    pub fn observe_packet_end(&mut self) {
        if self.ack_state == AckState::Deferred {
            self.packets_since_sack += 1;
            if self.packets_since_sack >= self.sack_every_packets {
                self.ack_state = AckState::Immediate;
            }
        }
    }

    /// Whether a SACK should be produced now. Querying clears the flag, so a
    /// `true` result obliges the caller to actually send one.
    pub fn should_send_sack(&mut self) -> bool {
        if self.ack_state == AckState::Immediate {
            self.ack_state = AckState::Idle;
            self.packets_since_sack = 0;
            return true;
        }
        false
    }

    pub fn force_immediate_sack(&mut self) {
        self.ack_state = AckState::Immediate;
    }

    /// Builds a SACK from the current state. This drains the duplicate-TSN
    /// report, so the chunk must actually be sent.
    pub fn create_sack(&mut self, a_rwnd: u32) -> SackChunk {
        let cumulative_tsn_ack = self.cumulative_tsn_ack;

        let gap_ack_blocks: Vec<GapAckBlock> = self
            .pending_blocks
            .iter()
            .take(self.max_reported_gap_blocks)
            .filter_map(|b| {
                let start = u16::try_from(b.start.distance_to(cumulative_tsn_ack)).ok()?;
                let end = u16::try_from(b.end.distance_to(cumulative_tsn_ack) - 1).ok()?;
                Some(GapAckBlock { start, end })
            })
            .collect();

        SackChunk {
            cumulative_tsn_ack,
            a_rwnd,
            gap_ack_blocks,
            duplicate_tsns: std::mem::take(&mut self.reported_duplicates),
        }
    }

    fn note_duplicate(&mut self, tsn: Tsn) {
        self.duplicate_count += 1;
        if self.reported_duplicates.len() < self.max_reported_duplicate_tsns {
            self.reported_duplicates.push(tsn);
        }
    }

    /// After the cumulative ack has moved, absorb the first pending block if
    /// it's now contiguous with it. Blocks are coalesced on insertion, so one
    /// step suffices.
    fn absorb_contiguous_blocks(&mut self) {
        if let Some(first) = self.pending_blocks.first() {
            if first.start == self.cumulative_tsn_ack + 1 {
                self.cumulative_tsn_ack = first.end - 1;
                self.pending_blocks.remove(0);
            }
        }
    }

    /// Inserts a TSN above the cumulative ack into the pending blocks,
    /// extending or merging neighbours where possible. Returns `false` if the
    /// TSN was already present.
    fn insert_pending(&mut self, tsn: Tsn) -> bool {
        let idx = self.pending_blocks.partition_point(|r| r.start <= tsn);

        if idx > 0 && self.pending_blocks[idx - 1].contains(&tsn) {
            return false;
        }

        let extend_prev = idx > 0 && self.pending_blocks[idx - 1].end == tsn;
        let extend_next =
            idx < self.pending_blocks.len() && self.pending_blocks[idx].start == tsn + 1;

        match (extend_prev, extend_next) {
            (true, true) => {
                // The new TSN bridges two blocks into one.
                let next_end = self.pending_blocks[idx].end;
                self.pending_blocks[idx - 1].end = next_end;
                self.pending_blocks.remove(idx);
            }
            (true, false) => {
                self.pending_blocks[idx - 1].end = tsn + 1;
            }
            (false, true) => {
                self.pending_blocks[idx].start = tsn;
            }
            (false, false) => {
                self.pending_blocks.insert(idx, tsn..tsn + 1);
            }
        }
        true
    }
}
