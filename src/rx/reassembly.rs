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

use crate::packet::data::Data;
use crate::packet::forward_tsn_chunk::SkippedStream;
use crate::rx::read_queue::ReadEntry;
use crate::types::Ssn;
use crate::types::StreamId;
use crate::types::StreamKey;
use crate::types::Tsn;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Given a chunk map and a tsn that points inside a fragmented message,
/// returns the tsn which has the `is_beginning` bit set. Returns None if a gap
/// was found between `tsn` and the expected beginning.
fn find_beginning(chunks: &BTreeMap<Tsn, Data>, tsn: Tsn) -> Option<Tsn> {
    let mut expected_next = tsn + 1;
    for (tsn, data) in chunks.range(..=tsn).rev() {
        if *tsn + 1 != expected_next {
            return None;
        }
        if data.is_beginning {
            return Some(*tsn);
        }
        expected_next = *tsn;
    }
    None
}

/// Given a chunk map and a tsn that points inside a fragmented message,
/// returns the tsn which has the `is_end` bit set. Returns None if a gap was
/// found between `tsn` and the expected end.
fn find_end(chunks: &BTreeMap<Tsn, Data>, tsn: Tsn) -> Option<Tsn> {
    let mut prev = tsn - 1;
    for (tsn, data) in chunks.range(tsn..) {
        if prev + 1 != *tsn {
            return None;
        }
        prev = *tsn;
        if data.is_end {
            return Some(*tsn);
        }
    }
    None
}

type OnComplete<'a> = &'a mut dyn FnMut(ReadEntry);

/// Fragment reassembly for every stream of one association.
///
/// Streams come into existence when their first fragment arrives; there is no
/// fixed-size table. Ordered and unordered traffic on the same stream id are
/// tracked separately, as unordered messages are bounded by TSN contiguity
/// rather than by an SSN.
///
/// Each mutating operation reports how the number of buffered bytes changed,
/// which the dispatcher uses to enforce the receive-buffer quota. Completed
/// messages are emitted through the `on_complete` callback as [`ReadEntry`]
/// values; for ordered streams that happens strictly in SSN order.
pub struct StreamReassembly {
    ordered: HashMap<StreamId, OrderedStream>,
    unordered: HashMap<StreamId, UnorderedStream>,
    stale_fragments: u64,
}

impl StreamReassembly {
    pub fn new() -> Self {
        Self { ordered: HashMap::new(), unordered: HashMap::new(), stale_fragments: 0 }
    }

    /// Fragments dropped because their message had already been delivered or
    /// abandoned (late retransmissions after a FORWARD-TSN skip).
    pub fn stale_fragments(&self) -> u64 {
        self.stale_fragments
    }

    /// Adds one received fragment. Returns the change in buffered bytes; the
    /// value is negative when the fragment completed one or more messages,
    /// since their bytes leave this tracker through `on_complete`.
    pub fn add(&mut self, tsn: Tsn, data: Data, on_complete: OnComplete) -> isize {
        match data.stream_key {
            StreamKey::Ordered(id) => {
                let stream = self.ordered.entry(id).or_default();
                if data.ssn < stream.next_ssn {
                    // The message was already delivered or abandoned; the TSN
                    // dedup can't catch this after a FORWARD-TSN skip.
                    self.stale_fragments += 1;
                    log::debug!("dropping stale fragment for stream {id}, ssn {}", data.ssn);
                    return 0;
                }
                stream.add(tsn, data, on_complete)
            }
            StreamKey::Unordered(id) => self.unordered.entry(id).or_default().add(tsn, data, on_complete),
        }
    }

    /// Applies the abandonment side of a FORWARD-TSN: unordered fragments at
    /// or below `new_cumulative_ack` are freed, and each skipped (stream, SSN)
    /// has its partial messages freed with `next_ssn` advanced past them.
    /// Messages that were complete but blocked behind an abandoned one are
    /// released through `on_complete`.
    ///
    /// Returns the number of bytes that left this tracker.
    pub fn handle_forward_tsn(
        &mut self,
        new_cumulative_ack: Tsn,
        skipped_streams: &[SkippedStream],
        on_complete: OnComplete,
    ) -> usize {
        // The skip list only covers ordered streams; unordered chunks are
        // bounded by the new cumulative ack alone.
        let mut removed = 0;
        for stream in self.unordered.values_mut() {
            removed += stream.erase_to(new_cumulative_ack);
        }

        for skipped in skipped_streams {
            removed += self
                .ordered
                .entry(skipped.stream_id)
                .or_default()
                .abandon_up_to(skipped.ssn, on_complete);
        }
        removed
    }

    /// Frees every buffered fragment on every stream. Used by association
    /// teardown. Returns the number of bytes freed.
    pub fn reset(&mut self) -> usize {
        let mut freed = 0;
        for stream in self.ordered.values_mut() {
            freed += stream.free_all();
        }
        for stream in self.unordered.values_mut() {
            freed += stream.free_all();
        }
        freed
    }

    pub fn has_unassembled_fragments(&self) -> bool {
        self.ordered.values().any(|s| !s.fragments.is_empty())
            || self.unordered.values().any(|s| !s.chunks.is_empty())
    }
}

impl Default for StreamReassembly {
    fn default() -> Self {
        Self::new()
    }
}

/// Unordered reassembly: messages are delimited only by the B/E bits over
/// contiguous TSNs, so a single TSN-keyed map per stream suffices.
#[derive(Default)]
struct UnorderedStream {
    chunks: BTreeMap<Tsn, Data>,
}

impl UnorderedStream {
    fn add(&mut self, tsn: Tsn, data: Data, on_complete: OnComplete) -> isize {
        if data.is_beginning && data.is_end {
            // Single-fragment message; nothing to buffer.
            on_complete(ReadEntry::new(data.stream_key, data.ssn, data.ppid, data.payload, tsn, tsn));
            return 0;
        }
        let queued_bytes = data.payload.len() as isize;
        self.chunks.insert(tsn, data);

        queued_bytes - (self.try_assemble(tsn, on_complete) as isize)
    }

    fn try_assemble(&mut self, tsn: Tsn, on_complete: OnComplete) -> usize {
        let (Some(start_tsn), Some(end_tsn)) =
            (find_beginning(&self.chunks, tsn), find_end(&self.chunks, tsn))
        else {
            return 0;
        };

        // Single-fragment messages never reach the buffer, so the run spans
        // at least two chunks.
        debug_assert!(start_tsn != end_tsn);
        let first = self.chunks.remove(&start_tsn).unwrap();
        let stream_key = first.stream_key;
        let ssn = first.ssn;
        let ppid = first.ppid;
        let mut payload: Vec<u8> = first.payload;

        let mut tsn = start_tsn + 1;
        while tsn <= end_tsn {
            let mut c = self.chunks.remove(&tsn).unwrap();
            payload.append(&mut c.payload);
            tsn += 1;
        }

        let total_size = payload.len();
        on_complete(ReadEntry::new(stream_key, ssn, ppid, payload, start_tsn, end_tsn));
        total_size
    }

    fn erase_to(&mut self, new_cumulative_ack: Tsn) -> usize {
        let removed_bytes = self
            .chunks
            .range(..new_cumulative_ack + 1)
            .fold(0, |acc, (_, data)| acc + data.payload.len());

        self.chunks.retain(|tsn, _| *tsn > new_cumulative_ack);
        removed_bytes
    }

    fn free_all(&mut self) -> usize {
        let freed = self.chunks.values().map(|d| d.payload.len()).sum();
        self.chunks.clear();
        freed
    }
}

/// Ordered reassembly: fragments are grouped per SSN, and completed messages
/// are only released once every lower SSN on the stream has been delivered or
/// abandoned.
struct OrderedStream {
    fragments: BTreeMap<Ssn, BTreeMap<Tsn, Data>>,
    next_ssn: Ssn,
}

impl Default for OrderedStream {
    fn default() -> Self {
        Self { fragments: BTreeMap::new(), next_ssn: Ssn(0) }
    }
}

impl OrderedStream {
    fn add(&mut self, tsn: Tsn, data: Data, on_complete: OnComplete) -> isize {
        let at_head_of_line = data.ssn == self.next_ssn;

        let mut queued_bytes = 0;
        if at_head_of_line && data.is_beginning && data.is_end {
            // Single-fragment message at the head of the line; deliver
            // without buffering.
            on_complete(ReadEntry::new(data.stream_key, data.ssn, data.ppid, data.payload, tsn, tsn));
            self.next_ssn += 1;
        } else {
            queued_bytes += data.payload.len() as isize;
            self.fragments.entry(data.ssn).or_default().insert(tsn, data);
        }

        if at_head_of_line {
            queued_bytes -= self.release_in_order(on_complete) as isize;
        }

        queued_bytes
    }

    /// Releases messages from `next_ssn` onwards for as long as they are
    /// complete. Returns the number of released bytes.
    fn release_in_order(&mut self, on_complete: OnComplete) -> usize {
        let mut released_bytes = 0;

        while let Some(chunks) = self.fragments.get_mut(&self.next_ssn) {
            let (first_tsn, first_data) = chunks.first_key_value().unwrap();
            let (last_tsn, last_data) = chunks.last_key_value().unwrap();
            if !first_data.is_beginning
                || !last_data.is_end
                || first_tsn.distance_to(*last_tsn) != (chunks.len() as u32 - 1)
            {
                break;
            }
            let stream_key = first_data.stream_key;
            let ppid = first_data.ppid;
            let (first_tsn, last_tsn) = (*first_tsn, *last_tsn);
            let mut payload: Vec<u8> = vec![];
            for data in chunks.values_mut() {
                payload.append(&mut data.payload);
            }
            released_bytes += payload.len();
            on_complete(ReadEntry::new(stream_key, self.next_ssn, ppid, payload, first_tsn, last_tsn));
            self.fragments.remove(&self.next_ssn);
            self.next_ssn += 1;
        }

        released_bytes
    }

    /// Frees every partial message at or below `ssn`, moves `next_ssn` past
    /// it, and releases any now-unblocked complete messages. Returns the
    /// number of bytes that left the buffer (freed or released).
    fn abandon_up_to(&mut self, ssn: Ssn, on_complete: OnComplete) -> usize {
        let mut removed_bytes: usize = 0;
        self.fragments.retain(|cur_ssn, chunks| {
            if *cur_ssn <= ssn {
                removed_bytes += chunks.values().map(|data| data.payload.len()).sum::<usize>();
                false
            } else {
                true
            }
        });
        if ssn >= self.next_ssn {
            self.next_ssn = ssn + 1;
        }
        removed_bytes += self.release_in_order(on_complete);
        removed_bytes
    }

    fn free_all(&mut self) -> usize {
        let freed = self
            .fragments
            .values()
            .flat_map(|chunks| chunks.values())
            .map(|d| d.payload.len())
            .sum();
        self.fragments.clear();
        freed
    }
}
