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

use crate::types::PpId;
use crate::types::Ssn;
use crate::types::StreamId;
use crate::types::StreamKey;
use crate::types::Tsn;
use std::collections::VecDeque;
use std::mem;

/// One reassembled, user-deliverable message.
///
/// Entries are created fully assembled: `end_added` is set from construction,
/// and the payload is immutable from then on except for consumption by the
/// reader. `some_taken` records that a partial read has happened, and
/// `aborted` that the association was torn down while the reader was mid-way
/// through the message.
#[derive(Debug)]
pub struct ReadEntry {
    pub stream_id: StreamId,
    pub ssn: Ssn,
    pub unordered: bool,
    pub ppid: PpId,

    /// The lowest TSN this message subsumes.
    pub first_tsn: Tsn,
    /// The highest TSN this message subsumes.
    pub last_tsn: Tsn,

    pub end_added: bool,
    pub aborted: bool,
    pub some_taken: bool,

    payload: Vec<u8>,
}

impl ReadEntry {
    pub(crate) fn new(
        stream_key: StreamKey,
        ssn: Ssn,
        ppid: PpId,
        payload: Vec<u8>,
        first_tsn: Tsn,
        last_tsn: Tsn,
    ) -> Self {
        Self {
            stream_id: stream_key.id(),
            ssn,
            unordered: stream_key.is_unordered(),
            ppid,
            first_tsn,
            last_tsn,
            end_added: true,
            aborted: false,
            some_taken: false,
            payload,
        }
    }

    /// The bytes not yet consumed by the reader.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Consumes the whole remaining payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Takes up to `max_len` bytes off the front of the payload, marking the
    /// entry as partially consumed.
    pub(crate) fn take(&mut self, max_len: usize) -> Vec<u8> {
        self.some_taken = true;
        if max_len >= self.payload.len() {
            mem::take(&mut self.payload)
        } else {
            let rest = self.payload.split_off(max_len);
            mem::replace(&mut self.payload, rest)
        }
    }
}

/// The per-association FIFO of messages ready for the consumer.
///
/// Bytes parked here still count against the receive-buffer quota; they are
/// released as the consumer pops messages or reads byte ranges off the front.
#[derive(Default)]
pub struct ReadQueue {
    entries: VecDeque<ReadEntry>,
    queued_bytes: usize,
}

impl ReadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: ReadEntry) {
        self.queued_bytes += entry.len();
        self.entries.push_back(entry);
    }

    /// The number of messages ready to be consumed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of undelivered bytes parked in this queue.
    pub fn queued_bytes(&self) -> usize {
        self.queued_bytes
    }

    pub fn front(&self) -> Option<&ReadEntry> {
        self.entries.front()
    }

    /// Removes and returns the next message in full.
    pub fn pop(&mut self) -> Option<ReadEntry> {
        let entry = self.entries.pop_front()?;
        self.queued_bytes -= entry.len();
        Some(entry)
    }

    /// Reads up to `max_len` bytes from the message at the head of the queue.
    /// The entry stays at the head, flagged `some_taken`, until its payload is
    /// exhausted. Returns the bytes and whether the message was finished by
    /// this read.
    pub fn take_front(&mut self, max_len: usize) -> Option<(Vec<u8>, bool)> {
        let entry = self.entries.front_mut()?;
        let bytes = entry.take(max_len);
        self.queued_bytes -= bytes.len();
        let finished = entry.is_empty();
        if finished {
            self.entries.pop_front();
        }
        Some((bytes, finished))
    }

    /// Aborts everything in the queue. A message the reader has already
    /// started consuming stays visible, flagged `aborted`, so the truncation
    /// can be observed; untouched messages are dropped. Returns the number of
    /// bytes freed.
    pub(crate) fn abort_all(&mut self) -> usize {
        let mut freed = 0;
        self.entries.retain_mut(|entry| {
            if entry.some_taken && !entry.is_empty() {
                entry.aborted = true;
                true
            } else {
                freed += entry.len();
                false
            }
        });
        self.queued_bytes -= freed;
        freed
    }
}
