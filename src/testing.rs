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
use crate::types::PpId;
use crate::types::Ssn;
use crate::types::StreamId;
use crate::types::StreamKey;

/// Produces `Data` fragments for tests, keeping track of the SSN so that
/// consecutive calls form consecutive messages. `flags` is a string containing
/// "B" and/or "E" for the beginning/end bits.
pub struct DataFactory {
    stream_id: StreamId,
    next_ssn: Ssn,
}

impl DataFactory {
    pub fn new(stream_id: StreamId) -> Self {
        DataFactory { stream_id, next_ssn: Ssn(0) }
    }

    pub fn ordered(&mut self, payload: &str, flags: &str) -> Data {
        let data = Data {
            stream_key: StreamKey::Ordered(self.stream_id),
            ssn: self.next_ssn,
            ppid: PpId(53),
            payload: payload.as_bytes().to_vec(),
            is_beginning: flags.contains('B'),
            is_end: flags.contains('E'),
        };
        if data.is_end {
            self.next_ssn += 1;
        }
        data
    }

    pub fn unordered(&mut self, payload: &str, flags: &str) -> Data {
        Data {
            stream_key: StreamKey::Unordered(self.stream_id),
            ssn: Ssn(0),
            ppid: PpId(53),
            payload: payload.as_bytes().to_vec(),
            is_beginning: flags.contains('B'),
            is_end: flags.contains('E'),
        }
    }
}
