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

/// One received data fragment, extracted from a DATA chunk.
///
/// This is what the reassembly side operates on, so that it doesn't need to be
/// aware of the wire encoding. The TSN is carried separately, as it identifies
/// the chunk rather than the message the fragment belongs to.
#[derive(Clone, Debug)]
pub struct Data {
    pub stream_key: StreamKey,
    pub ssn: Ssn,
    pub ppid: PpId,
    pub payload: Vec<u8>,
    pub is_beginning: bool,
    pub is_end: bool,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            stream_key: StreamKey::Ordered(StreamId(0)),
            ssn: Ssn(0),
            ppid: PpId(0),
            payload: Default::default(),
            is_beginning: false,
            is_end: false,
        }
    }
}
