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

/// Tunables for the inbound-data engine.
#[derive(Clone, Debug)]
pub struct Config {
    /// Quota for buffered-but-undelivered bytes, covering both fragments
    /// still in reassembly and completed messages the consumer hasn't read
    /// yet. This is what the advertised receiver window (`a_rwnd`) is
    /// computed from, and exceeding it makes `process_data` fail with
    /// `ResourceExhausted` so the caller can advertise a zero window.
    pub max_receive_buffer_size: usize,

    /// SACK rate limiting: produce a SACK at least every this many packets
    /// when no loss is observed. RFC 9260 §6.2 asks for an acknowledgement
    /// for at least every second packet, hence the default of 2. Loss,
    /// duplicates, the I bit and FORWARD-TSN all force an immediate SACK
    /// regardless of this setting.
    pub sack_every_packets: u32,

    /// The maximum number of duplicate TSNs reported in a single SACK.
    pub max_reported_duplicate_tsns: usize,

    /// The maximum number of gap-ack-blocks reported in a single SACK.
    pub max_reported_gap_blocks: usize,

    /// The acceptance window: the maximum distance between the cumulative
    /// ack TSN and any TSN this engine will buffer. Data beyond the window
    /// is dropped, which forces the transmitter to send data that actually
    /// advances the cumulative ack.
    pub max_tsn_offset: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_receive_buffer_size: 5 * 1024 * 1024,
            sack_every_packets: 2,
            max_reported_duplicate_tsns: 20,
            max_reported_gap_blocks: 20,
            max_tsn_offset: 100_000,
        }
    }
}
