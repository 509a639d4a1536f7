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
use crate::packet::chunk::RawChunk;
use crate::packet::data_chunk;
use crate::packet::data_chunk::DataChunk;
use crate::packet::forward_tsn_chunk;
use crate::packet::forward_tsn_chunk::ForwardTsnChunk;
use crate::packet::sack_chunk::SackChunk;
use crate::rx::read_queue::ReadEntry;
use crate::rx::read_queue::ReadQueue;
use crate::rx::reassembly::StreamReassembly;
use crate::rx::tsn_tracker::TsnTracker;
use crate::types::Tsn;
use thiserror::Error;

/// Errors surfaced to the association layer. None of them terminate the
/// association by themselves; that decision belongs to the caller.
#[derive(Debug, Error)]
pub enum RxError {
    /// A chunk's declared length is inconsistent with the remaining buffer,
    /// or its contents could not be parsed. Processing of the rest of the
    /// packet stops; chunks already applied stay applied.
    #[error("malformed chunk: {0}")]
    MalformedChunk(String),

    /// Accepting more data would exceed the receive-buffer quota. The caller
    /// should advertise a zero window; the rejected chunk can be retried once
    /// the consumer has drained the queue.
    #[error("receive buffer exhausted")]
    ResourceExhausted,

    /// The peer violated the protocol. The association layer decides whether
    /// to tear the association down.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

/// Counters for diagnostics, queried by the association layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct RxMetrics {
    /// Packets handed to `process_data`.
    pub rx_packets_count: u64,

    /// Messages fully reassembled and made readable.
    pub rx_messages_count: u64,

    /// Duplicate DATA chunks received and dropped.
    pub duplicate_tsn_count: u64,

    /// Fragments dropped because their message was already delivered or
    /// abandoned.
    pub stale_fragment_count: u64,
}

/// The entry point of the inbound-data engine.
///
/// Owns the TSN tracker, the per-stream reassembly state and the readable
/// queue of one association, and runs the receive pipeline over them: for
/// every DATA chunk, validate, then record the TSN, then reassemble — in that
/// order, so a chunk is marked received before it can affect delivery state.
///
/// All methods take `&mut self`: the caller holds the association's
/// serialization lock for the duration of each call and no locking happens
/// here.
pub struct InboundDispatcher {
    config: Config,
    tracker: TsnTracker,
    streams: StreamReassembly,
    read_queue: ReadQueue,

    /// Bytes buffered in `streams` (not yet in the read queue).
    reassembly_bytes: usize,

    drained: bool,
    rx_packets_count: u64,
    rx_messages_count: u64,
}

impl InboundDispatcher {
    pub fn new(peer_initial_tsn: Tsn, config: Config) -> Self {
        Self {
            tracker: TsnTracker::new(peer_initial_tsn, &config),
            streams: StreamReassembly::new(),
            read_queue: ReadQueue::new(),
            reassembly_bytes: 0,
            drained: false,
            rx_packets_count: 0,
            rx_messages_count: 0,
            config,
        }
    }

    /// Processes the chunk payload of one inbound packet: a buffer of one or
    /// more back-to-back chunks, in wire order.
    ///
    /// DATA chunks run the receive pipeline and FORWARD-TSN chunks bundled in
    /// the same packet are routed to [`Self::handle_forward_tsn`]; any other
    /// chunk type belongs to the association layer and is skipped here.
    ///
    /// On error, chunks processed before the failing one remain applied and
    /// the rest of the buffer is not examined.
    pub fn process_data(&mut self, mut payload: &[u8]) -> Result<(), RxError> {
        if self.drained {
            log::debug!("discarding {} byte(s) of data after drain", payload.len());
            return Ok(());
        }
        self.rx_packets_count += 1;

        let result = loop {
            if payload.is_empty() {
                break Ok(());
            }
            let raw = match RawChunk::from_bytes(payload) {
                Ok((raw, rest)) => {
                    payload = rest;
                    raw
                }
                Err(e) => break Err(RxError::MalformedChunk(e.to_string())),
            };
            let applied = match raw.typ {
                data_chunk::CHUNK_TYPE => DataChunk::try_from(raw)
                    .map_err(|e| RxError::MalformedChunk(e.to_string()))
                    .and_then(|chunk| self.apply_data_chunk(chunk)),
                forward_tsn_chunk::CHUNK_TYPE => ForwardTsnChunk::try_from(raw)
                    .map_err(|e| RxError::MalformedChunk(e.to_string()))
                    .and_then(|chunk| self.apply_forward_tsn(&chunk)),
                typ => {
                    log::debug!("skipping chunk type {typ}; not handled on the receive path");
                    Ok(())
                }
            };
            if let Err(e) = applied {
                break Err(e);
            }
        };

        // The packet ends here even if part of it was malformed.
        self.tracker.observe_packet_end();
        result
    }

    /// Consumes a FORWARD-TSN advisory: advances the cumulative ack past
    /// abandoned data, frees the affected reassembly state and releases any
    /// ordered messages that were blocked behind an abandoned one. A stale
    /// advisory is ignored (a SACK is still scheduled, as the peer may have
    /// missed the previous one).
    pub fn handle_forward_tsn(&mut self, chunk: &ForwardTsnChunk) -> Result<(), RxError> {
        if self.drained {
            return Ok(());
        }
        self.apply_forward_tsn(chunk)
    }

    /// The receive window to advertise: the part of the buffer quota not
    /// occupied by buffered-but-undelivered data.
    pub fn calc_rwnd(&self) -> u32 {
        let available = self.config.max_receive_buffer_size.saturating_sub(self.buffered_bytes());
        u32::try_from(available).unwrap_or(u32::MAX)
    }

    /// Bytes held by the engine: fragments in reassembly plus readable
    /// messages not yet consumed.
    pub fn buffered_bytes(&self) -> usize {
        self.reassembly_bytes + self.read_queue.queued_bytes()
    }

    /// Whether a SACK must be produced now. Querying clears the flag.
    pub fn should_send_sack(&mut self) -> bool {
        self.tracker.should_send_sack()
    }

    /// Builds the SACK for the current state, with the advertised window
    /// already filled in. The chunk must actually be sent, as this drains the
    /// duplicate-TSN report.
    pub fn create_sack(&mut self) -> SackChunk {
        let a_rwnd = self.calc_rwnd();
        self.tracker.create_sack(a_rwnd)
    }

    pub fn cumulative_tsn_ack(&self) -> Tsn {
        self.tracker.cumulative_tsn_ack()
    }

    /// The number of fully reassembled messages ready for the consumer.
    pub fn messages_ready_count(&self) -> usize {
        self.read_queue.len()
    }

    /// Removes and returns the next readable message, in delivery order.
    pub fn poll_message(&mut self) -> Option<ReadEntry> {
        self.read_queue.pop()
    }

    /// Reads up to `max_len` bytes of the message at the head of the readable
    /// queue; see [`ReadQueue::take_front`].
    pub fn read(&mut self, max_len: usize) -> Option<(Vec<u8>, bool)> {
        self.read_queue.take_front(max_len)
    }

    /// Association teardown: abandons all in-progress reassembly and aborts
    /// the readable queue, releasing the buffers. Idempotent; data arriving
    /// after the drain is discarded.
    pub fn drain(&mut self) {
        if self.drained {
            return;
        }
        self.drained = true;
        let freed = self.streams.reset();
        self.reassembly_bytes = self.reassembly_bytes.saturating_sub(freed);
        self.read_queue.abort_all();
        log::debug!("drained association rx state, freed {freed} buffered byte(s)");
    }

    pub fn metrics(&self) -> RxMetrics {
        RxMetrics {
            rx_packets_count: self.rx_packets_count,
            rx_messages_count: self.rx_messages_count,
            duplicate_tsn_count: self.tracker.duplicate_count(),
            stale_fragment_count: self.streams.stale_fragments(),
        }
    }

    fn apply_data_chunk(&mut self, chunk: DataChunk) -> Result<(), RxError> {
        let DataChunk { tsn, immediate_ack, data } = chunk;

        if data.payload.is_empty() {
            // From <https://datatracker.ietf.org/doc/html/rfc9260#section-3.3.1>:
            //
            //   An endpoint MUST NOT send a DATA chunk with no user data.
            return Err(RxError::ProtocolViolation(format!(
                "DATA chunk with tsn {tsn} has no user data"
            )));
        }
        if self.buffered_bytes() + data.payload.len() > self.config.max_receive_buffer_size {
            // Rejected before the TSN is recorded, so that a retransmission
            // after the consumer has drained is not mistaken for a duplicate.
            return Err(RxError::ResourceExhausted);
        }
        if !self.tracker.is_tsn_acceptable(tsn) {
            log::debug!("dropping tsn {tsn}; too far from cumulative ack");
            return Ok(());
        }

        if self.tracker.record(tsn) {
            let streams = &mut self.streams;
            let read_queue = &mut self.read_queue;
            let messages = &mut self.rx_messages_count;
            let delta = streams.add(tsn, data, &mut |entry| {
                *messages += 1;
                read_queue.push(entry);
            });
            self.reassembly_bytes = self.reassembly_bytes.wrapping_add_signed(delta);
        }

        if immediate_ack {
            self.tracker.force_immediate_sack();
        }
        Ok(())
    }

    fn apply_forward_tsn(&mut self, chunk: &ForwardTsnChunk) -> Result<(), RxError> {
        let new_cumulative_tsn = chunk.new_cumulative_tsn;
        if !self.tracker.is_tsn_acceptable(new_cumulative_tsn) {
            return Err(RxError::ProtocolViolation(format!(
                "FORWARD-TSN to {new_cumulative_tsn} is outside the acceptance window"
            )));
        }

        if !self.tracker.advance_to(new_cumulative_tsn) {
            log::debug!("ignoring stale FORWARD-TSN to {new_cumulative_tsn}");
            return Ok(());
        }

        let streams = &mut self.streams;
        let read_queue = &mut self.read_queue;
        let messages = &mut self.rx_messages_count;
        let removed = streams.handle_forward_tsn(
            new_cumulative_tsn,
            &chunk.skipped_streams,
            &mut |entry| {
                *messages += 1;
                read_queue.push(entry);
            },
        );
        self.reassembly_bytes = self.reassembly_bytes.saturating_sub(removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::data::Data;
    use crate::packet::forward_tsn_chunk::SkippedStream;
    use crate::packet::SerializableTlv;
    use crate::testing::DataFactory;
    use crate::types::Ssn;
    use crate::types::StreamId;
    use crate::types::StreamKey;

    const INITIAL_TSN: Tsn = Tsn(10);

    fn make_dispatcher() -> InboundDispatcher {
        InboundDispatcher::new(INITIAL_TSN, Config::default())
    }

    /// Serializes chunks back-to-back with wire padding, as they would appear
    /// in one packet.
    fn packet_of(chunks: &[&dyn SerializableTlv]) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in chunks {
            let start = out.len();
            out.resize(start + chunk.serialized_size(), 0);
            chunk.serialize_to(&mut out[start..]);
            while out.len() % 4 != 0 {
                out.push(0);
            }
        }
        out
    }

    fn data_chunk(tsn: u32, data: Data) -> DataChunk {
        DataChunk { tsn: Tsn(tsn), immediate_ack: false, data }
    }

    #[test]
    fn delivers_message_from_in_order_fragments() {
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        let packet = packet_of(&[
            &data_chunk(10, gen.ordered("aaa", "B")),
            &data_chunk(11, gen.ordered("bbb", "")),
            &data_chunk(12, gen.ordered("ccc", "E")),
        ]);
        d.process_data(&packet).unwrap();

        assert_eq!(d.cumulative_tsn_ack(), Tsn(12));
        assert_eq!(d.messages_ready_count(), 1);
        let entry = d.poll_message().unwrap();
        assert_eq!(entry.payload(), b"aaabbbccc");
        assert_eq!(entry.stream_id, StreamId(0));
        assert_eq!(entry.ssn, Ssn(0));
        assert_eq!(entry.first_tsn, Tsn(10));
        assert_eq!(entry.last_tsn, Tsn(12));
        assert_eq!(d.buffered_bytes(), 0);
    }

    #[test]
    fn delivers_identical_message_from_out_of_order_fragments() {
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        let first = gen.ordered("aaa", "B");
        let middle = gen.ordered("bbb", "");
        let last = gen.ordered("ccc", "E");
        let packet = packet_of(&[
            &data_chunk(11, middle),
            &data_chunk(10, first),
            &data_chunk(12, last),
        ]);
        d.process_data(&packet).unwrap();

        assert_eq!(d.cumulative_tsn_ack(), Tsn(12));
        let entry = d.poll_message().unwrap();
        assert_eq!(entry.payload(), b"aaabbbccc");
        assert_eq!(d.buffered_bytes(), 0);
    }

    #[test]
    fn duplicate_of_acked_chunk_changes_nothing() {
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        let chunk = gen.ordered("aaa", "BE");
        d.process_data(&packet_of(&[&data_chunk(10, chunk.clone())])).unwrap();
        assert_eq!(d.cumulative_tsn_ack(), Tsn(10));
        assert_eq!(d.messages_ready_count(), 1);

        d.process_data(&packet_of(&[&data_chunk(10, chunk)])).unwrap();
        assert_eq!(d.cumulative_tsn_ack(), Tsn(10));
        assert_eq!(d.messages_ready_count(), 1);
        assert_eq!(d.metrics().duplicate_tsn_count, 1);
        assert!(d.should_send_sack());
    }

    #[test]
    fn gap_is_reported_and_forces_sack() {
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        let packet = packet_of(&[
            &data_chunk(10, gen.ordered("a", "BE")),
            &data_chunk(12, gen.ordered("c", "BE")),
        ]);
        d.process_data(&packet).unwrap();

        assert!(d.should_send_sack());
        let sack = d.create_sack();
        assert_eq!(sack.cumulative_tsn_ack, Tsn(10));
        assert_eq!(sack.gap_ack_blocks.len(), 1);
        assert_eq!(sack.gap_ack_blocks[0].start, 2);
        assert_eq!(sack.gap_ack_blocks[0].end, 2);
    }

    #[test]
    fn malformed_chunk_keeps_earlier_chunks_applied() {
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        let mut packet = packet_of(&[&data_chunk(10, gen.ordered("aa", "BE"))]);
        // A truncated chunk header after the valid chunk.
        packet.extend_from_slice(&[0x00, 0x03, 0x00, 0xff]);

        let err = d.process_data(&packet).unwrap_err();
        assert!(matches!(err, RxError::MalformedChunk(_)));

        // The first chunk survived.
        assert_eq!(d.cumulative_tsn_ack(), Tsn(10));
        assert_eq!(d.messages_ready_count(), 1);
    }

    #[test]
    fn empty_data_chunk_is_a_protocol_violation() {
        let mut d = make_dispatcher();
        let chunk = data_chunk(
            10,
            Data {
                stream_key: StreamKey::Ordered(StreamId(0)),
                is_beginning: true,
                is_end: true,
                ..Default::default()
            },
        );
        let err = d.process_data(&packet_of(&[&chunk])).unwrap_err();
        assert!(matches!(err, RxError::ProtocolViolation(_)));
        assert_eq!(d.cumulative_tsn_ack(), Tsn(9));
    }

    #[test]
    fn skips_chunk_types_outside_the_receive_path() {
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        // A HEARTBEAT chunk (type 4) followed by DATA.
        let mut packet = vec![0x04, 0x00, 0x00, 0x04];
        packet.extend_from_slice(&packet_of(&[&data_chunk(10, gen.ordered("aa", "BE"))]));

        d.process_data(&packet).unwrap();
        assert_eq!(d.messages_ready_count(), 1);
    }

    #[test]
    fn forward_tsn_advances_and_unblocks() {
        // Scenario: ssn 3 is mid-reassembly, ssn 4 is complete but blocked.
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        let mut chunks: Vec<DataChunk> = Vec::new();
        for ssn in 0..3 {
            chunks.push(data_chunk(10 + ssn, gen.ordered("x", "BE")));
        }
        chunks.push(data_chunk(13, gen.ordered("part", "B"))); // ssn 3, no end
        chunks.push(data_chunk(15, gen.ordered("whole", "BE"))); // ssn 4; tsn 14 missing

        let refs: Vec<&dyn SerializableTlv> =
            chunks.iter().map(|c| c as &dyn SerializableTlv).collect();
        d.process_data(&packet_of(&refs)).unwrap();

        // SSNs 0..2 delivered, 3 partial, 4 blocked.
        assert_eq!(d.messages_ready_count(), 3);
        assert_eq!(d.cumulative_tsn_ack(), Tsn(13));

        let advisory = ForwardTsnChunk {
            new_cumulative_tsn: Tsn(15),
            skipped_streams: vec![SkippedStream { stream_id: StreamId(0), ssn: Ssn(3) }],
        };
        d.handle_forward_tsn(&advisory).unwrap();

        assert_eq!(d.cumulative_tsn_ack(), Tsn(15));
        assert_eq!(d.messages_ready_count(), 4);
        assert!(d.should_send_sack());

        let last = {
            let mut entry = None;
            while let Some(e) = d.poll_message() {
                entry = Some(e);
            }
            entry.unwrap()
        };
        assert_eq!(last.ssn, Ssn(4));
        assert_eq!(last.payload(), b"whole");
        // The abandoned partial fragment was freed.
        assert_eq!(d.buffered_bytes(), 0);
    }

    #[test]
    fn forward_tsn_in_packet_buffer_is_processed_in_wire_order() {
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        gen.ordered("lost", "BE"); // ssn 0, tsn 10, never arrives
        let advisory =
            ForwardTsnChunk {
                new_cumulative_tsn: Tsn(10),
                skipped_streams: vec![SkippedStream { stream_id: StreamId(0), ssn: Ssn(0) }],
            };
        let packet =
            packet_of(&[&advisory, &data_chunk(11, gen.ordered("kept", "BE"))]);
        d.process_data(&packet).unwrap();

        assert_eq!(d.cumulative_tsn_ack(), Tsn(11));
        let entry = d.poll_message().unwrap();
        assert_eq!(entry.payload(), b"kept");
        assert_eq!(entry.ssn, Ssn(1));
    }

    #[test]
    fn stale_forward_tsn_is_ignored() {
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        d.process_data(&packet_of(&[&data_chunk(10, gen.ordered("aa", "BE"))])).unwrap();
        assert_eq!(d.cumulative_tsn_ack(), Tsn(10));

        let advisory = ForwardTsnChunk { new_cumulative_tsn: Tsn(9), skipped_streams: vec![] };
        d.handle_forward_tsn(&advisory).unwrap();
        assert_eq!(d.cumulative_tsn_ack(), Tsn(10));
        assert!(d.should_send_sack());
    }

    #[test]
    fn forward_tsn_outside_window_is_a_protocol_violation() {
        let mut d = make_dispatcher();
        let advisory = ForwardTsnChunk {
            new_cumulative_tsn: Tsn(9) + Config::default().max_tsn_offset + 1,
            skipped_streams: vec![],
        };
        let err = d.handle_forward_tsn(&advisory).unwrap_err();
        assert!(matches!(err, RxError::ProtocolViolation(_)));
        assert_eq!(d.cumulative_tsn_ack(), Tsn(9));
    }

    #[test]
    fn quota_exceeded_rejects_then_recovers_after_drain_by_consumer() {
        let config = Config { max_receive_buffer_size: 8, ..Config::default() };
        let mut d = InboundDispatcher::new(INITIAL_TSN, config);
        let mut gen = DataFactory::new(StreamId(0));

        d.process_data(&packet_of(&[&data_chunk(10, gen.ordered("123456", "BE"))])).unwrap();
        assert_eq!(d.buffered_bytes(), 6);

        // 6 + 6 > 8: rejected without recording the TSN.
        let retry = gen.ordered("abcdef", "BE");
        let err =
            d.process_data(&packet_of(&[&data_chunk(11, retry.clone())])).unwrap_err();
        assert!(matches!(err, RxError::ResourceExhausted));
        assert_eq!(d.cumulative_tsn_ack(), Tsn(10));
        assert_eq!(d.calc_rwnd(), 2);

        // The consumer drains, and the retransmission is accepted.
        assert_eq!(d.poll_message().unwrap().payload(), b"123456");
        d.process_data(&packet_of(&[&data_chunk(11, retry)])).unwrap();
        assert_eq!(d.cumulative_tsn_ack(), Tsn(11));
        assert_eq!(d.poll_message().unwrap().payload(), b"abcdef");
    }

    #[test]
    fn rwnd_shrinks_with_buffered_data() {
        let config = Config { max_receive_buffer_size: 100, ..Config::default() };
        let mut d = InboundDispatcher::new(INITIAL_TSN, config);
        let mut gen = DataFactory::new(StreamId(0));
        assert_eq!(d.calc_rwnd(), 100);

        // A fragment without its end stays buffered in reassembly.
        d.process_data(&packet_of(&[&data_chunk(10, gen.ordered("0123456789", "B"))])).unwrap();
        assert_eq!(d.calc_rwnd(), 90);

        d.process_data(&packet_of(&[&data_chunk(11, gen.ordered("0123456789", "E"))])).unwrap();
        // Completed: still counted until the consumer takes it.
        assert_eq!(d.calc_rwnd(), 80);

        d.poll_message().unwrap();
        assert_eq!(d.calc_rwnd(), 100);
    }

    #[test]
    fn sack_carries_the_advertised_window() {
        let config = Config { max_receive_buffer_size: 50, ..Config::default() };
        let mut d = InboundDispatcher::new(INITIAL_TSN, config);
        let mut gen = DataFactory::new(StreamId(0));

        d.process_data(&packet_of(&[&data_chunk(10, gen.ordered("12345", "B"))])).unwrap();
        let sack = d.create_sack();
        assert_eq!(sack.a_rwnd, 45);
        assert_eq!(sack.cumulative_tsn_ack, Tsn(10));
    }

    #[test]
    fn immediate_ack_bit_forces_sack() {
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        d.process_data(&packet_of(&[&data_chunk(10, gen.ordered("a", "BE"))])).unwrap();
        assert!(d.should_send_sack()); // first chunk of the association

        d.process_data(&packet_of(&[&data_chunk(11, gen.ordered("b", "BE"))])).unwrap();
        assert!(!d.should_send_sack()); // deferred by the rate limiter

        let chunk =
            DataChunk { tsn: Tsn(12), immediate_ack: true, data: gen.ordered("c", "BE") };
        d.process_data(&packet_of(&[&chunk])).unwrap();
        assert!(d.should_send_sack());
    }

    #[test]
    fn drain_is_idempotent_and_final() {
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        d.process_data(&packet_of(&[&data_chunk(10, gen.ordered("abc", "B"))])).unwrap();
        d.process_data(&packet_of(&[&data_chunk(12, gen.ordered("xyz", "BE"))])).unwrap();
        assert!(d.buffered_bytes() > 0);

        d.drain();
        assert_eq!(d.buffered_bytes(), 0);
        assert_eq!(d.messages_ready_count(), 0);

        d.drain();
        assert_eq!(d.buffered_bytes(), 0);
        assert_eq!(d.messages_ready_count(), 0);

        // Data after teardown is discarded silently.
        d.process_data(&packet_of(&[&data_chunk(11, gen.ordered("late", "BE"))])).unwrap();
        assert_eq!(d.messages_ready_count(), 0);
        assert_eq!(d.buffered_bytes(), 0);
    }

    #[test]
    fn partial_reads_via_dispatcher() {
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        d.process_data(&packet_of(&[&data_chunk(10, gen.ordered("abcdef", "BE"))])).unwrap();

        let (bytes, finished) = d.read(4).unwrap();
        assert_eq!(bytes, b"abcd".to_vec());
        assert!(!finished);
        assert_eq!(d.calc_rwnd(), Config::default().max_receive_buffer_size as u32 - 2);

        let (bytes, finished) = d.read(4).unwrap();
        assert_eq!(bytes, b"ef".to_vec());
        assert!(finished);
        assert!(d.read(1).is_none());
    }

    #[test]
    fn counts_messages_and_packets() {
        let mut d = make_dispatcher();
        let mut gen = DataFactory::new(StreamId(0));

        d.process_data(&packet_of(&[&data_chunk(10, gen.ordered("a", "BE"))])).unwrap();
        d.process_data(&packet_of(&[&data_chunk(11, gen.ordered("b", "BE"))])).unwrap();

        let metrics = d.metrics();
        assert_eq!(metrics.rx_packets_count, 2);
        assert_eq!(metrics.rx_messages_count, 2);
        assert_eq!(metrics.duplicate_tsn_count, 0);
    }
}
