use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use bytes::{BufMut, Bytes, BytesMut};
use lorakiss_ax25::aprs::strip_lora_header;
use lorakiss_ax25::{append_signal_report, Dialect, LinkFrame, LORA_APRS_HEADER};
use lorakiss_frame::{decode_frame, encode_frame, CMD_DATA};
use tracing::{debug, info};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::events::{BridgeEvent, EventSink, TracingSink};
use crate::peers::PeerSet;
use crate::queue::TxQueue;
use crate::radio::{Radio, RadioPacket};

/// Largest payload a LoRa packet can carry.
pub const MAX_AIR_PAYLOAD: usize = 255;

/// Translates between KISS clients and the radio.
///
/// One bridge is shared (behind an `Arc`) by the client reader threads, the
/// radio receive path and the transmit loop.
pub struct Bridge {
    config: BridgeConfig,
    queue: TxQueue,
    peers: PeerSet,
    sink: Arc<dyn EventSink>,
}

impl Bridge {
    /// Create a bridge that reports events through `tracing`.
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Create a bridge with an explicit event sink.
    pub fn with_sink(config: BridgeConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            queue: TxQueue::new(),
            peers: PeerSet::new(),
            sink,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Payloads waiting for the radio.
    pub fn queue(&self) -> &TxQueue {
        &self.queue
    }

    /// Connected KISS clients.
    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }

    pub(crate) fn record(&self, event: BridgeEvent) {
        self.sink.record(&event);
    }

    /// Translate one delimited KISS frame into a queued radio payload.
    ///
    /// The data frame must hold a valid binary AX.25 UI frame. In binary
    /// dialect the frame bytes are queued unchanged; in path notation the
    /// rendered text is queued.
    pub fn translate_uplink(&self, raw: &[u8]) -> Result<Bytes> {
        let kiss = decode_frame(raw)?;
        let link = kiss.data_payload()?;
        let frame = LinkFrame::decode(link)?;

        let payload = match self.config.tx_dialect {
            Dialect::Binary => link.clone(),
            Dialect::PathNotation => frame.to_path_notation(),
        };
        let air_len = self.air_len(&payload);
        if air_len > MAX_AIR_PAYLOAD {
            return Err(BridgeError::EncodingFailure(format!(
                "{air_len} byte packet exceeds the {MAX_AIR_PAYLOAD} byte LoRa limit"
            )));
        }
        Ok(payload)
    }

    /// Queue a frame received from a KISS client. Never blocks on the radio.
    ///
    /// A frame that cannot be translated is dropped and reported; the
    /// error is returned for the caller's information only.
    pub fn handle_kiss_frame(&self, raw: &[u8]) -> Result<()> {
        match self.translate_uplink(raw) {
            Ok(payload) => {
                let size = payload.len();
                self.queue.push(payload);
                self.record(BridgeEvent::FrameQueued {
                    size,
                    queued: self.queue.len(),
                });
                Ok(())
            }
            Err(err) => {
                self.record(BridgeEvent::FrameDropped {
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Translate a received radio packet into a delimited KISS data frame.
    ///
    /// Packets carrying the LoRa-APRS header are path notation; others are
    /// binary AX.25 and are forwarded byte for byte once validated.
    pub fn translate_downlink(&self, packet: &RadioPacket) -> Result<Bytes> {
        let (dialect, body) = self.rx_dialect(&packet.payload);
        let frame = LinkFrame::decode_as(body, dialect)?;

        let mut link = BytesMut::with_capacity(body.len() + 64);
        match dialect {
            Dialect::Binary => link.put_slice(body),
            Dialect::PathNotation => frame.encode_into(&mut link)?,
        }
        if self.config.append_signal_report {
            let strip = self.config.strip_newline.applies_to(dialect);
            append_signal_report(&mut link, frame.data_type(), &packet.report, strip);
        }

        let mut wire = BytesMut::with_capacity(link.len() + 8);
        encode_frame(CMD_DATA, &link, &mut wire);
        Ok(wire.freeze())
    }

    /// Deliver a radio packet to every connected client.
    ///
    /// Returns the number of clients written to. Untranslatable packets
    /// are dropped and reported.
    pub fn handle_radio_packet(&self, packet: &RadioPacket) -> Result<usize> {
        let wire = match self.translate_downlink(packet) {
            Ok(wire) => wire,
            Err(err) => {
                self.record(BridgeEvent::FrameDropped {
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        let peers = self.peers.broadcast(&wire);
        self.record(BridgeEvent::Received {
            size: packet.payload.len(),
            rssi: packet.report.rssi,
            snr: packet.report.snr,
            peers,
        });
        Ok(peers)
    }

    /// Bytes to put on the air for a queued payload.
    pub fn prepare_transmission(&self, payload: Bytes) -> Bytes {
        if self.config.tx_dialect != Dialect::PathNotation {
            return payload;
        }

        let payload = if self.config.unwrap_third_party {
            LinkFrame::from_path_notation(&payload)
                .ok()
                .and_then(|frame| frame.third_party_inner())
                .unwrap_or(payload)
        } else {
            payload
        };

        if !self.config.lora_header {
            return payload;
        }
        let mut air = BytesMut::with_capacity(LORA_APRS_HEADER.len() + payload.len());
        air.put_slice(&LORA_APRS_HEADER);
        air.put_slice(&payload);
        air.freeze()
    }

    /// One transmit step.
    ///
    /// When the queue is non-empty and the channel is idle, the oldest
    /// payload is dequeued and transmitted. While the channel is busy the
    /// queue is left untouched. Returns whether a packet was sent.
    pub fn poll_transmit<R: Radio + ?Sized>(&self, radio: &mut R) -> Result<bool> {
        if self.queue.is_empty() {
            return Ok(false);
        }

        let busy = radio
            .channel_busy(self.config.busy_timeout())
            .inspect_err(|err| {
                self.record(BridgeEvent::TransmitFailed {
                    reason: err.to_string(),
                })
            })?;
        if busy {
            self.record(BridgeEvent::ChannelBusy {
                queued: self.queue.len(),
            });
            return Ok(false);
        }

        let Some(payload) = self.queue.try_pop() else {
            return Ok(false);
        };
        let air = self.prepare_transmission(payload);
        match radio.transmit(&air) {
            Ok(()) => {
                self.record(BridgeEvent::Transmitted { size: air.len() });
                Ok(true)
            }
            Err(err) => {
                self.record(BridgeEvent::TransmitFailed {
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Drain the queue into `radio` until `running` turns false.
    ///
    /// At most one packet is sent per poll interval.
    pub fn run_transmitter<R: Radio + ?Sized>(&self, radio: &mut R, running: &AtomicBool) {
        info!(
            dialect = %self.config.tx_dialect,
            poll_ms = self.config.poll_interval_ms,
            "transmit loop started"
        );
        while running.load(Ordering::SeqCst) {
            if let Err(err) = self.poll_transmit(radio) {
                debug!(error = %err, "transmit step failed");
            }
            thread::sleep(self.config.poll_interval());
        }
        info!(pending = self.queue.len(), "transmit loop stopped");
    }

    fn rx_dialect<'a>(&self, payload: &'a [u8]) -> (Dialect, &'a [u8]) {
        match strip_lora_header(payload) {
            Some(body) => (Dialect::PathNotation, body),
            None if self.config.lora_header => (Dialect::Binary, payload),
            None => (self.config.tx_dialect, payload),
        }
    }

    fn air_len(&self, payload: &[u8]) -> usize {
        if self.config.tx_dialect == Dialect::PathNotation && self.config.lora_header {
            payload.len() + LORA_APRS_HEADER.len()
        } else {
            payload.len()
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("queued", &self.queue.len())
            .field("peers", &self.peers)
            .finish()
    }
}
