use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use lorakiss_ax25::{LinkFrame, LORA_APRS_HEADER};
use lorakiss_bridge::{
    Bridge, BridgeConfig, BridgeError, KissServer, MemorySink, Radio, RadioPacket, ServerConfig,
};
use lorakiss_frame::{FrameConfig, FrameReader, KissFrame};
use lorakiss_transport::KissListener;

#[derive(Clone, Default)]
struct RecordingRadio {
    sent: Arc<Mutex<Vec<Bytes>>>,
}

impl Radio for RecordingRadio {
    fn transmit(&mut self, payload: &[u8]) -> Result<(), BridgeError> {
        self.sent
            .lock()
            .expect("lock")
            .push(Bytes::copy_from_slice(payload));
        Ok(())
    }

    fn channel_busy(&mut self, _timeout: Duration) -> Result<bool, BridgeError> {
        Ok(false)
    }
}

fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) {
    let start = Instant::now();
    while !condition() {
        if start.elapsed() >= timeout {
            panic!("condition not met within {timeout:?}");
        }
        thread::sleep(Duration::from_millis(10));
    }
}

fn start_server(config: BridgeConfig) -> (Arc<KissServer>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let bridge = Arc::new(Bridge::with_sink(config, sink.clone()));
    let server = Arc::new(
        KissServer::bind(
            ServerConfig {
                bind: "127.0.0.1:0".to_string(),
                ..ServerConfig::default()
            },
            bridge,
        )
        .expect("server should bind"),
    );

    let acceptor = server.clone();
    thread::spawn(move || {
        let running = AtomicBool::new(true);
        acceptor.run(&running);
    });
    (server, sink)
}

fn position_frame(text: &str) -> Bytes {
    LinkFrame::new(
        "OE9TKH-8".parse().expect("source"),
        "APRS".parse().expect("destination"),
        vec!["WIDE1-1".parse().expect("digi")],
        Bytes::from(text.to_string()),
    )
    .encode()
    .expect("encode")
}

#[test]
fn chunked_client_frames_reach_the_radio_in_order() {
    let config = BridgeConfig {
        poll_interval_ms: 5,
        ..BridgeConfig::default()
    };
    let (server, _sink) = start_server(config);
    let mut client = KissListener::connect(server.local_addr()).expect("client should connect");

    let mut stream = Vec::new();
    for text in ["!first", "!second", "!third"] {
        stream.extend_from_slice(&KissFrame::data(position_frame(text)).to_wire());
    }
    for chunk in stream.chunks(7) {
        std::io::Write::write_all(&mut client, chunk).expect("write chunk");
        thread::sleep(Duration::from_millis(1));
    }

    let bridge = server.bridge().clone();
    wait_for(Duration::from_secs(5), || bridge.queue().len() == 3);

    let radio = RecordingRadio::default();
    let running = Arc::new(AtomicBool::new(true));
    let transmitter = {
        let bridge = bridge.clone();
        let running = running.clone();
        let mut radio = radio.clone();
        thread::spawn(move || bridge.run_transmitter(&mut radio, &running))
    };
    wait_for(Duration::from_secs(5), || radio.sent.lock().expect("lock").len() == 3);
    running.store(false, Ordering::SeqCst);
    transmitter.join().expect("transmitter should stop");

    let sent = radio.sent.lock().expect("lock").clone();
    for (packet, text) in sent.iter().zip(["!first", "!second", "!third"]) {
        assert!(packet.starts_with(&LORA_APRS_HEADER));
        let body = &packet[LORA_APRS_HEADER.len()..];
        assert_eq!(body, format!("OE9TKH-8>APRS,WIDE1-1:{text}").as_bytes());
    }
}

#[test]
fn radio_packets_are_broadcast_to_every_client() {
    let (server, sink) = start_server(BridgeConfig::default());
    let config = FrameConfig {
        read_timeout: Some(Duration::from_secs(5)),
        ..FrameConfig::default()
    };
    let first = KissListener::connect(server.local_addr()).expect("first client");
    let second = KissListener::connect(server.local_addr()).expect("second client");
    let mut readers = vec![
        FrameReader::with_config_tcp(first, config.clone()).expect("reader"),
        FrameReader::with_config_tcp(second, config).expect("reader"),
    ];

    let bridge = server.bridge().clone();
    wait_for(Duration::from_secs(5), || bridge.peers().len() == 2);

    let mut air = LORA_APRS_HEADER.to_vec();
    air.extend_from_slice(b"OE9TKH-8>APRS,WIDE1-1*:!4725.51N/00939.86E[\n");
    let delivered = bridge
        .handle_radio_packet(&RadioPacket::new(air, -112, 6.5))
        .expect("packet should translate");
    assert_eq!(delivered, 2);

    for reader in &mut readers {
        let frame = reader.read_kiss_frame().expect("client should receive a frame");
        assert!(frame.is_data());

        let link = LinkFrame::decode(&frame.payload).expect("valid AX.25");
        assert_eq!(link.source.to_string(), "OE9TKH-8");
        assert!(link.digipeaters[0].is_repeated());
        assert_eq!(
            link.payload.as_ref(),
            b"!4725.51N/00939.86E[ Level:-112 dBm, SNR:6.5dB"
        );
    }

    drop(readers);
    wait_for(Duration::from_secs(5), || bridge.peers().is_empty());
    assert!(sink
        .events()
        .iter()
        .any(|event| matches!(event, lorakiss_bridge::BridgeEvent::Received { peers: 2, .. })));
}

#[test]
fn bad_frame_does_not_disturb_the_connection() {
    let (server, _sink) = start_server(BridgeConfig::default());
    let mut client = KissListener::connect(server.local_addr()).expect("client should connect");

    let mut stream = vec![0xC0, 0x00, 0x01, 0x02, 0xC0];
    stream.extend_from_slice(&KissFrame::data(position_frame("!ok")).to_wire());
    std::io::Write::write_all(&mut client, &stream).expect("write");

    let bridge = server.bridge().clone();
    wait_for(Duration::from_secs(5), || bridge.queue().len() == 1);
    assert_eq!(bridge.peers().len(), 1);
}
