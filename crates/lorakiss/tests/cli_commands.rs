#![cfg(feature = "cli")]

use std::io::Write;
use std::net::{TcpListener, UdpSocket};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use lorakiss::ax25::{LinkFrame, LORA_APRS_HEADER};
use lorakiss::frame::{FrameConfig, FrameReader, KissFrame};
use lorakiss::transport::KissListener;

const OE_FRAME_HEX: &str =
    "c00082a0a4a64040609e8a72a896907103f021343732352e35314e2f30303933392e383645c0";

fn lorakiss() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_lorakiss"));
    command.arg("--log-level").arg("error");
    command
}

fn free_tcp_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("probe listener should bind")
        .local_addr()
        .expect("probe address")
        .port()
}

fn free_udp_port() -> u16 {
    UdpSocket::bind("127.0.0.1:0")
        .expect("probe socket should bind")
        .local_addr()
        .expect("probe address")
        .port()
}

struct KillOnDrop(Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn connect_with_retry(addr: &str, timeout: Duration) -> lorakiss::transport::KissStream {
    let start = Instant::now();
    loop {
        if let Ok(stream) = KissListener::connect(addr) {
            return stream;
        }
        if start.elapsed() >= timeout {
            panic!("connect timeout");
        }
        thread::sleep(Duration::from_millis(25));
    }
}

#[test]
fn version_prints_package_version() {
    let output = lorakiss().arg("version").output().expect("version should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with(&format!("lorakiss {}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn encode_then_decode_roundtrips_path_notation() {
    let path = "OE9TKH-8>APRS,DIGI-3,DIGI-2:!4725.51N/00939.86E[322/002/A=001306";
    let output = lorakiss()
        .args(["--format", "pretty", "encode", path])
        .output()
        .expect("encode should run");
    assert!(output.status.success());
    let hex = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert!(hex.starts_with("c000"));
    assert!(hex.ends_with("c0"));

    let output = lorakiss()
        .args(["--format", "raw", "decode", &hex])
        .output()
        .expect("decode should run");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim_end(), path);
}

#[test]
fn decode_json_reports_fields() {
    let output = lorakiss()
        .args(["--format", "json", "decode", OE_FRAME_HEX])
        .output()
        .expect("decode should run");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("decode output should be JSON");
    assert_eq!(value["source"], "OE9TKH-8");
    assert_eq!(value["destination"], "APRS");
    assert_eq!(value["pid"], "0xF0");
    assert_eq!(value["data_type"], "position");
    assert_eq!(value["path"], "OE9TKH-8>APRS:!4725.51N/00939.86E");
}

#[test]
fn encode_with_report_appends_level() {
    let output = lorakiss()
        .args([
            "--format", "json", "encode", "N0CALL>APRS:>status", "--rssi", "-99", "--snr", "4.5",
        ])
        .output()
        .expect("encode should run");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("encode output should be JSON");
    let ax25 = hex::decode(value["ax25"].as_str().expect("ax25 hex")).expect("valid hex");
    assert!(ax25.ends_with(b">status Level:-99 dBm, SNR:4.5dB"));
}

#[test]
fn decode_rejects_supervisory_frame_with_data_error() {
    let output = lorakiss()
        .args(["decode", "c00082a0a4a64040609e8a72a8969071 01c0"])
        .output()
        .expect("decode should run");
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported frame type"));
}

#[test]
fn encode_rejects_missing_separator() {
    let output = lorakiss()
        .args(["encode", "N0CALL>APRS no payload"])
        .output()
        .expect("encode should run");
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn serve_bridges_kiss_clients_and_udp_radio() {
    let kiss_addr = format!("127.0.0.1:{}", free_tcp_port());
    let radio_addr = format!("127.0.0.1:{}", free_udp_port());
    let air = UdpSocket::bind("127.0.0.1:0").expect("air socket should bind");
    air.set_read_timeout(Some(Duration::from_secs(5)))
        .expect("air timeout");
    let air_addr = air.local_addr().expect("air address").to_string();

    let _server = KillOnDrop(
        lorakiss()
            .args([
                "serve",
                "--bind",
                &kiss_addr,
                "--radio-bind",
                &radio_addr,
                "--radio-peer",
                &air_addr,
                "--poll-interval",
                "20ms",
                "--rx-rssi",
                "-107",
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("serve should start"),
    );

    let mut client = connect_with_retry(&kiss_addr, Duration::from_secs(5));
    let reader_stream = client.try_clone().expect("clone client");

    // KISS client -> radio
    let link = LinkFrame::new(
        "N0CALL-7".parse().expect("source"),
        "APLT00".parse().expect("destination"),
        vec!["WIDE1-1".parse().expect("digi")],
        ">hello",
    )
    .encode()
    .expect("encode");
    client
        .write_all(&KissFrame::data(link).to_wire())
        .expect("write KISS frame");

    let mut buf = [0u8; 512];
    let (size, _) = air.recv_from(&mut buf).expect("radio should transmit");
    let mut expected = LORA_APRS_HEADER.to_vec();
    expected.extend_from_slice(b"N0CALL-7>APLT00,WIDE1-1:>hello");
    assert_eq!(&buf[..size], expected.as_slice());

    // radio -> KISS client
    let mut packet = LORA_APRS_HEADER.to_vec();
    packet.extend_from_slice(b"OE9TKH-8>APRS:!4725.51N/00939.86E[");
    air.send_to(&packet, &radio_addr).expect("send to radio");

    let mut reader = FrameReader::with_config_tcp(
        reader_stream,
        FrameConfig {
            read_timeout: Some(Duration::from_secs(5)),
            ..FrameConfig::default()
        },
    )
    .expect("reader");
    let frame = reader.read_kiss_frame().expect("client should get a frame");
    let received = LinkFrame::decode(&frame.payload).expect("valid AX.25");
    assert_eq!(received.source.to_string(), "OE9TKH-8");
    assert_eq!(
        received.payload.as_ref(),
        b"!4725.51N/00939.86E[ Level:-107 dBm, SNR:0dB"
    );
}
