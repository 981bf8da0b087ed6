//! Path notation: `SRC[-SSID]>DST[-SSID][,DIGI[-SSID][*]]*:PAYLOAD`.

use bytes::{BufMut, Bytes, BytesMut};

use crate::address::Address;
use crate::error::{Ax25Error, Result};
use crate::frame::{LinkFrame, MAX_DIGIPEATERS};

const PAYLOAD_SEPARATOR: u8 = b':';
const SOURCE_SEPARATOR: u8 = b'>';
const CHAIN_SEPARATOR: char = ',';

impl LinkFrame {
    /// Parse a path-notation frame.
    ///
    /// The path ends at the first `:`; everything after it is payload and is
    /// kept byte for byte, so payloads may contain further colons.
    pub fn from_path_notation(bytes: &[u8]) -> Result<Self> {
        let split = bytes
            .iter()
            .position(|&b| b == PAYLOAD_SEPARATOR)
            .ok_or(Ax25Error::MissingPayloadSeparator)?;
        let (path, payload) = (&bytes[..split], &bytes[split + 1..]);

        let path = std::str::from_utf8(path)
            .map_err(|_| Ax25Error::MalformedAddress("path is not valid UTF-8".to_string()))?;
        let (source, chain) = path
            .split_once(SOURCE_SEPARATOR as char)
            .ok_or(Ax25Error::MissingSourceSeparator)?;

        let mut chain = chain.split(CHAIN_SEPARATOR);
        let destination = chain.next().unwrap_or_default();
        let destination = endpoint(destination)?;
        let source = endpoint(source)?;
        let digipeaters = chain
            .map(str::parse::<Address>)
            .collect::<Result<Vec<_>>>()?;
        if digipeaters.len() > MAX_DIGIPEATERS {
            return Err(Ax25Error::TooManyDigipeaters(digipeaters.len()));
        }

        let frame = LinkFrame::new(
            source,
            destination,
            digipeaters,
            Bytes::copy_from_slice(payload),
        );
        frame.log_summary("path");
        Ok(frame)
    }

    /// Render as path notation.
    pub fn to_path_notation(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.payload.len() + 16 * (2 + self.digipeaters.len()));
        dst.put_slice(self.source.to_string().as_bytes());
        dst.put_u8(SOURCE_SEPARATOR);
        dst.put_slice(self.destination.to_string().as_bytes());
        for digi in &self.digipeaters {
            dst.put_u8(CHAIN_SEPARATOR as u8);
            dst.put_slice(digi.to_string().as_bytes());
        }
        dst.put_u8(PAYLOAD_SEPARATOR);
        dst.put_slice(&self.payload);
        dst.freeze()
    }
}

/// Source and destination; only digipeaters may carry the repeated marker.
fn endpoint(text: &str) -> Result<Address> {
    let address: Address = text.parse()?;
    if address.is_repeated() {
        return Err(Ax25Error::MalformedAddress(format!(
            "repeated marker on non-digipeater address: {text}"
        )));
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ADDRESS_LEN;
    use crate::dialect::Dialect;
    use crate::frame::{CONTROL_UI, PID_NO_LAYER3};

    const POSITION: &str = "!4725.51N/00939.86E[322/002/A=001306 Batt=3.99V";

    #[test]
    fn binary_to_path_notation() {
        let mut raw = vec![0x82, 0xA0, 0xA4, 0xA6, 0x40, 0x40, 0x60];
        raw.extend([0x9E, 0x8A, 0x72, 0xA8, 0x96, 0x90, 0x71]);
        raw.extend([CONTROL_UI, PID_NO_LAYER3]);
        raw.extend_from_slice(POSITION.as_bytes());

        let frame = LinkFrame::decode(&raw).unwrap();
        let path = frame.to_path_notation();
        assert_eq!(path, format!("OE9TKH-8>APRS:{POSITION}").as_bytes());
    }

    #[test]
    fn path_notation_digipeater_extension_bits() {
        let frame = LinkFrame::from_path_notation(b"OE9TKH-8>APRS,digi-3,digi-2:PAYLOAD").unwrap();
        assert_eq!(frame.digipeaters.len(), 2);
        assert_eq!(frame.digipeaters[0].callsign(), "DIGI");
        assert_eq!(frame.digipeaters[0].ssid(), 3);

        let encoded = frame.encode().unwrap();
        let digi3_last = encoded[3 * ADDRESS_LEN - 1];
        let digi2_last = encoded[4 * ADDRESS_LEN - 1];
        assert_eq!(digi3_last & 0x01, 0);
        assert_eq!(digi2_last & 0x01, 1);
        assert_eq!(&encoded[4 * ADDRESS_LEN..4 * ADDRESS_LEN + 2], &[CONTROL_UI, PID_NO_LAYER3]);
        assert_eq!(&encoded[4 * ADDRESS_LEN + 2..], b"PAYLOAD");
    }

    #[test]
    fn repeated_marker_is_preserved() {
        let text = b"N0CALL-7>APLT00,WIDE1-1*,WIDE2-1:>status";
        let frame = LinkFrame::from_path_notation(text).unwrap();
        assert!(frame.digipeaters[0].is_repeated());
        assert!(!frame.digipeaters[1].is_repeated());
        assert_eq!(frame.to_path_notation().as_ref(), text);
    }

    #[test]
    fn payload_may_contain_colons() {
        let text = b"N0CALL>APRS::BLN1     :net tonight";
        let frame = LinkFrame::from_path_notation(text).unwrap();
        assert_eq!(frame.payload.as_ref(), b":BLN1     :net tonight");
        assert!(frame.data_type().unwrap().is_message());
    }

    #[test]
    fn empty_payload() {
        let frame = LinkFrame::from_path_notation(b"N0CALL>APRS:").unwrap();
        assert!(frame.payload.is_empty());
        assert_eq!(frame.to_path_notation().as_ref(), b"N0CALL>APRS:");
    }

    #[test]
    fn rejects_missing_payload_separator() {
        assert!(matches!(
            LinkFrame::from_path_notation(b"N0CALL>APRS"),
            Err(Ax25Error::MissingPayloadSeparator)
        ));
    }

    #[test]
    fn rejects_missing_source_separator() {
        assert!(matches!(
            LinkFrame::from_path_notation(b"N0CALL:hello"),
            Err(Ax25Error::MissingSourceSeparator)
        ));
    }

    #[test]
    fn rejects_malformed_addresses() {
        let cases: [&[u8]; 8] = [
            b">APRS:x",
            b"N0CALL*>APRS:x",
            b"N0CALL>APRS*,WIDE1-1:x",
            b"N0CALL>:x",
            b"TOOLONGCALL>APRS:x",
            b"N0CALL>APRS-16:x",
            b"N0CALL>APRS,,WIDE:x",
            b"N0 CALL>APRS:x",
        ];
        for text in cases {
            assert!(
                matches!(
                    LinkFrame::from_path_notation(text),
                    Err(Ax25Error::MalformedAddress(_))
                ),
                "{}",
                String::from_utf8_lossy(text)
            );
        }
    }

    #[test]
    fn rejects_too_many_digipeaters() {
        let text = b"N0CALL>APRS,A,B,C,D,E,F,G,H,I:x";
        assert!(matches!(
            LinkFrame::from_path_notation(text),
            Err(Ax25Error::TooManyDigipeaters(9))
        ));
    }

    #[test]
    fn dialects_translate_both_ways() {
        let text = b"OE9TKH-8>APRS,WIDE1-1*,WIDE2-2:=4725.51N/00939.86E-";
        let frame = LinkFrame::decode_as(text, Dialect::PathNotation).unwrap();
        let binary = frame.encode_as(Dialect::Binary).unwrap();
        let back = LinkFrame::decode_as(&binary, Dialect::Binary).unwrap();
        assert_eq!(back, frame);
        assert_eq!(back.encode_as(Dialect::PathNotation).unwrap().as_ref(), text);
    }

    #[test]
    fn path_roundtrip_with_up_to_eight_digipeaters() {
        for count in 0..=MAX_DIGIPEATERS {
            let digis = (0..count)
                .map(|i| {
                    Address::new(&format!("DIGI{i}"), (i * 2 % 16) as u8)
                        .unwrap()
                        .with_repeated(i % 3 == 0)
                })
                .collect::<Vec<_>>();
            let frame = LinkFrame::new(
                Address::new("OE9TKH", 8).unwrap(),
                Address::new("APLT00", 0).unwrap(),
                digis,
                Bytes::from_static(POSITION.as_bytes()),
            );
            let text = frame.encode_as(Dialect::PathNotation).unwrap();
            let decoded = LinkFrame::decode_as(&text, Dialect::PathNotation).unwrap();
            assert_eq!(decoded, frame, "{count} digipeaters");
            assert_eq!(decoded.to_path_notation(), text);
        }
    }
}
