use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::address::{Address, DecodedAddress, ADDRESS_LEN};
use crate::aprs::DataType;
use crate::dialect::Dialect;
use crate::error::{Ax25Error, Result};

/// Control field of an unnumbered-information frame (poll bit clear).
pub const CONTROL_UI: u8 = 0x03;

/// Protocol ID: no layer-3 protocol.
pub const PID_NO_LAYER3: u8 = 0xF0;

/// Most digipeaters an AX.25 header can name.
pub const MAX_DIGIPEATERS: usize = 8;

/// Frame class selected by the low bits of the control field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClass {
    /// `..11`: unnumbered; carries a protocol ID.
    Unnumbered,
    /// `..01`: supervisory.
    Supervisory,
    /// `...0`: numbered information.
    Information,
}

impl FrameClass {
    pub fn from_control(control: u8) -> Self {
        if control & 0x03 == 0x03 {
            FrameClass::Unnumbered
        } else if control & 0x03 == 0x01 {
            FrameClass::Supervisory
        } else {
            FrameClass::Information
        }
    }
}

impl fmt::Display for FrameClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameClass::Unnumbered => "unnumbered",
            FrameClass::Supervisory => "supervisory (S-frame)",
            FrameClass::Information => "numbered information (I-frame)",
        })
    }
}

/// An AX.25 unnumbered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFrame {
    pub destination: Address,
    pub source: Address,
    /// Relay path in order; each entry carries its own repeated flag.
    pub digipeaters: Vec<Address>,
    pub control: u8,
    /// Present for unnumbered frames.
    pub pid: Option<u8>,
    pub payload: Bytes,
}

impl LinkFrame {
    /// Create a UI frame with no layer-3 protocol.
    pub fn new(
        source: Address,
        destination: Address,
        digipeaters: Vec<Address>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            destination,
            source,
            digipeaters,
            control: CONTROL_UI,
            pid: Some(PID_NO_LAYER3),
            payload: payload.into(),
        }
    }

    /// APRS data type of the payload.
    pub fn data_type(&self) -> Option<DataType> {
        DataType::of(&self.payload)
    }

    /// The encapsulated packet of a third-party payload (`}` stripped).
    pub fn third_party_inner(&self) -> Option<Bytes> {
        match self.data_type() {
            Some(DataType::ThirdParty) => Some(self.payload.slice(1..)),
            _ => None,
        }
    }

    /// Decode a frame in the given dialect.
    pub fn decode_as(bytes: &[u8], dialect: Dialect) -> Result<Self> {
        match dialect {
            Dialect::Binary => Self::decode(bytes),
            Dialect::PathNotation => Self::from_path_notation(bytes),
        }
    }

    /// Encode the frame in the given dialect.
    pub fn encode_as(&self, dialect: Dialect) -> Result<Bytes> {
        match dialect {
            Dialect::Binary => self.encode(),
            Dialect::PathNotation => Ok(self.to_path_notation()),
        }
    }

    /// Decode the AX.25 binary layout.
    ///
    /// Reads destination and source, then digipeaters until an address with
    /// the extension bit set, then the control field. Only unnumbered frames
    /// are accepted; the protocol ID follows and the rest is payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = 0usize;

        let destination = read_address(bytes, &mut cursor)?;
        if destination.extension {
            return Err(Ax25Error::MalformedAddress(
                "address chain ends at the destination".to_string(),
            ));
        }
        let source = read_address(bytes, &mut cursor)?;

        let mut digipeaters = Vec::new();
        let mut extension = source.extension;
        while !extension {
            if digipeaters.len() == MAX_DIGIPEATERS {
                return Err(Ax25Error::TooManyDigipeaters(MAX_DIGIPEATERS + 1));
            }
            let digi = read_address(bytes, &mut cursor)?;
            extension = digi.extension;
            let repeated = digi.is_repeated();
            digipeaters.push(digi.address.with_repeated(repeated));
        }

        let control = *bytes.get(cursor).ok_or(Ax25Error::TruncatedFrame {
            needed: cursor + 1,
            available: bytes.len(),
        })?;
        cursor += 1;

        let pid = match FrameClass::from_control(control) {
            FrameClass::Unnumbered => {
                let pid = *bytes.get(cursor).ok_or(Ax25Error::TruncatedFrame {
                    needed: cursor + 1,
                    available: bytes.len(),
                })?;
                cursor += 1;
                pid
            }
            class => return Err(Ax25Error::UnsupportedFrameType(class)),
        };

        let frame = Self {
            destination: destination.address,
            source: source.address,
            digipeaters,
            control,
            pid: Some(pid),
            payload: Bytes::copy_from_slice(&bytes[cursor..]),
        };
        frame.log_summary("binary");
        Ok(frame)
    }

    /// Encode into the AX.25 binary layout.
    pub fn encode(&self) -> Result<Bytes> {
        let mut dst = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut dst)?;
        Ok(dst.freeze())
    }

    /// Encode into the AX.25 binary layout, appending to `dst`.
    ///
    /// Wire format:
    /// ```text
    /// ┌──────────┬──────────┬────────────────┬─────────┬─────┬─────────┐
    /// │ Dest (7) │ Src (7)  │ Digis (7 × n)  │ Control │ PID │ Payload │
    /// └──────────┴──────────┴────────────────┴─────────┴─────┴─────────┘
    /// ```
    /// Only the last address carries the extension bit.
    pub fn encode_into(&self, dst: &mut BytesMut) -> Result<()> {
        if self.digipeaters.len() > MAX_DIGIPEATERS {
            return Err(Ax25Error::TooManyDigipeaters(self.digipeaters.len()));
        }
        let class = FrameClass::from_control(self.control);
        if class != FrameClass::Unnumbered {
            return Err(Ax25Error::UnsupportedFrameType(class));
        }

        dst.reserve(self.encoded_len());
        dst.put_slice(&self.destination.encode(false));
        dst.put_slice(&self.source.encode(self.digipeaters.is_empty()));
        let last = self.digipeaters.len().saturating_sub(1);
        for (i, digi) in self.digipeaters.iter().enumerate() {
            dst.put_slice(&digi.encode(i == last));
        }
        dst.put_u8(self.control);
        if let Some(pid) = self.pid {
            dst.put_u8(pid);
        }
        dst.put_slice(&self.payload);
        Ok(())
    }

    /// Size of the binary encoding.
    pub fn encoded_len(&self) -> usize {
        ADDRESS_LEN * (2 + self.digipeaters.len())
            + 1
            + usize::from(self.pid.is_some())
            + self.payload.len()
    }

    pub(crate) fn log_summary(&self, dialect: &'static str) {
        debug!(
            dialect,
            from = %self.source,
            to = %self.destination,
            via = %self.via(),
            pid = ?self.pid,
            payload = %String::from_utf8_lossy(&self.payload),
            "decoded link frame"
        );
    }

    /// Digipeater path as a comma-separated list.
    pub fn via(&self) -> String {
        self.digipeaters
            .iter()
            .map(Address::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn read_address(bytes: &[u8], cursor: &mut usize) -> Result<DecodedAddress> {
    let end = *cursor + ADDRESS_LEN;
    if bytes.len() < end {
        return Err(Ax25Error::TruncatedFrame {
            needed: end,
            available: bytes.len(),
        });
    }
    let decoded = Address::decode(&bytes[*cursor..end])?;
    *cursor = end;
    Ok(decoded)
}
