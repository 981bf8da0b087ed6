//! AX.25 station addresses.
//!
//! On the wire an address is exactly 7 bytes:
//!
//! ```text
//! ┌────────────────────────────┬───┬───┬───┬───────────┬───┐
//! │ callsign, 6 × (char << 1)  │ H │ R │ R │ SSID (4b) │ E │
//! │ space padded               │ 7 │ 6 │ 5 │ bits 4..1 │ 0 │
//! └────────────────────────────┴───┴───┴───┴───────────┴───┘
//! ```
//!
//! `H` is the has-been-repeated flag, `R R` are reserved and always set
//! when encoding, `E` marks the last address of the header.

use std::fmt;
use std::str::FromStr;

use crate::error::{Ax25Error, Result};

/// Size of one encoded address.
pub const ADDRESS_LEN: usize = 7;

/// Longest callsign an address can hold.
pub const MAX_CALLSIGN_LEN: usize = 6;

/// Largest SSID.
pub const MAX_SSID: u8 = 15;

/// Suffix marking a digipeater that has already repeated the frame.
pub const REPEATED_MARKER: char = '*';

const HAS_BEEN_REPEATED: u8 = 0b1000_0000;
const RESERVED_BITS: u8 = 0b0110_0000;
const EXTENSION_BIT: u8 = 0b0000_0001;

/// A station address: callsign, SSID and has-been-repeated flag.
///
/// Callsigns are stored uppercase, 1-6 ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    callsign: String,
    ssid: u8,
    repeated: bool,
}

/// An address as read off the wire, with its raw flag bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    /// The station address. `repeated` is always false here; whether the
    /// flag applies depends on the address position in the header.
    pub address: Address,
    /// Has-been-repeated bit and the two reserved bits, as a 3-bit value.
    pub hrr: u8,
    /// True for the last address of the header.
    pub extension: bool,
}

impl DecodedAddress {
    /// True when `H` and both reserved bits are set.
    pub fn is_repeated(&self) -> bool {
        self.hrr == 0b111
    }
}

impl Address {
    /// Create an address, validating and uppercasing the callsign.
    pub fn new(callsign: &str, ssid: u8) -> Result<Self> {
        if callsign.is_empty() || callsign.len() > MAX_CALLSIGN_LEN {
            return Err(Ax25Error::MalformedAddress(format!(
                "callsign {callsign:?} must be 1-{MAX_CALLSIGN_LEN} characters"
            )));
        }
        if !callsign.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(Ax25Error::MalformedAddress(format!(
                "callsign {callsign:?} must be alphanumeric"
            )));
        }
        if ssid > MAX_SSID {
            return Err(Ax25Error::MalformedAddress(format!(
                "SSID {ssid} out of range 0-{MAX_SSID}"
            )));
        }
        Ok(Self {
            callsign: callsign.to_ascii_uppercase(),
            ssid,
            repeated: false,
        })
    }

    /// Set the has-been-repeated flag.
    pub fn with_repeated(mut self, repeated: bool) -> Self {
        self.repeated = repeated;
        self
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    pub fn ssid(&self) -> u8 {
        self.ssid
    }

    pub fn is_repeated(&self) -> bool {
        self.repeated
    }

    /// Pack into the 7-byte wire form.
    pub fn encode(&self, is_final: bool) -> [u8; ADDRESS_LEN] {
        let mut out = [b' ' << 1; ADDRESS_LEN];
        for (slot, byte) in out.iter_mut().zip(self.callsign.bytes()) {
            *slot = byte << 1;
        }

        let mut last = (self.ssid << 1) | RESERVED_BITS;
        if self.repeated {
            last |= HAS_BEEN_REPEATED;
        }
        if is_final {
            last |= EXTENSION_BIT;
        }
        out[ADDRESS_LEN - 1] = last;
        out
    }

    /// Unpack a 7-byte wire address.
    pub fn decode(raw: &[u8]) -> Result<DecodedAddress> {
        if raw.len() < ADDRESS_LEN {
            return Err(Ax25Error::TruncatedFrame {
                needed: ADDRESS_LEN,
                available: raw.len(),
            });
        }

        let chars: Vec<u8> = raw[..MAX_CALLSIGN_LEN].iter().map(|b| b >> 1).collect();
        let end = chars
            .iter()
            .rposition(|&c| c != b' ')
            .map_or(0, |pos| pos + 1);
        let callsign = std::str::from_utf8(&chars[..end]).map_err(|_| {
            Ax25Error::MalformedAddress(format!("callsign bytes {:02X?}", &raw[..MAX_CALLSIGN_LEN]))
        })?;

        let last = raw[ADDRESS_LEN - 1];
        let ssid = (last >> 1) & 0x0F;
        let address = Address::new(callsign, ssid)?;

        Ok(DecodedAddress {
            address,
            hrr: last >> 5,
            extension: last & EXTENSION_BIT != 0,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.callsign)?;
        if self.ssid != 0 {
            write!(f, "-{}", self.ssid)?;
        }
        if self.repeated {
            write!(f, "{REPEATED_MARKER}")?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = Ax25Error;

    /// Parse `CALL`, `CALL-SSID`, optionally followed by `*`.
    fn from_str(s: &str) -> Result<Self> {
        let (body, repeated) = match s.strip_suffix(REPEATED_MARKER) {
            Some(body) => (body, true),
            None => (s, false),
        };

        let (callsign, ssid) = match body.split_once('-') {
            Some((callsign, ssid)) => {
                let ssid = ssid.parse::<u8>().map_err(|_| {
                    Ax25Error::MalformedAddress(format!("invalid SSID in {s:?}"))
                })?;
                (callsign, ssid)
            }
            None => (body, 0),
        };

        Ok(Address::new(callsign, ssid)?.with_repeated(repeated))
    }
}

/// Decode one address from the first 7 bytes of `raw`.
pub fn decode_address(raw: &[u8]) -> Result<DecodedAddress> {
    Address::decode(raw)
}

/// Encode a `CALL[-SSID][*]` string into its 7-byte wire form.
pub fn encode_address(text: &str, is_final: bool) -> Result<[u8; ADDRESS_LEN]> {
    Ok(text.parse::<Address>()?.encode(is_final))
}
