//! AX.25 link-layer frames as carried by APRS over LoRa.
//!
//! Two wire dialects are supported and translate losslessly into each other:
//! - **Binary**: the AX.25 layout of 7-byte shifted addresses terminated by
//!   the extension bit, a control byte, a protocol ID and the payload.
//! - **Path notation**: the human-readable TNC2 form
//!   `SRC>DST,DIGI1,DIGI2*:payload` used by LoRa-APRS trackers.
//!
//! Only unnumbered-information (UI) frames are supported. Supervisory and
//! numbered-information frames are rejected with
//! [`Ax25Error::UnsupportedFrameType`].

pub mod address;
pub mod aprs;
pub mod dialect;
pub mod error;
pub mod frame;
pub mod path;
pub mod report;

pub use address::{decode_address, encode_address, Address, DecodedAddress, ADDRESS_LEN};
pub use aprs::{DataType, LORA_APRS_HEADER};
pub use dialect::Dialect;
pub use error::{Ax25Error, Result};
pub use frame::{FrameClass, LinkFrame, CONTROL_UI, MAX_DIGIPEATERS, PID_NO_LAYER3};
pub use report::{append_signal_report, SignalReport};
