//! KISS special bytes and command codes.
//!
//! The first byte of every frame packs the TNC port in the high nibble and
//! the command in the low nibble. Only [`CMD_DATA`] carries link-layer
//! frames; the others configure the TNC and are ignored by this bridge.

/// Frame start/end marker.
pub const FEND: u8 = 0xC0;

/// Escape byte.
pub const FESC: u8 = 0xDB;

/// Follows `FESC` to stand for an escaped `FEND`.
pub const TFEND: u8 = 0xDC;

/// Follows `FESC` to stand for an escaped `FESC`.
pub const TFESC: u8 = 0xDD;

/// Data frame: the payload is a link-layer frame.
pub const CMD_DATA: u8 = 0x00;

/// Transmitter keyup delay, in 10 ms units.
pub const CMD_TXDELAY: u8 = 0x01;

/// Persistence parameter.
pub const CMD_PERSISTENCE: u8 = 0x02;

/// Slot interval, in 10 ms units.
pub const CMD_SLOTTIME: u8 = 0x03;

/// Transmitter tail, in 10 ms units.
pub const CMD_TXTAIL: u8 = 0x04;

/// Full duplex on/off.
pub const CMD_FULLDUPLEX: u8 = 0x05;

/// Hardware-specific setting.
pub const CMD_SETHARDWARE: u8 = 0x06;

/// Exit KISS mode (whole byte, not a nibble).
pub const CMD_RETURN: u8 = 0xFF;

/// Builds a command byte from a port and a command nibble.
pub fn command_byte(port: u8, command: u8) -> u8 {
    ((port & 0x0F) << 4) | (command & 0x0F)
}

/// Splits a command byte into `(port, command)`.
pub fn split_command_byte(byte: u8) -> (u8, u8) {
    (byte >> 4, byte & 0x0F)
}

/// Returns a human-readable name for a command nibble.
pub fn command_name(command: u8) -> &'static str {
    match command {
        CMD_DATA => "DATA",
        CMD_TXDELAY => "TXDELAY",
        CMD_PERSISTENCE => "PERSISTENCE",
        CMD_SLOTTIME => "SLOTTIME",
        CMD_TXTAIL => "TXTAIL",
        CMD_FULLDUPLEX => "FULLDUPLEX",
        CMD_SETHARDWARE => "SETHARDWARE",
        _ => "UNKNOWN",
    }
}

/// Name of a whole command byte, ignoring the port nibble.
pub fn command_byte_name(byte: u8) -> &'static str {
    if byte == CMD_RETURN {
        return "RETURN";
    }
    command_name(split_command_byte(byte).1)
}
