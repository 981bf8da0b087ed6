use lorakiss_ax25::LinkFrame;
use lorakiss_frame::{decode_frame, KissFrame, FEND};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, link_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_decoded, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex)?;

    let kiss = if bytes.first() == Some(&FEND) {
        decode_frame(&bytes).map_err(|err| frame_error("invalid KISS frame", err))?
    } else {
        KissFrame::data(bytes)
    };
    let payload = kiss
        .data_payload()
        .map_err(|err| frame_error("not a data frame", err))?;
    let link = LinkFrame::decode(payload).map_err(|err| link_error("invalid AX.25 frame", err))?;

    print_decoded(&kiss, &link, format);
    Ok(SUCCESS)
}

pub(crate) fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let cleaned: String = input
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&cleaned).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_ignores_separators() {
        assert_eq!(
            parse_hex("c0 00:82 A0").expect("hex should parse"),
            vec![0xC0, 0x00, 0x82, 0xA0]
        );
        assert_eq!(parse_hex("0xc0c0").expect("prefix"), vec![0xC0, 0xC0]);
    }

    #[test]
    fn parse_hex_rejects_odd_length() {
        let err = parse_hex("c0 0").expect_err("odd length should fail");
        assert_eq!(err.code, DATA_INVALID);
    }
}
