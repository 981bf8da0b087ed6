use bytes::BytesMut;
use lorakiss_ax25::{append_signal_report, LinkFrame, SignalReport};
use lorakiss_frame::{encode_frame, CMD_DATA};

use crate::cmd::EncodeArgs;
use crate::exit::{link_error, CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = LinkFrame::from_path_notation(args.path.as_bytes())
        .map_err(|err| link_error("invalid path notation", err))?;

    let mut ax25 = BytesMut::new();
    frame
        .encode_into(&mut ax25)
        .map_err(|err| link_error("encoding failed", err))?;
    if let Some(rssi) = args.rssi {
        let report = SignalReport::new(rssi, args.snr.unwrap_or(0.0));
        append_signal_report(&mut ax25, frame.data_type(), &report, true);
    }

    let mut wire = BytesMut::with_capacity(ax25.len() + 8);
    encode_frame(CMD_DATA, &ax25, &mut wire);

    print_encoded(&args.path, &ax25, &wire, format);
    Ok(SUCCESS)
}
