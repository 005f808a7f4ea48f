use std::fs;

use bytes::BytesMut;
use tracing::debug;
use unilink_frame::encode_frame;

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    if args.flags > 0x7 {
        return Err(CliError::new(
            USAGE,
            format!("--flags must fit in 3 bits, got {}", args.flags),
        ));
    }

    let payload = resolve_payload(&args)?;
    let mut frame = BytesMut::new();
    encode_frame(
        args.sequence,
        args.component,
        args.data_id,
        args.flags,
        &payload,
        &mut frame,
    )
    .map_err(|err| frame_error("encode failed", err))?;

    debug!(
        component_id = args.component,
        data_id = args.data_id,
        len = payload.len(),
        "encoded frame"
    );
    print_encoded(&frame, format);
    Ok(SUCCESS)
}

fn resolve_payload(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(text) = &args.hex {
        return parse_hex(text);
    }
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}

/// Hex text with optional whitespace between bytes.
pub fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact).map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_allows_spacing() {
        assert_eq!(parse_hex("a0 01\n02").unwrap(), vec![0xA0, 0x01, 0x02]);
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn bad_hex_is_usage_error() {
        assert_eq!(parse_hex("abc").unwrap_err().code, USAGE);
        assert_eq!(parse_hex("zz").unwrap_err().code, USAGE);
    }
}
