use std::fs;
use std::io::{self, Read};
use std::path::Path;

use bytes::BytesMut;
use tracing::{debug, warn};
use unilink_components::register_all;
use unilink_link::Link;

use crate::cmd::encode::parse_hex;
use crate::cmd::DecodeArgs;
use crate::exit::{io_error, link_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frames, print_stats, FrameRecord, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = read_input(args.path.as_deref())?;
    let bytes = if args.hex {
        parse_hex(&String::from_utf8_lossy(&input))?
    } else {
        input
    };

    let mut link = Link::new().map_err(|err| link_error("link setup failed", err))?;
    register_all(&mut link).map_err(|err| link_error("registration failed", err))?;

    let records = decode_all(&mut link, &bytes);
    let stats = link.stats();
    debug!(frames = records.len(), input = bytes.len(), "decode finished");
    if link.receive_buffer_used() > 0 {
        warn!(
            trailing = link.receive_buffer_used(),
            "input ends with an incomplete frame"
        );
    }

    print_frames(&records, format);
    print_stats(&stats, format);

    let clean = stats.decode_error_count == 0 && stats.resync_count == 0;
    if args.strict && !clean {
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}

/// Feed `bytes` through `link` as fast as its receive ring allows.
fn decode_all(link: &mut Link, bytes: &[u8]) -> Vec<FrameRecord> {
    let mut records = Vec::new();
    let mut replies = BytesMut::new();
    let mut rest = bytes;

    loop {
        let take = rest.len().min(link.receive_buffer_remain());
        link.ingest(&rest[..take]);
        rest = &rest[take..];

        let committed = link.parse_with(|header, payload, outcome| {
            records.push(FrameRecord::new(header, payload, outcome));
        });
        // Replies to read requests have nowhere to go.
        replies.clear();
        link.drain_outbound(&mut replies);

        if rest.is_empty() || (take == 0 && committed == 0) {
            break;
        }
    }

    records
}

fn read_input(path: Option<&Path>) -> CliResult<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err)),
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed reading stdin", err))?;
            Ok(buf)
        }
    }
}
