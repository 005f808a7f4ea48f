use bytes::BytesMut;
use tracing::{info, warn};
use unilink_frame::EXAMPLES;
use unilink_link::Link;
use unilink_registry::Handler;

use crate::cmd::LoopbackArgs;
use crate::exit::{link_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};
use crate::output::{print_stats, OutputFormat};

const COUNTER_ID: u8 = 0x01;

pub fn run(args: LoopbackArgs, format: OutputFormat) -> CliResult<i32> {
    if args.chunk == 0 {
        return Err(CliError::new(USAGE, "--chunk must be greater than zero"));
    }

    let mut sender = Link::new().map_err(|err| link_error("link setup failed", err))?;
    let mut receiver = Link::new().map_err(|err| link_error("link setup failed", err))?;
    receiver
        .register(EXAMPLES, COUNTER_ID, vec![0u8; 4], Handler::Copy, 4)
        .map_err(|err| link_error("registration failed", err))?;

    let mut wire = BytesMut::new();
    let mut sent = 0u32;
    while sent < args.frames {
        if sender.build(EXAMPLES, COUNTER_ID, &sent.to_le_bytes()) > 0 {
            sent += 1;
            continue;
        }
        pump(&mut sender, &mut receiver, &mut wire, args.chunk);
    }
    pump(&mut sender, &mut receiver, &mut wire, args.chunk);

    let stats = receiver.stats();
    print_stats(&stats, format);

    let last = receiver
        .record(EXAMPLES, COUNTER_ID)
        .and_then(|record| <[u8; 4]>::try_from(record).ok())
        .map(u32::from_le_bytes);
    let healthy = stats.success_count == u64::from(args.frames)
        && stats.decode_error_count == 0
        && stats.com_error_count == 0
        && (args.frames == 0 || last == Some(args.frames - 1));

    if healthy {
        info!(frames = args.frames, "loopback healthy");
        Ok(SUCCESS)
    } else {
        warn!(frames = args.frames, ?stats, "loopback lost frames");
        Ok(FAILURE)
    }
}

/// Move everything queued on `sender` into `receiver`, `chunk` bytes at a time.
fn pump(sender: &mut Link, receiver: &mut Link, wire: &mut BytesMut, chunk: usize) {
    wire.clear();
    sender.drain_outbound(wire);

    for piece in wire.chunks(chunk) {
        let mut rest = piece;
        while !rest.is_empty() {
            let take = rest.len().min(receiver.receive_buffer_remain());
            receiver.ingest(&rest[..take]);
            rest = &rest[take..];
            receiver.run_parse_pass();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pump_delivers_in_odd_chunks() {
        let mut sender = Link::new().unwrap();
        let mut receiver = Link::new().unwrap();
        receiver
            .register(EXAMPLES, COUNTER_ID, vec![0u8; 4], Handler::Copy, 4)
            .unwrap();
        let mut wire = BytesMut::new();

        for i in 0..100u32 {
            assert!(sender.build(EXAMPLES, COUNTER_ID, &i.to_le_bytes()) > 0);
        }
        pump(&mut sender, &mut receiver, &mut wire, 5);

        assert_eq!(receiver.success_count(), 100);
        assert_eq!(receiver.com_error_count(), 0);
        assert_eq!(receiver.receive_buffer_used(), 0);
        assert_eq!(receiver.record(EXAMPLES, COUNTER_ID), Some(&99u32.to_le_bytes()[..]));
    }
}
