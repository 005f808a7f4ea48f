use std::fs::{File, OpenOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use tracing::{debug, info};
use unilink_components::register_all;
use unilink_link::Link;
use unilink_transport::{ByteStream, Producer, TransportError};

use crate::cmd::MonitorArgs;
use crate::exit::{
    io_error, link_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE,
};
use crate::output::{print_frame, print_stats, FrameRecord, OutputFormat};

const IDLE_SLEEP: Duration = Duration::from_millis(2);

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.stats_interval)?;
    let device = OpenOptions::new()
        .read(true)
        .write(!args.read_only)
        .open(&args.device)
        .map_err(|err| io_error(&format!("failed opening {}", args.device.display()), err))?;
    let mut writer = if args.read_only {
        None
    } else {
        let handle = device
            .try_clone()
            .map_err(|err| io_error("failed cloning device handle", err))?;
        Some(ByteStream::new(handle))
    };

    let mut link = Link::new().map_err(|err| link_error("link setup failed", err))?;
    register_all(&mut link).map_err(|err| link_error("registration failed", err))?;
    let ingest = link
        .take_ingest()
        .ok_or_else(|| CliError::new(INTERNAL, "ingest producer already detached"))?;
    let mut drain = link
        .take_drain()
        .ok_or_else(|| CliError::new(INTERNAL, "drain consumer already detached"))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let reader_running = running.clone();
    let reader = thread::Builder::new()
        .name("unilink-reader".to_string())
        .spawn(move || read_loop(device, ingest, reader_running))
        .map_err(|err| io_error("failed spawning reader", err))?;

    info!(device = %args.device.display(), read_only = args.read_only, "monitoring");

    let mut printed = 0usize;
    let mut discarded = BytesMut::new();
    let mut last_stats = Instant::now();
    let mut batch = Vec::new();

    while running.load(Ordering::SeqCst) {
        let reader_done = reader.is_finished();

        batch.clear();
        let committed = link.parse_with(|header, payload, outcome| {
            batch.push(FrameRecord::new(header, payload, outcome));
        });
        for record in &batch {
            if args.count.is_some_and(|count| printed >= count) {
                break;
            }
            print_frame(record, format);
            printed += 1;
        }

        match writer.as_mut() {
            Some(writer) => {
                writer
                    .write_from(&mut drain)
                    .map_err(|err| transport_error("write failed", err))?;
            }
            None => {
                discarded.clear();
                drain.drain_into(&mut discarded);
            }
        }

        if last_stats.elapsed() >= interval {
            print_stats(&link.stats(), format);
            last_stats = Instant::now();
        }

        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
        if committed == 0 {
            if reader_done {
                debug!("reader finished and no frames remain");
                break;
            }
            thread::sleep(IDLE_SLEEP);
        }
    }

    running.store(false, Ordering::SeqCst);
    print_stats(&link.stats(), format);

    // A reader blocked on a quiet device is left to process exit.
    if reader.is_finished() {
        match reader.join() {
            Ok(Ok(total)) => debug!(bytes = total, "reader stopped"),
            Ok(Err(err)) => return Err(transport_error("read failed", err)),
            Err(_) => return Err(CliError::new(INTERNAL, "reader thread panicked")),
        }
    }

    Ok(SUCCESS)
}

fn read_loop(
    device: File,
    mut ingest: Producer,
    running: Arc<AtomicBool>,
) -> unilink_transport::Result<u64> {
    let mut stream = ByteStream::new(device);
    let mut total = 0u64;

    while running.load(Ordering::SeqCst) {
        match stream.read_into(&mut ingest) {
            Ok(0) => thread::sleep(IDLE_SLEEP),
            Ok(n) => total += n as u64,
            Err(TransportError::Closed) => {
                debug!(bytes = total, "device reached end of stream");
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(total)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
