use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use unilink_components::{data_name, decode, Decoded};
use unilink_frame::{component_name, FrameHeader};
use unilink_link::{FrameOutcome, LinkStats};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One committed frame, as printed by `decode` and `monitor`.
#[derive(Debug, Serialize)]
pub struct FrameRecord {
    pub sequence: u8,
    pub component_id: u8,
    pub component: &'static str,
    pub data_id: u8,
    pub data: Option<&'static str>,
    pub flags: u8,
    pub length: u16,
    pub outcome: &'static str,
    pub payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<Decoded>,
    #[serde(skip)]
    raw: Vec<u8>,
}

impl FrameRecord {
    pub fn new(header: &FrameHeader, payload: &[u8], outcome: FrameOutcome) -> Self {
        Self {
            sequence: header.sequence,
            component_id: header.component_id,
            component: component_name(header.component_id),
            data_id: header.data_id,
            data: data_name(header.component_id, header.data_id),
            flags: header.flags(),
            length: header.length(),
            outcome: outcome.label(),
            payload: hex::encode(payload),
            decoded: decode(header.component_id, header.data_id, payload),
            raw: payload.to_vec(),
        }
    }

    fn data_label(&self) -> String {
        match self.data {
            Some(name) => name.to_string(),
            None => self.data_id.to_string(),
        }
    }
}

#[derive(Serialize)]
struct StatsOutput<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(flatten)]
    stats: &'a LinkStats,
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    length: usize,
    frame: &'a str,
}

pub fn print_frame(record: &FrameRecord, format: OutputFormat) {
    print_frames(std::slice::from_ref(record), format);
}

pub fn print_frames(records: &[FrameRecord], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for record in records {
                println!(
                    "{}",
                    serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            if records.is_empty() {
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SEQ", "COMPONENT", "DATA", "LEN", "OUTCOME", "PAYLOAD"]);
            for record in records {
                table.add_row(vec![
                    record.sequence.to_string(),
                    record.component.to_string(),
                    record.data_label(),
                    record.length.to_string(),
                    record.outcome.to_string(),
                    payload_preview(&record.payload),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for record in records {
                println!(
                    "seq={} component={} ({}) data={} len={} outcome={} payload={}",
                    record.sequence,
                    record.component_id,
                    record.component,
                    record.data_label(),
                    record.length,
                    record.outcome,
                    payload_preview(&record.payload)
                );
            }
        }
        OutputFormat::Raw => {
            for record in records {
                print_raw(&record.raw);
            }
        }
    }
}

pub fn print_stats(stats: &LinkStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatsOutput {
                kind: "stats",
                stats,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SUCCESS", "DECODE ERR", "COM ERR", "RESYNC", "LAST SEQ"])
                .add_row(vec![
                    stats.success_count.to_string(),
                    stats.decode_error_count.to_string(),
                    stats.com_error_count.to_string(),
                    stats.resync_count.to_string(),
                    stats.last_sequence_id.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "success={} decode_errors={} com_errors={} resync={} last_seq={}",
                stats.success_count,
                stats.decode_error_count,
                stats.com_error_count,
                stats.resync_count,
                stats.last_sequence_id
            );
        }
        // Raw output carries payload bytes only.
        OutputFormat::Raw => {}
    }
}

pub fn print_encoded(frame: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Raw => print_raw(frame),
        OutputFormat::Json => {
            let hex = hex::encode(frame);
            let out = EncodedOutput {
                length: frame.len(),
                frame: &hex,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["LEN", "FRAME"])
                .add_row(vec![frame.len().to_string(), hex::encode(frame)]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", hex::encode(frame)),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(hex: &str) -> String {
    const MAX: usize = 48;
    if hex.len() <= MAX {
        hex.to_string()
    } else {
        format!("{}… ({} bytes)", &hex[..MAX], hex.len() / 2)
    }
}
