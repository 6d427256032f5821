use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use remotebit::frame::{component_name, to_hex, Frame};
use serde::Serialize;

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

/// One handler invocation observed by `listen`.
#[derive(Debug, Clone)]
pub enum Event {
    Values { component: u8, id: u8, values: Vec<u16> },
    Buffer { component: u8, id: u8, bytes: Vec<u8> },
}

#[derive(Serialize)]
struct EventOutput<'a> {
    kind: &'a str,
    component: u8,
    component_name: &'a str,
    id: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<&'a [u16]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<&'a [u8]>,
    timestamp: String,
}

pub fn print_event(event: &Event, format: OutputFormat) {
    let (kind, component, id, values, bytes) = match event {
        Event::Values {
            component,
            id,
            values,
        } => ("values", *component, *id, Some(values.as_slice()), None),
        Event::Buffer {
            component,
            id,
            bytes,
        } => ("buffer", *component, *id, None, Some(bytes.as_slice())),
    };

    match format {
        OutputFormat::Json => {
            let out = EventOutput {
                kind,
                component,
                component_name: component_name(component),
                id,
                values,
                bytes,
                timestamp: now_unix_seconds(),
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
                .set_header(vec!["KIND", "COMPONENT", "ID", "DATA"])
                .add_row(vec![
                    kind.to_string(),
                    format!("{component} ({})", component_name(component)),
                    id.to_string(),
                    data_preview(values, bytes),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{kind} component={component} ({}) id={id} data={}",
                component_name(component),
                data_preview(values, bytes)
            );
        }
        OutputFormat::Raw => match (values, bytes) {
            (Some(values), _) => {
                let raw: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
                print_raw(&raw);
            }
            (None, Some(bytes)) => print_raw(bytes),
            (None, None) => {}
        },
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    component: u8,
    component_name: &'a str,
    id: u8,
    length: usize,
    hex: String,
    values: Vec<u16>,
    buffer: Vec<u8>,
}

/// Print a frame with both handler views of its payload.
pub fn print_frame(frame: &Frame, format: OutputFormat) {
    let wire = frame.to_bytes();
    let values = frame.values();
    let buffer = frame.truncated_buffer().to_vec();

    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                component: frame.component,
                component_name: component_name(frame.component),
                id: frame.id,
                length: wire.len(),
                hex: to_hex(&wire),
                values,
                buffer,
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
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec![
                    "component".to_string(),
                    format!("{} ({})", frame.component, component_name(frame.component)),
                ])
                .add_row(vec!["id".to_string(), frame.id.to_string()])
                .add_row(vec!["length".to_string(), wire.len().to_string()])
                .add_row(vec!["hex".to_string(), to_hex(&wire)])
                .add_row(vec!["values".to_string(), format!("{values:?}")])
                .add_row(vec!["buffer".to_string(), format!("{buffer:?}")]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "component={} ({}) id={} length={} hex={} values={values:?} buffer={buffer:?}",
                frame.component,
                component_name(frame.component),
                frame.id,
                wire.len(),
                to_hex(&wire)
            );
        }
        OutputFormat::Raw => print_raw(&wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn data_preview(values: Option<&[u16]>, bytes: Option<&[u8]>) -> String {
    match (values, bytes) {
        (Some(values), _) => format!("{values:?}"),
        (None, Some(bytes)) => format!("{bytes:?}"),
        (None, None) => String::new(),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
