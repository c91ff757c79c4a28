// Result and error rendering
//
// Results go to stdout as JSON documents, error records to stderr as one
// compact JSON line.

use std::error::Error;
use std::io::{self, Write};

use agentctl_config::OutputFormat;
use agentctl_core::{AdapterError, OutputSink};
use serde_json::{json, Value};

/// Writes each emitted value as one JSON document.
pub struct JsonSink<W: Write> {
    out: W,
    format: OutputFormat,
}

impl JsonSink<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputSink for JsonSink<W> {
    fn emit(&mut self, value: &Value) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => serde_json::to_writer_pretty(&mut self.out, value)?,
            OutputFormat::Jsonl => serde_json::to_writer(&mut self.out, value)?,
        }
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

/// Error record for an adapter failure.
pub fn adapter_error_record(err: &AdapterError) -> Value {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }

    json!({
        "error": {
            "code": err.code().as_str(),
            "kind": err.kind(),
            "message": err.to_string(),
            "operation": err.operation(),
            "causes": causes,
        }
    })
}

/// Error record for failures outside the adapter, e.g. configuration.
/// These have no stable code and no operation.
pub fn glue_error_record(kind: &str, err: &anyhow::Error) -> Value {
    let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
    json!({
        "error": {
            "code": Value::Null,
            "kind": kind,
            "message": err.to_string(),
            "operation": Value::Null,
            "causes": causes,
        }
    })
}

pub fn print_error_record(record: &Value) {
    eprintln!("{record}");
}
