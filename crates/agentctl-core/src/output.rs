//! Destination for projected values.

use serde_json::Value;

/// Receives each emitted value in order.
pub trait OutputSink {
    fn emit(&mut self, value: &Value) -> std::io::Result<()>;
}

impl OutputSink for Vec<Value> {
    fn emit(&mut self, value: &Value) -> std::io::Result<()> {
        self.push(value.clone());
        Ok(())
    }
}
