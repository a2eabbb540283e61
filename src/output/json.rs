use crate::merch::MerchRecord;
use crate::output::traits::{OutputResult, RecordSink};
use std::io::Write;

/// Writes records as a single JSON array followed by a newline
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonSink<W> {
    fn write_records(&mut self, records: &[MerchRecord]) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, records)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
