//! Fragment writer: marker framing around already-rendered fragments.

use std::io::Write;

use crate::config::FormatConfig;

use super::fragment::is_directive_line;

/// 片段写入器：只负责分隔，不检查片段内容
pub trait FragmentWriter: Send + Sync {
    fn begin(&self, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Write one fragment; `is_last` suppresses the trailing separator.
    fn write_fragment(
        &self,
        writer: &mut dyn Write,
        fragment: &str,
        is_last: bool,
    ) -> std::io::Result<()>;

    fn end(&self, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Whether a node body survives this framing unchanged. `Err` carries the
    /// reason it would not.
    fn check_body(&self, body: &str) -> Result<(), String> {
        let _ = body;
        Ok(())
    }
}

/// Writes each marker and separator on its own line.
#[derive(Debug, Clone)]
pub struct MarkerFragmentWriter {
    format: FormatConfig,
}

impl MarkerFragmentWriter {
    pub fn new(format: FormatConfig) -> Self {
        Self { format }
    }
}

impl Default for MarkerFragmentWriter {
    fn default() -> Self {
        Self::new(FormatConfig::default())
    }
}

impl FragmentWriter for MarkerFragmentWriter {
    fn begin(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "{}", self.format.begin_marker)
    }

    fn write_fragment(
        &self,
        writer: &mut dyn Write,
        fragment: &str,
        is_last: bool,
    ) -> std::io::Result<()> {
        writer.write_all(fragment.as_bytes())?;
        writer.write_all(b"\n")?;
        if !is_last {
            writeln!(writer, "{}", self.format.separator)?;
        }
        Ok(())
    }

    fn end(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "{}", self.format.end_marker)
    }

    fn check_body(&self, body: &str) -> Result<(), String> {
        if body.lines().next().is_some_and(is_directive_line) {
            return Err("body starts with a directive line".to_string());
        }
        let separator = self.format.separator.trim();
        let end = self.format.end_marker.trim();
        match body.lines().map(str::trim).find(|l| *l == separator || *l == end) {
            Some(line) => Err(format!("body contains marker line '{}'", line)),
            None => Ok(()),
        }
    }
}
