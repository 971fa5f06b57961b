use crate::error::Result;
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

/// Where rendered lines go: stdout, or a file truncated on open.
///
/// The file handle is released when the sink drops, whether or not every
/// line was written. Lines already written stay in the file.
pub enum ReportSink {
    Console(Stdout),
    File(BufWriter<File>),
}

impl ReportSink {
    /// Empty `output_file` means the console.
    pub fn open(output_file: &str) -> Result<Self> {
        if output_file.is_empty() {
            return Ok(ReportSink::Console(io::stdout()));
        }
        let file = File::create(Path::new(output_file))?;
        Ok(ReportSink::File(BufWriter::new(file)))
    }

    pub fn is_console(&self) -> bool {
        matches!(self, ReportSink::Console(_))
    }
}

impl Write for ReportSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            ReportSink::Console(out) => out.write(buf),
            ReportSink::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            ReportSink::Console(out) => out.flush(),
            ReportSink::File(file) => file.flush(),
        }
    }
}

/// Write each line followed by a newline, then flush.
pub fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}
