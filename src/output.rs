//! Match output in MUMmer v3 format
//!
//! Matches are printed 1-indexed, either as three right aligned columns
//! (`ref query len`) or, for multi-sequence references, with the sequence
//! description in front and the reference position made relative to it.
//! Every write goes through one mutex so concurrent workers never interleave
//! lines; workers batch matches locally and take the lock once per batch.

use crate::index::layout::ReferenceLayout;
use std::io::{self, Write};
use std::sync::Mutex;

/// Matches buffered by a worker before it takes the output lock
pub const FLUSH_THRESHOLD: usize = 1000;

/// One maximal match, 0-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Match {
    /// Start in the concatenated reference
    pub reference: usize,
    /// Start in the query
    pub query: usize,
    pub len: usize,
}

impl Match {
    pub fn new(reference: usize, query: usize, len: usize) -> Self {
        Self {
            reference,
            query,
            len,
        }
    }

    /// Last reference position covered
    pub fn reference_end(&self) -> usize {
        self.reference + self.len - 1
    }
}

/// Destination of matches found by a finder
pub trait MatchSink {
    fn push(&mut self, m: Match) -> io::Result<()>;

    /// Emit anything buffered
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Matches accepted so far
    fn emitted(&self) -> u64;
}

impl MatchSink for Vec<Match> {
    fn push(&mut self, m: Match) -> io::Result<()> {
        Vec::push(self, m);
        Ok(())
    }

    fn emitted(&self) -> u64 {
        self.len() as u64
    }
}

/// Column layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchFormat {
    /// `ref query len`
    ThreeColumn,
    /// `descr pos query len`, positions relative to each reference sequence
    FourColumn(ReferenceLayout),
}

/// Shared, serialized writer for match lines and query headers
pub struct MatchWriter {
    out: Mutex<Box<dyn Write + Send>>,
    format: MatchFormat,
}

impl MatchWriter {
    pub fn new(out: Box<dyn Write + Send>, format: MatchFormat) -> Self {
        Self {
            out: Mutex::new(out),
            format,
        }
    }

    /// Buffered writer on stdout
    pub fn stdout(format: MatchFormat) -> Self {
        Self::new(
            Box::new(io::BufWriter::with_capacity(65536, io::stdout())),
            format,
        )
    }

    pub fn format(&self) -> &MatchFormat {
        &self.format
    }

    /// Append the formatted line for `m` to `buf`
    pub fn format_match(&self, m: &Match, buf: &mut String) {
        use std::fmt::Write as _;
        // Writing into a String cannot fail
        let _ = match &self.format {
            MatchFormat::ThreeColumn => writeln!(
                buf,
                "{:>8}  {:>8}  {:>8}",
                m.reference + 1,
                m.query + 1,
                m.len
            ),
            MatchFormat::FourColumn(layout) => {
                // Only an empty layout leaves a position unresolved
                let (descr, offset) = layout.locate(m.reference).unwrap_or(("", m.reference));
                writeln!(
                    buf,
                    "  {descr:<width$} {:>8}  {:>8}  {:>8}",
                    offset + 1,
                    m.query + 1,
                    m.len,
                    width = layout.max_descr_len() + 1
                )
            }
        };
    }

    /// Print a batch of matches under one lock
    pub fn write_batch(&self, matches: &[Match]) -> io::Result<()> {
        if matches.is_empty() {
            return Ok(());
        }
        let mut text = String::with_capacity(matches.len() * 32);
        for m in matches {
            self.format_match(m, &mut text);
        }
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        out.write_all(text.as_bytes())
    }

    /// Query header line: `> name`, `> name Reverse`, optionally with
    /// `\tLen = n`
    pub fn header(name: &str, reverse: bool, query_len: Option<usize>) -> String {
        let mut line = format!("> {name}");
        if reverse {
            line.push_str(" Reverse");
        }
        if let Some(len) = query_len {
            line.push_str(&format!("\tLen = {len}"));
        }
        line.push('\n');
        line
    }

    /// Print a query header followed by its matches under one lock
    pub fn write_query(
        &self,
        name: &str,
        reverse: bool,
        query_len: Option<usize>,
        matches: &[Match],
    ) -> io::Result<()> {
        let mut text = Self::header(name, reverse, query_len);
        for m in matches {
            self.format_match(m, &mut text);
        }
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        out.write_all(text.as_bytes())
    }

    /// Flush the underlying stream
    pub fn flush(&self) -> io::Result<()> {
        self.out.lock().unwrap_or_else(|e| e.into_inner()).flush()
    }
}

/// Worker-local buffer in front of a [`MatchWriter`].
///
/// Flushes once more than [`FLUSH_THRESHOLD`] matches are pending, on
/// [`MatchSink::flush`], or when pushed a zero-length match, which is a
/// flush marker and never printed.
pub struct BufferedMatchWriter<'w> {
    writer: &'w MatchWriter,
    buffer: Vec<Match>,
    emitted: u64,
}

impl<'w> BufferedMatchWriter<'w> {
    pub fn new(writer: &'w MatchWriter) -> Self {
        Self {
            writer,
            buffer: Vec::with_capacity(FLUSH_THRESHOLD + 1),
            emitted: 0,
        }
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

impl MatchSink for BufferedMatchWriter<'_> {
    fn push(&mut self, m: Match) -> io::Result<()> {
        if m.len == 0 {
            return MatchSink::flush(self);
        }
        self.buffer.push(m);
        self.emitted += 1;
        if self.buffer.len() > FLUSH_THRESHOLD {
            MatchSink::flush(self)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.write_batch(&self.buffer)?;
        self.buffer.clear();
        Ok(())
    }

    fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl Drop for BufferedMatchWriter<'_> {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            let _ = self.writer.write_batch(&self.buffer);
        }
    }
}

/// Where a finder sends its matches
#[derive(Clone, Copy)]
pub enum MatchOutput<'w> {
    /// Return matches to the caller
    Collect,
    /// Print matches as they are found
    Print(&'w MatchWriter),
}

/// Result of a finder call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Collected matches; empty when printing
    pub matches: Vec<Match>,
    /// Number of matches found
    pub count: u64,
}
