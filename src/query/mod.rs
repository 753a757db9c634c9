//! Query driver
//!
//! Runs one match finder over every query sequence, in forward and/or
//! reverse complement orientation, and prints each pass as a header line
//! followed by its matches. Queries are spread over a worker pool; each
//! pass is written under the output lock in one piece.

pub mod reader;

pub use reader::{QueryRecord, parse_fasta, read_queries};

use crate::error::SearchError;
use crate::index::layout::ReferenceLayout;
use crate::index::types::IndexInt;
use crate::output::{MatchFormat, MatchOutput, MatchReport, MatchWriter};
use crate::search::Matcher;
use crate::utils::dna::reverse_complement;
use crate::utils::progress::query_progress;
use anyhow::{Context, Result, bail};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Which maximal matches to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Unique in reference and query
    Mum,
    /// Unique in the reference
    #[default]
    Mam,
    /// All maximal exact matches
    Mem,
}

/// Query strands to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Forward,
    /// Reverse complement only
    Reverse,
    Both,
}

impl Orientation {
    pub fn forward(self) -> bool {
        matches!(self, Orientation::Forward | Orientation::Both)
    }

    pub fn reverse(self) -> bool {
        matches!(self, Orientation::Reverse | Orientation::Both)
    }
}

/// Options for a batch of queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    pub kind: MatchKind,
    /// Minimum match length
    pub min_len: usize,
    pub orientation: Orientation,
    /// Mask every non-ACGT query character
    pub nucleotides_only: bool,
    /// Append `\tLen = n` to query headers
    pub print_length: bool,
    /// Print `descr pos query len` lines
    pub four_column: bool,
    /// Workers for the K phases of a MEM search
    pub threads: usize,
    /// Query spans searched in parallel by MUM
    pub chunks: usize,
    /// Queries processed concurrently
    pub query_threads: usize,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            kind: MatchKind::default(),
            min_len: 20,
            orientation: Orientation::default(),
            nucleotides_only: false,
            print_length: false,
            four_column: false,
            threads: 1,
            chunks: 1,
            query_threads: 1,
            show_progress: false,
        }
    }
}

impl QueryOptions {
    pub fn validate(&self) -> Result<()> {
        if self.min_len == 0 {
            bail!("minimum match length must be at least 1");
        }
        if self.threads == 0 || self.chunks == 0 || self.query_threads == 0 {
            bail!("thread, chunk and query thread counts must be at least 1");
        }
        Ok(())
    }

    /// Output format for an index with `layout`. Multi-sequence references
    /// always print four columns.
    pub fn match_format(&self, layout: &ReferenceLayout) -> MatchFormat {
        if self.four_column || layout.len() > 1 {
            MatchFormat::FourColumn(layout.clone())
        } else {
            MatchFormat::ThreeColumn
        }
    }
}

/// Totals for a query batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuerySummary {
    pub queries: usize,
    /// Forward and reverse passes run
    pub passes: usize,
    pub matches: u64,
}

/// Run one finder over a single sequence, collecting its matches
pub fn find_matches<I: IndexInt>(
    matcher: &Matcher<'_, I>,
    seq: &[u8],
    options: &QueryOptions,
) -> Result<MatchReport, SearchError> {
    let output = MatchOutput::Collect;
    match options.kind {
        MatchKind::Mum => matcher.mum_parallel(seq, options.chunks, options.min_len, output),
        MatchKind::Mam => matcher.mam(seq, options.min_len, output),
        MatchKind::Mem => matcher.mem(seq, options.min_len, output, options.threads),
    }
}

/// Search every query and print the results to `writer`
pub fn run_queries<I: IndexInt>(
    matcher: &Matcher<'_, I>,
    queries: &[QueryRecord],
    options: &QueryOptions,
    writer: &MatchWriter,
) -> Result<QuerySummary> {
    options.validate()?;
    let started = Instant::now();
    let progress = query_progress(queries.len() as u64, options.show_progress);

    // One pool for every parallel finder call in the batch
    let search_workers = match options.kind {
        MatchKind::Mem if matcher.index().sparseness() > 1 => options.threads,
        MatchKind::Mum => options.chunks,
        _ => 1,
    };
    let search_pool = if search_workers > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(search_workers)
            .build()
            .context("Failed to build search thread pool")?;
        debug!("search pool with {search_workers} threads");
        Some(pool)
    } else {
        None
    };
    let matcher = match &search_pool {
        Some(pool) => matcher.with_pool(pool),
        None => *matcher,
    };
    let matcher = &matcher;

    let process = |query: &QueryRecord| -> Result<QuerySummary> {
        let summary = process_query(matcher, query, options, writer)?;
        if let Some(pb) = &progress {
            pb.inc(1);
        }
        Ok(summary)
    };

    let summaries: Vec<QuerySummary> = if options.query_threads == 1 {
        queries.iter().map(process).collect::<Result<_>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.query_threads)
            .build()
            .context("Failed to build query thread pool")?;
        pool.install(|| queries.par_iter().map(process).collect::<Result<_>>())?
    };

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    writer.flush().context("Failed to flush match output")?;

    let total = summaries
        .into_iter()
        .fold(QuerySummary::default(), |acc, s| QuerySummary {
            queries: acc.queries + s.queries,
            passes: acc.passes + s.passes,
            matches: acc.matches + s.matches,
        });
    info!(
        "{} queries, {} passes, {} matches in {:.2?}",
        total.queries,
        total.passes,
        total.matches,
        started.elapsed()
    );
    Ok(total)
}

fn process_query<I: IndexInt>(
    matcher: &Matcher<'_, I>,
    query: &QueryRecord,
    options: &QueryOptions,
    writer: &MatchWriter,
) -> Result<QuerySummary> {
    let mut summary = QuerySummary {
        queries: 1,
        ..QuerySummary::default()
    };
    let query_len = options.print_length.then_some(query.seq.len());

    if options.orientation.forward() {
        let report = find_matches(matcher, &query.seq, options)
            .with_context(|| format!("Search failed for query {}", query.name))?;
        writer.write_query(&query.name, false, query_len, &report.matches)?;
        debug!("{}: {} forward matches", query.name, report.count);
        summary.passes += 1;
        summary.matches += report.count;
    }

    if options.orientation.reverse() {
        let mut seq = query.seq.clone();
        reverse_complement(&mut seq);
        let report = find_matches(matcher, &seq, options)
            .with_context(|| format!("Search failed for query {} (reverse)", query.name))?;
        writer.write_query(&query.name, true, query_len, &report.matches)?;
        debug!("{}: {} reverse matches", query.name, report.count);
        summary.passes += 1;
        summary.matches += report.count;
    }

    Ok(summary)
}
