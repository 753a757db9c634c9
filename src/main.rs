use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Args, Parser, Subcommand};
use log::{debug, info};
use sparsemem::index::{IndexInt, IndexMeta, IndexReader, SparseSuffixArray};
use sparsemem::output::MatchWriter;
use sparsemem::query::{MatchKind, Orientation, QueryOptions, read_queries, run_queries};
use sparsemem::search::{MatchConfig, Matcher};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "sparsemem")]
#[command(about = "Maximal exact matches against a sparse suffix array index")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Find matches of every query sequence against the index
    Match(MatchArgs),
    /// Show index metadata
    Stats {
        /// Index directory
        index: PathBuf,
    },
    /// Check index invariants (slow)
    Verify {
        /// Index directory
        index: PathBuf,
    },
}

#[derive(Args)]
#[command(group(ArgGroup::new("kind").args(["mum", "mumreference", "maxmatch"])))]
struct MatchArgs {
    /// Index directory
    index: PathBuf,

    /// Query FASTA file
    query: PathBuf,

    /// Matches unique in reference and query
    #[arg(long)]
    mum: bool,

    /// Matches unique in the reference (default)
    #[arg(long)]
    mumreference: bool,

    /// All maximal matches regardless of uniqueness
    #[arg(long)]
    maxmatch: bool,

    /// Minimum match length
    #[arg(short = 'l', long, default_value_t = 20)]
    min_len: usize,

    /// Search forward and reverse complement
    #[arg(short = 'b', long, conflicts_with = "reverse")]
    both: bool,

    /// Search the reverse complement only
    #[arg(short = 'r', long)]
    reverse: bool,

    /// Print the reference sequence name with every match
    #[arg(short = 'F', long)]
    four_column: bool,

    /// Match only A, C, G and T
    #[arg(short = 'n', long)]
    nucleotides_only: bool,

    /// Print query length in headers
    #[arg(short = 'L', long)]
    print_length: bool,

    /// Threads per MEM search
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Queries searched concurrently
    #[arg(long, default_value_t = 1)]
    query_threads: usize,

    /// Query chunks searched in parallel for MUMs
    #[arg(long, default_value_t = 1)]
    chunks: usize,

    /// Sparse multiplier: query positions skipped per step, in units of K
    #[arg(long)]
    skip: Option<usize>,

    /// Force suffix link simulation
    #[arg(long)]
    suffix_links: bool,

    /// Descend with binary search instead of the child table
    #[arg(long)]
    no_child: bool,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

impl MatchArgs {
    fn options(&self) -> QueryOptions {
        let kind = if self.mum {
            MatchKind::Mum
        } else if self.maxmatch {
            MatchKind::Mem
        } else {
            MatchKind::Mam
        };
        let orientation = if self.both {
            Orientation::Both
        } else if self.reverse {
            Orientation::Reverse
        } else {
            Orientation::Forward
        };
        QueryOptions {
            kind,
            min_len: self.min_len,
            orientation,
            nucleotides_only: self.nucleotides_only,
            print_length: self.print_length,
            four_column: self.four_column,
            threads: self.threads,
            chunks: self.chunks,
            query_threads: self.query_threads,
            show_progress: !self.quiet,
        }
    }

    fn config<I: IndexInt>(&self, index: &SparseSuffixArray<I>) -> MatchConfig {
        let mut config = MatchConfig::automatic(index, self.min_len);
        if let Some(skip) = self.skip {
            config.sparse_mult = skip;
            config.clamp_sparse_mult(index.sparseness(), self.min_len);
        }
        if self.suffix_links {
            config.suffix_links = true;
        }
        if self.no_child {
            config.child_table = false;
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Match(args) => {
            let meta = IndexReader::read_meta(&args.index)?;
            if meta.index_width == 8 {
                run_match::<u64>(&args)
            } else {
                run_match::<u32>(&args)
            }
        }
        Commands::Stats { index } => show_stats(&index),
        Commands::Verify { index } => {
            let meta = IndexReader::read_meta(&index)?;
            if meta.index_width == 8 {
                verify_index::<u64>(&index)
            } else {
                verify_index::<u32>(&index)
            }
        }
    }
}

fn run_match<I: IndexInt>(args: &MatchArgs) -> Result<()> {
    let options = args.options();
    options.validate()?;

    let index = IndexReader::open::<I>(&args.index)?;
    let config = args.config(&index);
    debug!("match configuration: {config:?}");
    let matcher = Matcher::new(&index, config)?;

    let queries = read_queries(&args.query, options.nucleotides_only)?;
    if queries.is_empty() {
        bail!("No sequences in {}", args.query.display());
    }

    let writer = MatchWriter::stdout(options.match_format(index.layout()));
    run_queries(&matcher, &queries, &options, &writer)?;
    Ok(())
}

fn verify_index<I: IndexInt>(dir: &Path) -> Result<()> {
    let index = IndexReader::open::<I>(dir)?;
    let started = Instant::now();
    index
        .verify()
        .with_context(|| format!("Index {} failed verification", dir.display()))?;
    info!("index verified in {:.2?}", started.elapsed());
    println!("OK");
    Ok(())
}

fn show_stats(dir: &Path) -> Result<()> {
    let meta: IndexMeta = IndexReader::read_meta(dir)?;

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Index location:   {}", dir.display());
    println!("Format version:   {}", meta.version);
    println!("Position width:   {} bytes", meta.index_width);
    println!("Sparseness (K):   {}", meta.sparseness);
    println!("Reference length: {}", meta.reference_len);
    println!("Suffixes:         {}", meta.suffix_count);
    println!("LCP overflow:     {}", meta.lcp_overflow);
    println!();
    println!("Tables:");
    println!("  ISA             {}", present(meta.has_isa));
    println!("  Child table     {}", present(meta.has_child));
    println!("  8-mer offsets   {}", present(meta.has_offsets));

    println!();
    println!("Sequences:        {}", meta.sequences.len());
    for entry in meta.sequences.iter().take(15) {
        println!("  {:15} {}", entry.descr, entry.start);
    }
    if meta.sequences.len() > 15 {
        println!("  ... and {} more", meta.sequences.len() - 15);
    }

    Ok(())
}

fn present(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
