use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sel_cli::commands::select_ops::SelectOptions;
use sel_cli::commands::{config_ops, merge_ops, model_ops, select_ops};
use sel_cli::trace_init::init_tracing;
use sel_core::settings::settings;

#[derive(Parser)]
#[command(name = "seltool", about = "Active-learning word selection tool")]
struct Cli {
    /// Custom settings TOML (see `seltool settings-export`)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank a word pool and select words for annotation
    Select {
        /// Lexicon file (text or compiled)
        lexicon: PathBuf,
        /// Word pool to select from
        pool: PathBuf,
        /// Selection metric (see `seltool metrics`)
        metric: String,
        /// Number of words to select (default: selection.default_count)
        #[arg(short)]
        n: Option<usize>,
        /// Already annotated words
        #[arg(long)]
        seen: Option<PathBuf>,
        /// Words rejected as non-words
        #[arg(long)]
        nonwords: Option<PathBuf>,
        /// Configure the metric from this word list instead of the pool
        #[arg(long)]
        config_corpus: Option<PathBuf>,
        /// Words with existing annotations: may be selected, not re-elicited
        #[arg(long)]
        old_oracle: Option<PathBuf>,
        /// Representative sampling over this many top-ranked words
        #[arg(long)]
        representative: Option<usize>,
        /// Seed for representative sampling
        #[arg(long)]
        seed: Option<u64>,
        /// Low-alpha lexicon (alphabracket_* metrics)
        #[arg(long)]
        low_lexicon: Option<PathBuf>,
        /// High-alpha lexicon (alphabracket_* metrics)
        #[arg(long)]
        hi_lexicon: Option<PathBuf>,
        /// Output directory
        #[arg(long, default_value = "selections")]
        outdir: PathBuf,
        /// Output file stem (default: metric name)
        #[arg(long)]
        out_name: Option<String>,
    },
    /// Select by substring coverage from words on stdin
    Substrings {
        /// Number of words to select
        n: usize,
    },
    /// Diversify a ranked list by k-medoids over edit distance
    Representative {
        /// Ranked word list
        infile: PathBuf,
        /// Output file
        outfile: PathBuf,
        /// Number of top-ranked words to cluster
        #[arg(long, default_value = "500")]
        truncate: usize,
        /// Number of words to select
        #[arg(short, default_value = "50")]
        n: usize,
        /// Random seed (default: representative.seed)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Interleave several ranked lists
    Roundrobin {
        /// Ranked word lists
        #[arg(required = true)]
        infiles: Vec<PathBuf>,
        /// Output file
        #[arg(long, default_value = "roundrobin.selected")]
        outfile: PathBuf,
        /// Number of words to keep
        #[arg(short, default_value = "50")]
        n: usize,
    },
    /// List the available selection metrics
    Metrics,
    /// Show the N-best analyses of a word
    Analyze {
        /// Lexicon file (text or compiled)
        lexicon: PathBuf,
        /// Word to analyze
        word: String,
        /// Number of analyses
        #[arg(short, default_value = "5")]
        n: usize,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Compile a text lexicon into the binary format
    CompileLexicon {
        /// Text lexicon (morph<TAB>CAT<TAB>count)
        input: PathBuf,
        /// Output file
        output: PathBuf,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing();
    if let Some(path) = &cli.settings {
        config_ops::load_settings(path);
    }

    match cli.command {
        Command::Select {
            lexicon,
            pool,
            metric,
            n,
            seen,
            nonwords,
            config_corpus,
            old_oracle,
            representative,
            seed,
            low_lexicon,
            hi_lexicon,
            outdir,
            out_name,
        } => select_ops::select_cmd(&SelectOptions {
            lexicon,
            pool,
            metric,
            n: n.unwrap_or(settings().selection.default_count),
            seen,
            nonwords,
            config_corpus,
            old_oracle,
            representative,
            seed,
            low_lexicon,
            hi_lexicon,
            outdir,
            out_name,
        }),
        Command::Substrings { n } => select_ops::substrings_cmd(n),
        Command::Representative {
            infile,
            outfile,
            truncate,
            n,
            seed,
        } => merge_ops::representative_cmd(&infile, &outfile, truncate, n, seed),
        Command::Roundrobin {
            infiles,
            outfile,
            n,
        } => merge_ops::roundrobin_cmd(&infiles, &outfile, n),
        Command::Metrics => model_ops::metrics_cmd(),
        Command::Analyze {
            lexicon,
            word,
            n,
            json,
        } => model_ops::analyze_cmd(&lexicon, &word, n, json),
        Command::CompileLexicon { input, output } => {
            model_ops::compile_lexicon_cmd(&input, &output)
        }
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
