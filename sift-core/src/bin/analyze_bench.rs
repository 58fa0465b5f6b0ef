//! Analysis Benchmarking Tool
//!
//! Measures throughput of the analysis pipeline on a large UTF-8 file, such as
//! a Wikipedia abstracts dump.
//!
//! ## What It Benchmarks
//!
//! 1. **Char filter**: every filter stage of the pipeline, in order
//! 2. **Tokenize**: the tokenizer alone, on already-filtered text
//! 3. **Pipeline**: [`Analyzer::analyze`] end to end (materialized tokens)
//!
//! ## Usage
//!
//! ```bash
//! # Standard pipeline
//! ./target/release/analyze_bench /path/to/wiki.txt
//!
//! # Pipeline described by a JSON config
//! ./target/release/analyze_bench /path/to/wiki.txt pipeline.json
//! ```
//!
//! Set `RUST_LOG=debug` to see pipeline construction on stderr.
//!
//! ## Example Output
//!
//! ```text
//! === Pipeline ===
//! --------------------------------
//! Mode        : Pipeline
//! Elapsed     : 0.452 s
//! Throughput  : 0.218 GiB/s
//! Tokens      : 15_489_234
//! Tokens/sec  : 34_265_478
//! --------------------------------
//! ```

use std::env;
use std::fs;
use std::time::{Duration, Instant};

use sift_core::{AnalysisError, Analyzer, PipelineConfig};
use tracing_subscriber::EnvFilter;

const WARMUP_RUNS: usize = 1;
const MEASURE_RUNS: usize = 5;

fn main() -> Result<(), AnalysisError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: analyze_bench <path> [config.json]");
        std::process::exit(1);
    }

    let analyzer = match args.get(2) {
        Some(config) => PipelineConfig::from_json(&fs::read_to_string(config)?)?.to_analyzer(),
        None => Analyzer::standard(),
    };

    println!("Loading file...");
    let input = fs::read_to_string(&args[1])?;

    println!("File size:   {}", fmt_bytes(input.len() as u64));
    println!("Filters:     {}", analyzer.pipeline().filters().len());
    println!("Fingerprint: {:016x}\n", analyzer.pipeline().fingerprint());

    let filtered = bench_char_filter(&analyzer, &input);
    bench_tokenize(&analyzer, &filtered);
    bench_pipeline(&analyzer, &input);

    Ok(())
}

fn bench_char_filter(analyzer: &Analyzer, input: &str) -> String {
    println!("=== Char filter ===");

    warmup(|| {
        std::hint::black_box(analyzer.filter(input));
    });

    let elapsed = measure(|| {
        std::hint::black_box(analyzer.filter(input));
    });

    print_perf("Char filter", input.len(), elapsed, 0);
    analyzer.filter(input).into_owned()
}

fn bench_tokenize(analyzer: &Analyzer, filtered: &str) {
    let stage = analyzer.pipeline().tokenizer();
    let options = analyzer.pipeline().effective_tokenizer_options();

    println!("=== Tokenize ===");

    warmup(|| {
        std::hint::black_box(stage.tokenize(filtered, &options).len());
    });

    let mut tokens = 0u64;
    let elapsed = measure(|| {
        tokens = stage.tokenize(filtered, &options).len() as u64;
        std::hint::black_box(tokens);
    });

    print_perf("Tokenize", filtered.len(), elapsed, tokens);
}

fn bench_pipeline(analyzer: &Analyzer, input: &str) {
    println!("=== Pipeline ===");

    warmup(|| {
        std::hint::black_box(analyzer.analyze(input));
    });

    let mut tokens = 0u64;
    let elapsed = measure(|| {
        tokens = analyzer.analyze(input).tokens().len() as u64;
        std::hint::black_box(tokens);
    });

    print_perf("Pipeline", input.len(), elapsed, tokens);
}

fn warmup<F: FnMut()>(mut f: F) {
    for _ in 0..WARMUP_RUNS {
        f();
    }
}

fn measure<F: FnMut()>(mut f: F) -> Duration {
    let mut total = Duration::ZERO;

    for _ in 0..MEASURE_RUNS {
        let start = Instant::now();
        f();
        total += start.elapsed();
    }

    total / MEASURE_RUNS as u32
}

fn print_perf(label: &str, input_bytes: usize, elapsed: Duration, tokens: u64) {
    let secs = elapsed.as_secs_f64();
    let gib = input_bytes as f64 / (1024.0 * 1024.0 * 1024.0);

    println!("--------------------------------");
    println!("Mode        : {label}");
    println!("Elapsed     : {secs:.3} s");
    println!("Throughput  : {:.3} GiB/s", gib / secs);

    if tokens > 0 {
        println!("Tokens      : {}", fmt_count(tokens));
        println!("Tokens/sec  : {}", fmt_count((tokens as f64 / secs) as u64));
    }

    println!("--------------------------------\n");
}

fn fmt_bytes(b: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    match b {
        b if b >= GIB => format!("{:.2} GiB", b as f64 / GIB as f64),
        b if b >= MIB => format!("{:.2} MiB", b as f64 / MIB as f64),
        b if b >= KIB => format!("{:.2} KiB", b as f64 / KIB as f64),
        b => format!("{b} B"),
    }
}

fn fmt_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
    }

    out
}
