use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use clap::Parser;

use ctxpack::cli::{
    AppContext, AssembleArgs, Cli, Commands, DiffSplitArgs, OptimizeArgs, OptimizePreset,
    OutputFormatArg, SplitArgs, SplitStrategyArg, StreamArgs,
};
use ctxpack::core::format::{Entry, OutputFormat, format_context};
use ctxpack::core::optimize::skeleton::AnalyzerRegistry;
use ctxpack::core::optimize::{OptimizeOptions, optimize_batch, optimize_content};
use ctxpack::core::split::{SplitSettings, SplitStrategy, split};
use ctxpack::core::stream::{BuildResult, build_context};
use ctxpack::core::util::CancellationToken;
use ctxpack::infra::{FileWalker, config, load_config};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = AppContext { quiet: cli.quiet, no_color: cli.no_color, dry_run: cli.dry_run };

    match cli.command {
        Commands::Assemble(args) => run_assemble(args, &ctx),
        Commands::Optimize(args) => run_optimize(args, &ctx),
        Commands::Split(args) => run_split(args, &ctx),
        Commands::DiffSplit(args) => run_diff_split(args, &ctx),
        Commands::Stream(args) => run_stream(args, &ctx),
        Commands::Init(args) => config::init(args, &ctx),
        Commands::Completions(args) => ctxpack::completion::run(args, &ctx),
    }
}

fn preset_to_opts(preset: OptimizePreset) -> OptimizeOptions {
    match preset {
        OptimizePreset::Default => OptimizeOptions::default(),
        OptimizePreset::Aggressive => OptimizeOptions::aggressive(),
        OptimizePreset::Skeleton => OptimizeOptions::skeleton(),
    }
}

fn format_from_arg(fmt: OutputFormatArg) -> OutputFormat {
    match fmt {
        OutputFormatArg::Plain => OutputFormat::Plain,
        OutputFormatArg::Manifest => OutputFormat::Manifest,
        OutputFormatArg::Json => OutputFormat::Json,
        OutputFormatArg::Markdown => OutputFormat::Markdown,
        OutputFormatArg::Xml => OutputFormat::Xml,
    }
}

fn run_assemble(args: AssembleArgs, ctx: &AppContext) -> Result<()> {
    let cfg = load_config().unwrap_or_default();

    let mut patterns = cfg.ignore_patterns.clone();
    patterns.extend(args.ignore.clone());

    let walker = FileWalker::new(&patterns).context("build file walker")?;
    let files = walker.walk_files(&args.path);

    if !ctx.quiet {
        tracing::info!(count = files.len(), "discovered files");
    }

    let opts = preset_to_opts(args.preset);
    let registry = AnalyzerRegistry::with_defaults().ok();
    let cancel = CancellationToken::new();

    match build_context(&args.path, &files, &opts, registry.as_ref(), &cancel)? {
        BuildResult::InMemory { summary, artifact } => {
            if !ctx.quiet {
                tracing::info!(
                    files = summary.file_count,
                    tokens = summary.token_count,
                    "assembled context"
                );
            }
            let entries = ctxpack::core::format::parse_context(&artifact);
            let rendered = if matches!(format_from_arg(args.format), OutputFormat::Plain) {
                artifact
            } else {
                format_context(&entries, format_from_arg(args.format))
            };
            write_output(&rendered, args.output.as_deref())
        }
        BuildResult::Streaming(stream) => {
            if !ctx.quiet {
                tracing::warn!(
                    lines = stream.total_lines(),
                    "project too large to hold in memory; use `stream` to page through it"
                );
            }
            Ok(())
        }
    }
}

fn run_optimize(args: OptimizeArgs, _ctx: &AppContext) -> Result<()> {
    let opts = preset_to_opts(args.preset);
    let registry = AnalyzerRegistry::with_defaults().ok();

    if args.files.len() > 1 {
        let inputs: Vec<(std::path::PathBuf, String)> = args
            .files
            .iter()
            .map(|p| {
                let content = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
                Ok::<_, anyhow::Error>((p.clone(), content))
            })
            .collect::<Result<_>>()?;

        let cancel = CancellationToken::new();
        let (results, stats) = optimize_batch(&inputs, &opts, registry.as_ref(), &cancel);

        if !args.in_place {
            tracing::info!(
                saved_percent = stats.saved_percent,
                skeletons = stats.skeletons_used,
                "optimization summary"
            );
        }

        for (path, content) in results {
            if args.in_place {
                fs::write(&path, content).with_context(|| format!("write {}", path.display()))?;
            } else {
                println!("--- File: {} ---", path.display());
                println!("{content}");
            }
        }
        return Ok(());
    }

    for path in &args.files {
        let content = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let optimized = optimize_content(path, &content, &opts, registry.as_ref());
        if args.in_place {
            fs::write(path, optimized).with_context(|| format!("write {}", path.display()))?;
        } else {
            print!("{optimized}");
        }
    }
    Ok(())
}

fn read_input(input: &Option<std::path::PathBuf>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path).with_context(|| format!("read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("read stdin")?;
            Ok(buf)
        }
    }
}

fn write_chunks(chunks: Vec<String>, output_dir: Option<std::path::PathBuf>) -> Result<()> {
    match output_dir {
        Some(dir) => {
            fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
            for (i, chunk) in chunks.iter().enumerate() {
                let path = dir.join(format!("chunk-{i:04}.txt"));
                fs::write(&path, chunk).with_context(|| format!("write {}", path.display()))?;
            }
            Ok(())
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            for (i, chunk) in chunks.iter().enumerate() {
                if i > 0 {
                    writeln!(handle, "\n----- chunk boundary -----\n")?;
                }
                write!(handle, "{chunk}")?;
            }
            Ok(())
        }
    }
}

fn run_split(args: SplitArgs, _ctx: &AppContext) -> Result<()> {
    let text = read_input(&args.input)?;
    let strategy = match args.strategy {
        SplitStrategyArg::File => SplitStrategy::File,
        SplitStrategyArg::Token => SplitStrategy::Token,
        SplitStrategyArg::Smart => SplitStrategy::Smart,
    };
    let settings = SplitSettings::new(args.max_tokens, args.overlap, strategy)?;
    let chunks = split(&text, &settings)?;
    write_chunks(chunks, args.output_dir)
}

fn run_diff_split(args: DiffSplitArgs, _ctx: &AppContext) -> Result<()> {
    let text = read_input(&args.input)?;
    let chunks = ctxpack::core::diffsplit::split_diff(&text, args.max_lines);
    write_chunks(chunks, args.output_dir)
}

fn run_stream(args: StreamArgs, ctx: &AppContext) -> Result<()> {
    let cfg = load_config().unwrap_or_default();
    let mut patterns = cfg.ignore_patterns.clone();
    patterns.extend(args.ignore.clone());

    let walker = FileWalker::new(&patterns).context("build file walker")?;
    let files = walker.walk_files(&args.path);

    let opts = OptimizeOptions::default();
    let registry = AnalyzerRegistry::with_defaults().ok();
    let cancel = CancellationToken::new();

    match build_context(&args.path, &files, &opts, registry.as_ref(), &cancel)? {
        BuildResult::Streaming(mut stream) => {
            let chunk = stream.get_context_content(args.start_line, args.line_count)?;
            print!("{}", chunk.text);
            if !ctx.quiet {
                tracing::info!(eof = chunk.eof, total_lines = stream.total_lines(), "page served");
            }
            Ok(())
        }
        BuildResult::InMemory { artifact, .. } => {
            let entries: Vec<Entry> = ctxpack::core::format::parse_context(&artifact);
            let rendered = format_context(&entries, OutputFormat::Plain);
            let lines: Vec<&str> = rendered.lines().collect();
            let end = (args.start_line + args.line_count).min(lines.len());
            let page = lines.get(args.start_line..end).unwrap_or(&[]).join("\n");
            println!("{page}");
            Ok(())
        }
    }
}

fn write_output(content: &str, output: Option<&std::path::Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, content).with_context(|| format!("write {}", path.display())),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}
