//! Tangram Memory dashboard
//!
//! Native command line access to stored progress and the pattern catalog.
//! The game itself runs in the browser build.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use tangram_memory::platform::FileStore;
    use tangram_memory::progress::ProgressTracker;
    use tangram_memory::{Catalog, CatalogError, ImportError};
    use thiserror::Error;

    #[derive(Debug, Error)]
    enum ArgsError {
        #[error("{flag} requires a value")]
        MissingValue { flag: &'static str },
        #[error("unknown argument: {0}")]
        UnknownArg(String),
        #[error("import requires a file")]
        MissingFile,
    }

    #[derive(Debug, Error)]
    enum CliError {
        #[error(transparent)]
        Args(#[from] ArgsError),
        #[error("failed to read {path}: {source}")]
        Read {
            path: PathBuf,
            source: std::io::Error,
        },
        #[error(transparent)]
        Import(#[from] ImportError),
        #[error(transparent)]
        Catalog(#[from] CatalogError),
        #[error("failed to encode progress: {0}")]
        Export(#[from] serde_json::Error),
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Command {
        Summary,
        Export { csv: bool },
        Import { file: PathBuf },
        Clear,
        ClearLevels,
        Patterns,
    }

    #[derive(Debug, Clone)]
    struct Args {
        data_dir: PathBuf,
        patterns: PathBuf,
        command: Command,
    }

    fn require_value(
        args: &mut impl Iterator<Item = String>,
        flag: &'static str,
    ) -> Result<String, ArgsError> {
        args.next().ok_or(ArgsError::MissingValue { flag })
    }

    impl Args {
        fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
            let mut data_dir = std::env::var("TANGRAM_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".tangram"));
            let mut patterns = std::env::var("TANGRAM_PATTERNS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static/patterns.json"));
            let mut command = None;
            let mut csv = false;
            let mut file = None;

            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--data-dir" => data_dir = require_value(&mut args, "--data-dir")?.into(),
                    "--patterns" => patterns = require_value(&mut args, "--patterns")?.into(),
                    "--csv" => csv = true,
                    "--help" | "-h" => {
                        print_usage();
                        std::process::exit(0);
                    }
                    "summary" | "export" | "import" | "clear" | "clear-levels" | "patterns"
                        if command.is_none() =>
                    {
                        command = Some(arg);
                    }
                    _ if command.as_deref() == Some("import") && file.is_none() => {
                        file = Some(PathBuf::from(arg));
                    }
                    _ => return Err(ArgsError::UnknownArg(arg)),
                }
            }

            let command = match command.as_deref() {
                None | Some("summary") => Command::Summary,
                Some("export") => Command::Export { csv },
                Some("import") => Command::Import {
                    file: file.ok_or(ArgsError::MissingFile)?,
                },
                Some("clear") => Command::Clear,
                Some("clear-levels") => Command::ClearLevels,
                Some("patterns") => Command::Patterns,
                Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
            };

            Ok(Self {
                data_dir,
                patterns,
                command,
            })
        }
    }

    fn print_usage() {
        eprintln!("Usage:");
        eprintln!("  tangram [options] [command]");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  summary                   Progress totals and per-pattern records (default)");
        eprintln!("  export [--csv]            Write progress to stdout as JSON or CSV");
        eprintln!("  import <file>             Merge an exported JSON file");
        eprintln!("  clear                     Delete all progress");
        eprintln!("  clear-levels              Delete per-pattern progress, keep attempts");
        eprintln!("  patterns                  List the catalog by grid size");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --data-dir <dir>          Progress directory (default: .tangram)");
        eprintln!("  --patterns <file>         Pattern catalog (default: static/patterns.json)");
        eprintln!("  -h, --help                Show this help");
        eprintln!();
        eprintln!("Environment (same as flags):");
        eprintln!("  TANGRAM_DATA_DIR, TANGRAM_PATTERNS");
    }

    fn summary(tracker: &ProgressTracker) {
        let summary = tracker.summary();
        println!("Total plays:        {}", summary.total_plays);
        println!("Total stars:        {}", summary.total_stars);
        println!("Patterns completed: {}", summary.patterns_completed);
        println!("Attempts:           {}", summary.attempts);
        println!("Average stars:      {}", summary.average_label());

        let rows = tracker.rows();
        if rows.is_empty() {
            return;
        }
        println!();
        println!("{:<16} {:>4} {:>6} {:>6} {:>6}", "pattern", "grid", "plays", "stars", "hints");
        for row in rows {
            let grid = row.grid.map(|g| g.to_string()).unwrap_or_else(|| "?".into());
            println!(
                "{:<16} {:>4} {:>6} {:>6} {:>6}",
                row.pattern, grid, row.record.plays, row.record.stars, row.record.hints
            );
        }
    }

    fn run(args: Args) -> Result<(), CliError> {
        log::debug!("Using data dir {}", args.data_dir.display());
        let mut tracker = ProgressTracker::new(Box::new(FileStore::new(&args.data_dir)));

        match args.command {
            Command::Summary => summary(&tracker),
            Command::Export { csv: true } => println!("{}", tracker.export_csv()),
            Command::Export { csv: false } => println!("{}", tracker.export_json()?),
            Command::Import { file } => {
                let json = std::fs::read_to_string(&file).map_err(|source| CliError::Read {
                    path: file.clone(),
                    source,
                })?;
                tracker.import_json(&json)?;
                println!("Progress imported from {}", file.display());
            }
            Command::Clear => {
                tracker.clear();
                println!("All progress cleared");
            }
            Command::ClearLevels => {
                tracker.clear_levels();
                println!("Level progress cleared");
            }
            Command::Patterns => {
                let catalog = Catalog::from_path(&args.patterns)?;
                println!("{} patterns in {}", catalog.len(), args.patterns.display());
                for (grid, count) in catalog.grid_sizes() {
                    println!("  {grid}x{grid}: {count}");
                }
                for pattern in catalog.patterns() {
                    let glyphs: String = pattern.shapes.iter().map(|s| s.kind.glyph()).collect();
                    println!("  {:<12} {}x{} {glyphs}", pattern.id, pattern.grid, pattern.grid);
                }
            }
        }
        Ok(())
    }

    pub fn main() {
        env_logger::init();
        let result = Args::parse(std::env::args().skip(1))
            .map_err(CliError::from)
            .and_then(run);
        if let Err(e) = result {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    cli::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_start in the library
}
