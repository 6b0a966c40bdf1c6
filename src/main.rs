use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use loxwalk::ast_printer::AstPrinter;
use loxwalk::error::{Reporter, StderrReporter};
use loxwalk::parser::Parser;
use loxwalk::runner::{self, Status};
use loxwalk::scanner::{self, Scanner};

#[derive(ClapParser, Debug)]
#[command(version, about = "Tree-walking interpreter for Lox-style scripts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to a file
    #[arg(long, global = true)]
    log: bool,

    /// Where `--log` writes
    #[arg(long, global = true, default_value = "app.log")]
    log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses a file and prints every statement in prefix form
    Parse {
        filename: PathBuf,

        /// Print the syntax tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Runs a file as a program
    Run { filename: PathBuf },
}

/// Source text backed by a read‑only mapping of the file.  Empty files
/// cannot be mapped, so they are kept as an empty string.
enum Source {
    Empty,
    Mapped(Mmap),
}

impl Source {
    fn open(filename: &Path) -> Result<Self> {
        info!("Reading file: {:?}", filename);

        let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;

        let len = file
            .metadata()
            .with_context(|| format!("Failed to stat file {:?}", filename))?
            .len();

        if len == 0 {
            return Ok(Source::Empty);
        }

        // SAFETY: the mapping is read-only and lives only as long as this
        // process reads it; the file is not expected to change underneath.
        let map = unsafe { Mmap::map(&file) }.with_context(|| format!("Failed to map file {:?}", filename))?;

        info!("Mapped {} bytes from {:?}", map.len(), filename);

        Ok(Source::Mapped(map))
    }

    fn text(&self) -> Result<&str> {
        match self {
            Source::Empty => Ok(""),
            Source::Mapped(map) => runner::decode(map).context("Source is not valid UTF-8"),
        }
    }
}

fn init_logger(path: &Path) -> Result<()> {
    let log_file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("loxwalk::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{} {}:{}] - {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to {:?}", path);
    Ok(())
}

fn tokenize(source: &str, json: bool) -> Result<Status> {
    let mut reporter = StderrReporter::default();
    let mut tokens = Vec::new();

    for token in Scanner::new(source) {
        match token {
            Ok(token) => {
                debug!("Scanned token: {}", token);
                tokens.push(token);
            }

            Err(e) => {
                debug!("Tokenization debug: {}", e);
                reporter.report(&e);
            }
        }
    }

    let mut stdout = io::stdout().lock();

    if json {
        serde_json::to_writer_pretty(&mut stdout, &tokens).context("Failed to serialize tokens")?;
        writeln!(stdout)?;
    } else {
        for token in &tokens {
            writeln!(stdout, "{}", token)?;
        }
    }

    Ok(if reporter.reported > 0 {
        Status::StaticError
    } else {
        Status::Ok
    })
}

fn parse(source: &str, json: bool) -> Result<Status> {
    let mut reporter = StderrReporter::default();

    let (tokens, lex_errors) = scanner::scan(source);

    for error in &lex_errors {
        reporter.report(error);
    }

    let statements = Parser::new(&tokens).parse(&mut reporter);

    let mut stdout = io::stdout().lock();

    if json {
        serde_json::to_writer_pretty(&mut stdout, &statements).context("Failed to serialize syntax tree")?;
        writeln!(stdout)?;
    } else {
        for stmt in &statements {
            let printed = AstPrinter::print_stmt(stmt);
            debug!("AST: {}", printed);
            writeln!(stdout, "{}", printed)?;
        }
    }

    Ok(if reporter.reported > 0 {
        Status::StaticError
    } else {
        Status::Ok
    })
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger(&args.log_file)?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let status = match &args.commands {
        Commands::Tokenize { filename, json } => {
            info!("Running Tokenize subcommand");
            let source = Source::open(filename)?;
            tokenize(source.text()?, *json)?
        }

        Commands::Parse { filename, json } => {
            info!("Running Parse subcommand");
            let source = Source::open(filename)?;
            parse(source.text()?, *json)?
        }

        Commands::Run { filename } => {
            info!("Running Run subcommand");
            let source = Source::open(filename)?;
            let mut reporter = StderrReporter::default();
            runner::run_source(source.text()?, Box::new(io::stdout()), &mut reporter)
        }
    };

    info!("Finished with status {:?}", status);

    if status != Status::Ok {
        std::process::exit(status.exit_code());
    }

    Ok(())
}
