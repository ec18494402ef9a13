//! The Tally compiler CLI.
//!
//! Provides the `tallyc` command with the following subcommands:
//!
//! - `tallyc build <file>` - Compile a program and print its SSA listing
//! - `tallyc check <file>` - Type check and print each reachable signature
//!
//! Options:
//! - `--entry` - Function to specialize (default `main`)
//! - `--invoke` - Signature the entry is called with (default `() -> void`)
//! - `--prims` - TOML primitive table
//! - `--integer-literals` - Tag every literal constant as `int`
//! - `--emit` - What `build` prints: `ssa`, `mir`, `cst` or `tokens`
//! - `--json` - Output diagnostics as JSON (one object per line)

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

use tallyc::diagnostics::{render_diagnostic, to_json};
use tallyc::{load_primitives, CompileError, CompileOptions, LiteralTagging};

#[derive(Parser)]
#[command(name = "tallyc", version, about = "The Tally compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a program and print the generated code
    Build {
        /// Path to the source file
        file: PathBuf,

        #[command(flatten)]
        common: CommonArgs,

        /// Tag every numeric literal constant as `int`
        #[arg(long = "integer-literals")]
        integer_literals: bool,

        /// What to print
        #[arg(long, value_enum, default_value_t = Emit::Ssa)]
        emit: Emit,
    },
    /// Type check a program and print each reachable function's signature
    Check {
        /// Path to the source file
        file: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Entry function to specialize
    #[arg(long, default_value = "main")]
    entry: String,

    /// Signature the entry is invoked with, e.g. "(float, float) -> float"
    #[arg(long = "invoke", default_value = "() -> void")]
    invoke: String,

    /// TOML file with the primitive table
    #[arg(long = "prims")]
    prims: Option<PathBuf>,

    /// Output diagnostics as JSON (one object per line)
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    Ssa,
    Mir,
    Cst,
    Tokens,
}

/// Why a command failed: bad input before compiling, or a compile error
/// to be reported against the source.
enum Failure {
    Setup(String),
    Compile {
        error: CompileError,
        source: String,
        file: PathBuf,
    },
}

fn main() {
    tallyc::init_tracing();
    let cli = Cli::parse();

    let (result, json) = match cli.command {
        Commands::Build {
            file,
            common,
            integer_literals,
            emit,
        } => {
            let json = common.json;
            (build(&file, &common, integer_literals, emit), json)
        }
        Commands::Check { file, common } => {
            let json = common.json;
            (check(&file, &common), json)
        }
    };

    match result {
        Ok(output) => print!("{output}"),
        Err(failure) => {
            report(&failure, json);
            process::exit(1);
        }
    }
}

fn options(common: &CommonArgs) -> Result<CompileOptions, Failure> {
    let mut options = CompileOptions::new()
        .entry(common.entry.as_str())
        .invoke(&common.invoke)
        .map_err(|e| Failure::Setup(e.to_string()))?;
    if let Some(path) = &common.prims {
        let primitives = load_primitives(path).map_err(|e| Failure::Setup(e.to_string()))?;
        options = options.primitives(primitives);
    }
    Ok(options)
}

fn read_source(file: &Path) -> Result<String, Failure> {
    std::fs::read_to_string(file)
        .map_err(|e| Failure::Setup(format!("failed to read '{}': {}", file.display(), e)))
}

fn build(
    file: &Path,
    common: &CommonArgs,
    integer_literals: bool,
    emit: Emit,
) -> Result<String, Failure> {
    let source = read_source(file)?;

    match emit {
        Emit::Tokens => {
            let mut out = String::new();
            for token in tally_lexer::Lexer::tokenize(&source) {
                let line = serde_json::to_string(&token)
                    .map_err(|e| Failure::Setup(e.to_string()))?;
                out.push_str(&line);
                out.push('\n');
            }
            return Ok(out);
        }
        Emit::Cst => {
            let parse = tally_parser::parse(&source);
            let tree = tally_parser::debug_tree(&parse.syntax());
            return match parse.into_result() {
                Ok(_) => Ok(tree),
                Err(error) => Err(compile_failure(error.into(), source, file)),
            };
        }
        Emit::Ssa | Emit::Mir => {}
    }

    let tagging = if integer_literals {
        LiteralTagging::Integer
    } else {
        LiteralTagging::Lexical
    };
    let options = options(common)?.literal_tagging(tagging);
    let compilation = match tallyc::compile(&source, &options) {
        Ok(compilation) => compilation,
        Err(error) => return Err(compile_failure(error, source, file)),
    };
    Ok(match emit {
        Emit::Mir => compilation.module.to_string(),
        _ => compilation.listing,
    })
}

fn check(file: &Path, common: &CommonArgs) -> Result<String, Failure> {
    let source = read_source(file)?;
    let options = options(common)?;
    match tallyc::check(&source, &options) {
        Ok(checked) => {
            let mut out = String::new();
            for signature in checked.signatures() {
                out.push_str(&signature);
                out.push('\n');
            }
            Ok(out)
        }
        Err(error) => Err(compile_failure(error, source, file)),
    }
}

fn compile_failure(error: CompileError, source: String, file: &Path) -> Failure {
    Failure::Compile {
        error,
        source,
        file: file.to_path_buf(),
    }
}

fn report(failure: &Failure, json: bool) {
    match failure {
        Failure::Setup(message) => {
            if json {
                let msg = serde_json::json!({
                    "code": "T0000",
                    "severity": "error",
                    "message": message,
                    "file": "",
                    "spans": [],
                });
                eprintln!("{}", msg);
            } else {
                eprintln!("error: {}", message);
            }
        }
        Failure::Compile {
            error,
            source,
            file,
        } => {
            if json {
                eprintln!("{}", to_json(error, &file.display().to_string()));
            } else {
                eprint!("{}", render_diagnostic(error, source));
            }
        }
    }
}
