use color_print::cprintln;
use std::io::BufRead;
use std::path::Path;
use std::process::ExitCode;

use tas::{
    assemble::{assemble_with, Pass},
    config::{Config, Settings},
    error::Error,
    listing, output, parser,
};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input files, each assembled on its own
    #[clap(required = true)]
    input: Vec<String>,

    /// Settings file (YAML)
    #[clap(short, long)]
    config: Option<String>,

    /// Address of the first code word
    #[clap(long, value_parser = parse_addr)]
    origin: Option<u16>,

    /// Warn about source lines longer than this
    #[clap(long)]
    max_line_len: Option<usize>,

    /// Dump the tables after each pass
    #[clap(short, long)]
    list: bool,

    /// Also write a little-endian binary image
    #[clap(short, long)]
    binary: bool,

    /// Also write a YAML symbol map
    #[clap(short, long)]
    map: bool,

    /// Check only, write no files
    #[clap(short, long)]
    no_output: bool,
}

impl Args {
    fn cli_config(&self) -> Config {
        Config {
            origin: self.origin,
            max_line_len: self.max_line_len,
            list: self.list,
            binary: self.binary,
            map: self.map,
            no_output: self.no_output,
        }
    }
}

fn parse_addr(s: &str) -> Result<u16, String> {
    parser::parse_number(s).ok_or_else(|| format!("not a 16-bit address: `{}`", s))
}

fn main() -> ExitCode {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("TAS Assembler by kanade-k-1228");

    let file_config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(err) => {
                report(&err);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    let settings = file_config.merge(args.cli_config());

    let mut failed = 0;
    for path in &args.input {
        if !run(path, &settings) {
            failed += 1;
        }
    }

    if failed > 0 {
        cprintln!(
            "<r,s>{} of {} file(s) failed</>",
            failed,
            args.input.len()
        );
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// One independent assembly run. Returns false on any error.
fn run(path: &str, settings: &Settings) -> bool {
    println!("1. Read File");
    println!("  < {}", path);
    let lines = match read_lines(path) {
        Ok(lines) => lines,
        Err(err) => {
            report(&err);
            return false;
        }
    };

    println!("2. Assemble");
    let result = assemble_with(&lines, &settings.options, |pass, ctx| {
        let name = match pass {
            Pass::First => "pass 1",
            Pass::Second => "pass 2",
        };
        println!(
            "  {}: {} symbols, {} code words, {} data words",
            name,
            ctx.symbols.len(),
            if pass == Pass::First {
                ctx.ic as usize
            } else {
                ctx.code.len()
            },
            ctx.data.len()
        );
        if settings.list {
            listing::print_pass(pass, ctx);
        }
    });

    let obj = match result {
        Ok(obj) => obj,
        Err(failure) => {
            for warn in &failure.warnings {
                warn.print_diag(path, &lines);
            }
            for diag in &failure.diagnostics {
                diag.print_diag(path, &lines);
            }
            cprintln!(
                "<r,s>{}: {} error(s), no output written</>",
                path,
                failure.diagnostics.len()
            );
            return false;
        }
    };
    for warn in &obj.warnings {
        warn.print_diag(path, &lines);
    }
    if settings.list {
        listing::print_object(&obj);
    }

    if settings.no_output {
        return true;
    }
    println!("3. Write Output");
    match output::save(&obj, Path::new(path), settings.outputs) {
        Ok(written) => {
            for file in written {
                println!("  > {}", file.display());
            }
            true
        }
        Err(err) => {
            report(&err);
            false
        }
    }
}

fn read_lines(path: &str) -> Result<Vec<String>, Error> {
    let file = std::fs::File::open(path).map_err(|e| Error::FileOpen(path.to_string(), e))?;
    std::io::BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::FileRead(path.to_string(), e))
}

fn report(err: &Error) {
    match std::error::Error::source(err) {
        Some(source) => cprintln!("<r,s>error[{}]</>: {}: {}", err.kind(), err, source),
        None => cprintln!("<r,s>error[{}]</>: {}", err.kind(), err),
    }
}
