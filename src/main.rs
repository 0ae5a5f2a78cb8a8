use clap::{App, Arg, ArgMatches, ErrorKind};
use mojilang::ast::AstPrinter;
use mojilang::{scanner, Error};
use std::fs;
use std::path::Path;
use std::process;
use tracing::debug;

const EX_USAGE: i32 = 64;
const EX_DATAERR: i32 = 65;
const EX_SOFTWARE: i32 = 70;
const EX_IOERR: i32 = 74;

fn main() {
    init_tracing();
    let matches = match cli().get_matches_safe() {
        Ok(matches) => matches,
        Err(e) => match e.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => e.exit(),
            _ => {
                eprintln!("{}", e.message);
                process::exit(EX_USAGE);
            }
        },
    };
    if let Err(code) = run_file(&matches) {
        process::exit(code);
    }
}

fn cli() -> App<'static, 'static> {
    App::new("mojilang")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Interpreter for emoji scripts")
        .arg(
            Arg::with_name("SCRIPT")
                .help("Script to run; must have the .moji extension")
                .required(true)
                .validator(moji_extension),
        )
        .arg(
            Arg::with_name("ast")
                .long("ast")
                .help("Print the parsed tree instead of running the script"),
        )
        .arg(
            Arg::with_name("tokens")
                .long("tokens")
                .help("Print the scanned tokens instead of running the script"),
        )
}

fn moji_extension(path: String) -> Result<(), String> {
    match Path::new(&path).extension().and_then(|ext| ext.to_str()) {
        Some("moji") => Ok(()),
        _ => Err(format!("'{}' is not a .moji file", path)),
    }
}

fn run_file(matches: &ArgMatches) -> Result<(), i32> {
    let path = matches.value_of("SCRIPT").unwrap_or_default();
    let source = fs::read_to_string(path).map_err(|e| {
        eprintln!("Could not read {}: {}", path, e);
        EX_IOERR
    })?;
    debug!(path, bytes = source.len(), "loaded script");

    let result = if matches.is_present("tokens") {
        print_tokens(&source)
    } else if matches.is_present("ast") {
        mojilang::parse_source(&source).map(|root| println!("{}", AstPrinter {}.print(&root)))
    } else {
        mojilang::run(&source)
    };
    result.map_err(|e| {
        eprintln!("{}", e);
        exit_code(&e)
    })
}

fn print_tokens(source: &str) -> Result<(), Error> {
    let (tokens, errors) = scanner::scan_tokens(source);
    for token in &tokens {
        println!("{:>4} {}", token.line, token);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Scan(errors))
    }
}

fn exit_code(error: &Error) -> i32 {
    match error {
        Error::Scan(_) | Error::Syntax(_) => EX_DATAERR,
        Error::Runtime(_) => EX_SOFTWARE,
        Error::Io(_) => EX_IOERR,
    }
}

/// Installs a `tracing` subscriber when `RUST_LOG` is set, e.g.
/// `RUST_LOG=mojilang=trace` to follow frames being entered and left.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

#[cfg(test)]
mod cli_tests {
    use super::{cli, moji_extension};

    #[test]
    fn requires_moji_extension() {
        assert!(moji_extension("countdown.moji".to_string()).is_ok());
        assert!(moji_extension("dir/nested.moji".to_string()).is_ok());
        assert!(moji_extension("countdown.txt".to_string()).is_err());
        assert!(moji_extension("moji".to_string()).is_err());
    }

    #[test]
    fn parses_flags() {
        let matches = cli()
            .get_matches_from_safe(vec!["mojilang", "--ast", "prog.moji"])
            .expect("valid arguments");
        assert!(matches.is_present("ast"));
        assert!(!matches.is_present("tokens"));
        assert_eq!(matches.value_of("SCRIPT"), Some("prog.moji"));
    }

    #[test]
    fn rejects_missing_script() {
        assert!(cli().get_matches_from_safe(vec!["mojilang"]).is_err());
    }
}
