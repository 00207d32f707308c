use std::env;
use std::fs;
use std::io::{self, Read};

use anyhow::Error;
use clap::{App, AppSettings, ArgMatches, ErrorKind};
use env_logger::Builder;
use log::{error, info, LevelFilter};

use rupcheck::{Checker, Verdict};

fn main() {
    let matches = parse_args();

    init_logging();

    let exit_code = match run(&matches) {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn parse_args() -> ArgMatches<'static> {
    let app = App::new("rupcheck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Checks RUP refutation proofs of DIMACS CNF formulas")
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("<CNF> 'The DIMACS CNF input file'")
        .arg_from_usage("[PROOF] 'The RUP proof file (stdin if omitted)'");

    match app.get_matches_safe() {
        Ok(matches) => matches,
        Err(err) => match err.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => err.exit(),
            _ => {
                eprintln!("{}", err.message);
                std::process::exit(2);
            }
        },
    }
}

fn init_logging() {
    let mut builder = Builder::new();
    builder.filter(None, LevelFilter::Warn);

    if let Ok(ref env_var) = env::var("RUPCHECK_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn run(matches: &ArgMatches) -> Result<i32, Error> {
    let cnf_path = matches.value_of("CNF").unwrap();

    let mut checker = Checker::new();

    info!("Reading CNF file '{}'", cnf_path);
    checker.add_dimacs_cnf(fs::File::open(cnf_path)?)?;

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let proof = match matches.value_of("PROOF") {
        Some(path) => {
            info!("Reading proof from file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn Read
        }
        None => {
            info!("Reading proof from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn Read
        }
    };

    match checker.check_proof(proof)? {
        Verdict::Verified => {
            println!("OK");
            Ok(0)
        }
        Verdict::Failed => {
            println!("FAIL");
            Ok(1)
        }
    }
}
