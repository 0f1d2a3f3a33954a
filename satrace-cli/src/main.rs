use std::env;
use std::fs;
use std::io::{self, Write};

use anyhow::Error;
use clap::{App, AppSettings};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use satrace::{SolveResult, Solver};
use satrace_dimacs::write_dimacs;
use satrace_formula::CnfFormula;

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            println!("s UNKNOWN");
            0
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("SATRACE_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is satrace {}", env!("SATRACE_VERSION"));
    info!(
        "  {} build - {}",
        env!("SATRACE_PROFILE"),
        env!("SATRACE_RUSTC_VERSION")
    );
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("satrace")
        .version(env!("SATRACE_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
        .arg_from_usage(
            "[core-file] --core=[FILE] 'Write the unsat core as DIMACS CNF to the specified file'",
        )
        .get_matches();

    init_logging();
    banner();

    let mut solver = Solver::new();

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn io::Read
        }
        None => {
            info!("Reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn io::Read
        }
    };

    solver.add_dimacs_cnf(file)?;

    match solver.solve() {
        SolveResult::Sat(model) => {
            println!("s SATISFIABLE");
            print!("v");
            for lit in model.lits() {
                print!(" {}", lit);
            }
            println!(" 0");
            Ok(10)
        }
        SolveResult::Unsat(core) => {
            println!("s UNSATISFIABLE");
            info!("Unsat core of {} original clauses", core.len());

            if let Some(path) = matches.value_of("core-file") {
                info!("Writing unsat core to file '{}'", path);
                let formula =
                    CnfFormula::from(core.iter().map(|clause| clause.lits().to_vec()));
                write_dimacs(&mut fs::File::create(path)?, &formula)?;
            }

            Ok(20)
        }
    }
}
