#[macro_use]
extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate minicard_rust;

use std::io::Write;
use std::{path, process};
use minicard_rust::sat::minicard::{self, CCMinMode, PhaseSaving};


fn main() {
    let ls012 = ["0", "1", "2"];
    let matches = clap::App::new("minicard-rust")
        .version(&crate_version!()[..])
        .about("CDCL SAT solver with native cardinality constraints")

        .arg(clap::Arg::with_name("verb").long("verb").takes_value(true).possible_values(&ls012).help("Verbosity level (0=silent, 1=some, 2=more)"))
        .arg(clap::Arg::with_name("strict").long("strict").help("Validate DIMACS header during parsing"))
        .arg(clap::Arg::with_name("no-pre").long("no-pre").help("Skip the initial ground-level simplification"))
        .arg(clap::Arg::with_name("no-solve").long("no-solve").help("Stop after parsing and simplification"))
        .arg(clap::Arg::with_name("input").required(true))
        .arg(clap::Arg::with_name("output").required(false))

        .arg(clap::Arg::with_name("var-decay").long("var-decay").takes_value(true).help("The variable activity decay factor"))
        .arg(clap::Arg::with_name("cla-decay").long("cla-decay").takes_value(true).help("The clause activity decay factor"))
        .arg(clap::Arg::with_name("rnd-freq").long("rnd-freq").takes_value(true).help("The frequency with which the decision heuristic tries to choose a random variable"))
        .arg(clap::Arg::with_name("rnd-seed").long("rnd-seed").takes_value(true).help("Used by the random variable selection"))
        .arg(clap::Arg::with_name("ccmin-mode").long("ccmin-mode").takes_value(true).possible_values(&ls012).help("Controls conflict clause minimization (0=none, 1=basic, 2=deep)"))
        .arg(clap::Arg::with_name("phase-saving").long("phase-saving").takes_value(true).possible_values(&ls012).help("Controls the level of phase saving (0=none, 1=limited, 2=full)"))
        .arg(clap::Arg::with_name("rnd-init").long("rnd-init").help("Randomize the initial activity"))
        .arg(clap::Arg::with_name("no-rnd-init").long("no-rnd-init").conflicts_with("rnd-init"))
        .arg(clap::Arg::with_name("luby").long("luby").help("Use the Luby restart sequence"))
        .arg(clap::Arg::with_name("no-luby").long("no-luby").conflicts_with("luby"))
        .arg(clap::Arg::with_name("rfirst").long("rfirst").takes_value(true).help("The base restart interval"))
        .arg(clap::Arg::with_name("rinc").long("rinc").takes_value(true).help("Restart interval increase factor"))
        .arg(clap::Arg::with_name("min-learnts").long("min-learnts").takes_value(true).help("Minimum learnt clause limit"))
        .arg(clap::Arg::with_name("rcheck").long("rcheck").help("Check if a clause is already implied. (costly)"))
        .arg(clap::Arg::with_name("no-rcheck").long("no-rcheck").conflicts_with("rcheck"))
        .arg(clap::Arg::with_name("no-incremental").long("no-incremental").help("Allow simplification to rewrite original constraints"))

        .arg(clap::Arg::with_name("conf-budget").long("conf-budget").takes_value(true).help("Give up after this many conflicts"))
        .arg(clap::Arg::with_name("prop-budget").long("prop-budget").takes_value(true).help("Give up after this many propagations"))
        .arg(clap::Arg::with_name("timeout").long("timeout").takes_value(true).help("Give up after this many seconds"))

        .get_matches();

    {
        let level = matches
            .value_of("verb")
            .map(|v| match v {
                "1" => log::LevelFilter::Info,
                "2" => log::LevelFilter::Trace,
                _ => log::LevelFilter::Off,
            })
            .unwrap_or(log::LevelFilter::Info);

        env_logger::Builder::new()
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .filter(None, level)
            .init();
    }

    let input = match matches.value_of("input") {
        Some(input) => path::PathBuf::from(input),
        None => {
            error!("No input file given");
            process::exit(1);
        }
    };

    let main = minicard_rust::MainOptions {
        strict: matches.is_present("strict"),
        pre: !matches.is_present("no-pre"),
        solve: !matches.is_present("no-solve"),
        in_path: input,
        out_path: matches.value_of("output").map(path::PathBuf::from),
        conflict_budget: matches.value_of("conf-budget").and_then(|s| s.parse().ok()),
        propagation_budget: matches.value_of("prop-budget").and_then(|s| s.parse().ok()),
        timeout: matches
            .value_of("timeout")
            .and_then(|s| s.parse().ok())
            .filter(|&t: &f64| t > 0.0),
    };

    let solver_options = {
        let mut s = minicard::Settings::default();

        for &x in matches
            .value_of("var-decay")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 0.0 < x && x < 1.0 {
                s.heur.var_decay = x;
            }
        }

        for &x in matches
            .value_of("cla-decay")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 0.0 < x && x < 1.0 {
                s.db.clause_decay = x;
            }
        }

        for &x in matches
            .value_of("rnd-freq")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 0.0 <= x && x <= 1.0 {
                s.heur.random_var_freq = x;
            }
        }

        for &x in matches
            .value_of("rnd-seed")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 0.0 < x {
                s.heur.random_seed = x;
            }
        }

        for &x in matches.value_of("ccmin-mode").iter() {
            match x {
                "0" => s.ccmin_mode = CCMinMode::None,
                "1" => s.ccmin_mode = CCMinMode::Basic,
                "2" => s.ccmin_mode = CCMinMode::Deep,
                _ => {}
            }
        }

        for &x in matches.value_of("phase-saving").iter() {
            match x {
                "0" => s.heur.phase_saving = PhaseSaving::None,
                "1" => s.heur.phase_saving = PhaseSaving::Limited,
                "2" => s.heur.phase_saving = PhaseSaving::Full,
                _ => {}
            }
        }

        if matches.is_present("rnd-init") {
            s.heur.rnd_init_act = true;
        }
        if matches.is_present("no-rnd-init") {
            s.heur.rnd_init_act = false;
        }

        if matches.is_present("luby") {
            s.search.restart.luby_restart = true;
        }
        if matches.is_present("no-luby") {
            s.search.restart.luby_restart = false;
        }

        for &x in matches
            .value_of("rfirst")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 0.0 < x {
                s.search.restart.restart_first = x;
            }
        }

        for &x in matches.value_of("rinc").and_then(|s| s.parse().ok()).iter() {
            if 1.0 < x {
                s.search.restart.restart_inc = x;
            }
        }

        for &x in matches
            .value_of("min-learnts")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 0 <= x {
                s.search.learn.min_learnts_lim = x;
            }
        }

        if matches.is_present("rcheck") {
            s.core.use_rcheck = true;
        }
        if matches.is_present("no-rcheck") {
            s.core.use_rcheck = false;
        }

        if matches.is_present("no-incremental") {
            s.core.incremental = false;
        }

        s
    };

    if let Err(e) = minicard_rust::solve(main, solver_options) {
        error!("{}", e);
        process::exit(1);
    }
}
