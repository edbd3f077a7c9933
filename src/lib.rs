extern crate flate2;
#[macro_use]
extern crate log;
extern crate slotmap;
extern crate time;
extern crate vec_map;

use std::{fs, path};
use std::io::{self, Write};
use crate::sat::{dimacs, minicard, SolveRes, Solver, Stats};
use crate::sat::minicard::budget::{Budget, NoHandler, SolveHandler, TimeoutHandler};

pub mod sat;


pub struct MainOptions {
    pub strict: bool,
    pub pre: bool,
    pub solve: bool,
    pub in_path: path::PathBuf,
    pub out_path: Option<path::PathBuf>,
    pub conflict_budget: Option<u64>,
    pub propagation_budget: Option<u64>,
    pub timeout: Option<f64>,
}


pub fn solve(main_opts: MainOptions, solver_opts: minicard::Settings) -> io::Result<()> {
    let solver = minicard::CoreSolver::new(solver_opts);
    solve_with(solver, main_opts)
}


pub fn solve_with<S: Solver>(mut solver: S, options: MainOptions) -> io::Result<()> {
    let initial_time = time::precise_time_s();

    info!("============================[ Problem Statistics ]=============================");
    info!("|                                                                             |");

    let backward_subst = dimacs::parse_file(&options.in_path, &mut solver, options.strict)?;

    info!("|  Number of variables:  {:12}                                         |", solver.n_vars());
    info!("|  Number of clauses:    {:12}                                         |", solver.n_clauses());

    let parsed_time = time::precise_time_s();
    info!("|  Parse time:           {:12.2} s                                       |", parsed_time - initial_time);

    let pre_ok = !options.pre || solver.preprocess();
    {
        let simplified_time = time::precise_time_s();
        info!("|  Simplification time:  {:12.2} s                                       |", simplified_time - parsed_time);
    }

    info!("|                                                                             |");

    let result = if !pre_ok {
        info!("===============================================================================");
        info!("Solved by simplification");
        SolveRes::UnSAT(Vec::new())
    } else if options.solve {
        let mut budget = Budget::new();
        if let Some(conflicts) = options.conflict_budget {
            budget.set_conflict_budget(conflicts);
        }
        if let Some(propagations) = options.propagation_budget {
            budget.set_propagation_budget(propagations);
        }

        let mut handler: Box<dyn SolveHandler> = match options.timeout {
            Some(secs) => Box::new(TimeoutHandler::new(secs)),
            None => Box::new(NoHandler),
        };
        solver.solve_limited(&budget, &[], handler.as_mut())
    } else {
        info!("===============================================================================");
        SolveRes::Interrupted(0.0)
    };

    print_stats(&solver.stats(), time::precise_time_s() - initial_time);

    println!(
        "{}",
        match result {
            SolveRes::SAT(_) => "SATISFIABLE",
            SolveRes::UnSAT(_) => "UNSATISFIABLE",
            SolveRes::Interrupted(_) | SolveRes::Canceled => "INDETERMINATE",
        }
    );

    if let Some(path) = options.out_path {
        let mut file = fs::File::create(path)?;
        match result {
            SolveRes::UnSAT(_) => writeln!(file, "UNSAT")?,
            SolveRes::Interrupted(_) | SolveRes::Canceled => writeln!(file, "INDET")?,
            SolveRes::SAT(ref model) => {
                writeln!(file, "SAT")?;
                dimacs::write_model(&mut file, &backward_subst, model)?;
            }
        }
    }

    if let SolveRes::SAT(ref model) = result {
        if !dimacs::validate_model_file(&options.in_path, &backward_subst, model)? {
            return Err(io::Error::new(io::ErrorKind::Other, "SELF-CHECK FAILED!"));
        }
    }

    Ok(())
}


pub fn print_stats(stats: &Stats, cpu_time: f64) {
    info!("restarts              : {:12}", stats.restarts);
    info!(
        "conflicts             : {:12}   ({:.0} / sec)",
        stats.conflicts,
        (stats.conflicts as f64) / cpu_time
    );

    info!(
        "decisions             : {:12}   ({:4.2} % random) ({:.0} / sec)",
        stats.decisions,
        (stats.rnd_decisions as f64) * 100.0 / (stats.decisions as f64),
        (stats.decisions as f64) / cpu_time
    );

    info!(
        "propagations          : {:12}   ({:.0} / sec)",
        stats.propagations,
        (stats.propagations as f64) / cpu_time
    );

    info!(
        "conflict literals     : {:12}   ({:4.2} % deleted)",
        stats.tot_literals,
        (stats.del_literals as f64) * 100.0 / ((stats.del_literals + stats.tot_literals) as f64)
    );

    info!("CPU time              : {} s", cpu_time);
    info!("");
}
