use crate::sat::formula::{Lit, Var, VarMap};
use crate::sat::minicard::budget::{Budget, NoHandler, SolveHandler};

pub mod dimacs;
pub mod formula;
pub mod minicard;


#[derive(Clone, Copy, Default, Debug)]
pub struct Stats {
    pub solves: u64,
    pub restarts: u64,
    pub decisions: u64,
    pub rnd_decisions: u64,
    pub conflicts: u64,
    pub propagations: u64,
    pub tot_literals: u64,
    pub del_literals: u64,
}


pub enum SolveRes {
    UnSAT(Vec<Lit>),   // Failed assumptions; empty if the constraints alone are unsatisfiable.
    SAT(VarMap<bool>), // Values of all assigned variables.
    Interrupted(f64),  // Budget ran out; carries the progress estimate.
    Canceled,          // The handler asked to stop.
}


pub trait Solver {
    fn n_vars(&self) -> usize;
    fn n_clauses(&self) -> usize;
    fn new_var(&mut self, sign: bool, dvar: bool) -> Var;
    fn add_clause(&mut self, clause: &[Lit]) -> bool;
    fn add_at_most(&mut self, lits: &[Lit], bound: usize) -> bool;
    fn preprocess(&mut self) -> bool;
    fn solve_limited(&mut self, budget: &Budget, assumptions: &[Lit], handler: &mut dyn SolveHandler) -> SolveRes;
    fn stats(&self) -> Stats;

    // At least 'bound' of 'lits' hold: at most 'len - bound' of their negations do.
    fn add_at_least(&mut self, lits: &[Lit], bound: usize) -> bool {
        // Repeated literals count once, as they do for at-most:
        let mut ps = lits.to_vec();
        ps.sort();
        ps.dedup();

        if bound > ps.len() {
            return self.add_clause(&[]);
        }
        let negated: Vec<Lit> = ps.iter().map(|&l| !l).collect();
        self.add_at_most(&negated, ps.len() - bound)
    }

    fn add_exactly(&mut self, lits: &[Lit], bound: usize) -> bool {
        self.add_at_most(lits, bound) && self.add_at_least(lits, bound)
    }

    fn solve(&mut self, assumptions: &[Lit]) -> SolveRes {
        self.solve_limited(&Budget::new(), assumptions, &mut NoHandler)
    }
}
