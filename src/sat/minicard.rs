use crate::sat::{SolveRes, Solver, Stats};
use crate::sat::formula::{LBool, Lit, Var};
use crate::sat::formula::assignment::DecisionLevel;
use self::budget::{Budget, SolveHandler};
use self::compile::PendingLearnt;
use self::search::clause_db::ClauseDBSettings;
pub use self::search::conflict::CCMinMode;
use self::search::decision_heuristic::DecisionHeuristicSettings;
pub use self::search::decision_heuristic::PhaseSaving;
use self::search::*;

pub mod budget;
pub mod compile;
mod search;

pub use self::search::clause_db;
pub use self::search::decision_heuristic;
pub use self::search::restart;
pub use self::search::{LearningStrategy, SearchSettings, SearcherSettings};


#[derive(Clone, Copy, Default, Debug)]
pub struct Settings {
    pub heur: DecisionHeuristicSettings,
    pub db: ClauseDBSettings,
    pub ccmin_mode: CCMinMode,
    pub search: SearchSettings,
    pub core: SearcherSettings,
}


/// Sizes of the solver structures at the moment `save_state` was called.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SolverState {
    pub ok: bool,
    pub vars: usize,
    pub clauses: usize,
    pub learnts: usize, // Serial of the next learnt clause.
    pub units: usize,
}


pub struct CoreSolver {
    ok: bool, // If FALSE, the constraints are already unsatisfiable. No part of the solver state may be used!
    settings: Settings,
    search: Searcher,
    pending: PendingLearnt,
}

impl Solver for CoreSolver {
    fn n_vars(&self) -> usize {
        self.search.number_of_vars()
    }

    fn n_clauses(&self) -> usize {
        self.search.number_of_clauses()
    }

    fn new_var(&mut self, sign: bool, dvar: bool) -> Var {
        self.search.new_var(sign, dvar)
    }

    fn add_clause(&mut self, clause: &[Lit]) -> bool {
        if self.ok {
            if let AddClauseRes::UnSAT = self.search.add_clause(clause) {
                self.ok = false;
            }
        }
        self.ok
    }

    fn add_at_most(&mut self, lits: &[Lit], bound: usize) -> bool {
        if self.ok {
            if let AddClauseRes::UnSAT = self.search.add_at_most(lits, bound) {
                self.ok = false;
            }
        }
        self.ok
    }

    fn preprocess(&mut self) -> bool {
        if self.ok {
            self.ok = self.search.preprocess();
        }
        self.ok
    }

    fn solve_limited(&mut self, budget: &Budget, assumptions: &[Lit], handler: &mut dyn SolveHandler) -> SolveRes {
        handler.started();
        let res = if self.ok {
            match self.search.search(&self.settings.search, budget, handler, assumptions) {
                SearchRes::UnSAT(core) => {
                    if core.is_empty() {
                        self.ok = false;
                    }
                    SolveRes::UnSAT(core)
                }
                SearchRes::SAT(model) => SolveRes::SAT(model),
                SearchRes::Interrupted(progress) => SolveRes::Interrupted(progress),
                SearchRes::Canceled => SolveRes::Canceled,
            }
        } else {
            SolveRes::UnSAT(Vec::new())
        };
        handler.finished();
        res
    }

    fn stats(&self) -> Stats {
        self.search.stats()
    }
}

impl CoreSolver {
    pub fn new(settings: Settings) -> Self {
        CoreSolver {
            ok: true,
            settings,
            search: Searcher::new(
                settings.core,
                settings.db,
                settings.heur,
                settings.ccmin_mode,
                settings.search.learn,
            ),
            pending: PendingLearnt::default(),
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn n_learnts(&self) -> usize {
        self.search.number_of_learnts()
    }

    pub fn save_state(&self) -> SolverState {
        assert!(self.search.is_incremental(), "Cannot save a state when the incremental mode is deactivated");
        let (vars, clauses, learnts, units) = self.search.snapshot();
        let state = SolverState {
            ok: self.ok,
            vars,
            clauses,
            learnts,
            units,
        };
        debug!("Saved state {:?}", state);
        state
    }

    pub fn load_state(&mut self, state: &SolverState) {
        assert!(self.search.is_incremental(), "Cannot load a state when the incremental mode is deactivated");
        let replayed = self.search.rollback(
            (state.vars, state.clauses, state.learnts, state.units),
            state.ok,
        );
        self.ok = state.ok && replayed;
        self.pending = PendingLearnt::default();
        debug!("Loaded state {:?}, ok = {}", state, self.ok);
    }

    /// Drops every variable and constraint, keeping the settings.
    pub fn reset(&mut self) {
        *self = CoreSolver::new(self.settings);
    }

    pub fn set_selection_order(&mut self, order: &[Lit]) {
        self.search.set_selection_order(order);
    }

    pub fn value_of(&self, lit: Lit) -> LBool {
        self.search.assigns().of_lit(lit)
    }

    pub fn level_of(&self, var: Var) -> Option<DecisionLevel> {
        self.search.assigns().var_data(var).map(|vd| vd.level)
    }

    // Holds regardless of any decision.
    pub fn is_forced(&self, lit: Lit) -> bool {
        self.value_of(lit) == LBool::True && self.level_of(lit.var()).map_or(false, |l| l.is_ground())
    }

    pub fn reason_of(&self, var: Var) -> Option<Vec<Lit>> {
        self.search.reason_literals(var)
    }

    pub fn activity(&self, var: Var) -> f64 {
        self.search.activity(var)
    }
}
