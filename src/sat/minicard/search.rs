use crate::sat;
use crate::sat::formula::{assignment::*, clause::*, LBool, Lit, Var, VarMap};
use self::clause_db::{ClauseDB, ClauseDBSettings};
use self::conflict::{AnalyzeContext, CCMinMode, Conflict};
use self::decision_heuristic::{DecisionHeuristic, DecisionHeuristicSettings};
use self::restart::RestartStrategy;
use self::watches::Watches;
use super::budget::{Budget, SolveHandler};

pub mod clause_db;
pub mod conflict;
pub mod decision_heuristic;
mod random;
pub mod restart;
mod watches;


#[derive(Clone, Copy, Debug)]
pub struct LearningStrategy {
    pub min_learnts_lim: i32, // Minimum number to set the learnts limit to.
    pub size_factor: f64,     // The intitial limit for learnt clauses is a factor of the original clauses.
    pub size_inc: f64,        // The limit for learnt clauses is multiplied with this factor each restart.
    pub size_adjust_start_confl: i32,
    pub size_adjust_inc: f64,
}

impl Default for LearningStrategy {
    fn default() -> Self {
        LearningStrategy {
            min_learnts_lim: 0,
            size_factor: 1.0 / 3.0,
            size_inc: 1.1,
            size_adjust_start_confl: 100,
            size_adjust_inc: 1.5,
        }
    }
}


struct LearningGuard {
    settings: LearningStrategy,
    max_learnts: f64,
    size_adjust_confl: f64,
    size_adjust_cnt: i32,
}

impl LearningGuard {
    pub fn new(settings: LearningStrategy) -> Self {
        LearningGuard {
            settings,
            max_learnts: 0.0,
            size_adjust_confl: 0.0,
            size_adjust_cnt: 0,
        }
    }

    pub fn reset(&mut self, clauses: usize) {
        self.max_learnts = ((clauses as f64) * self.settings.size_factor)
            .max(self.settings.min_learnts_lim as f64);
        self.size_adjust_confl = self.settings.size_adjust_start_confl as f64;
        self.size_adjust_cnt = self.settings.size_adjust_start_confl;
    }

    pub fn bump(&mut self) -> bool {
        self.size_adjust_cnt -= 1;
        if self.size_adjust_cnt == 0 {
            self.size_adjust_confl *= self.settings.size_adjust_inc;
            self.size_adjust_cnt = self.size_adjust_confl as i32;
            self.max_learnts *= self.settings.size_inc;
            true
        } else {
            false
        }
    }

    pub fn border(&self) -> f64 {
        self.max_learnts
    }
}


struct SimplifyGuard {
    simp_db_assigns: Option<usize>, // Number of top-level assignments since last execution of 'simplify()'.
    simp_db_props: u64,
}

impl SimplifyGuard {
    pub fn new() -> Self {
        SimplifyGuard {
            simp_db_assigns: None,
            simp_db_props: 0,
        }
    }

    pub fn skip(&self, assigns: usize, propagations: u64) -> bool {
        Some(assigns) == self.simp_db_assigns || propagations < self.simp_db_props
    }

    pub fn set_next(&mut self, assigns: usize, propagations: u64, prop_limit: u64) {
        self.simp_db_assigns = Some(assigns);
        self.simp_db_props = propagations + prop_limit;
    }
}


#[derive(Default)]
struct Stats {
    solves: u64,
    starts: u64,
    decisions: u64,
    conflicts: u64,
}


#[derive(Clone, Copy, Default, Debug)]
pub struct SearchSettings {
    pub restart: RestartStrategy,
    pub learn: LearningStrategy,
}


#[derive(Clone, Copy, Debug)]
pub struct SearcherSettings {
    pub incremental: bool, // Keeps original clauses intact so that snapshots can be restored.
    pub use_rcheck: bool,  // Check if a clause is already implied. Pretty costly.
}

impl Default for SearcherSettings {
    fn default() -> Self {
        SearcherSettings {
            incremental: true,
            use_rcheck: false,
        }
    }
}


pub enum AddClauseRes {
    UnSAT,
    Consumed,
    Added(ClauseRef),
}


pub enum SearchRes {
    UnSAT(Vec<Lit>),
    SAT(VarMap<bool>),
    Interrupted(f64),
    Canceled,
}


enum LoopRes {
    Restart,
    UnSAT,
    SAT,
    Interrupted(f64),
    Canceled,
    AssumpsConfl(Vec<Lit>),
}


pub struct Searcher {
    settings: SearcherSettings,
    stats: Stats,
    ca: ClauseAllocator,
    db: ClauseDB,
    assigns: Assignment, // The current assignments.
    watches: Watches,    // 'watches[lit]' is a list of constraints watching 'lit'.
    heur: DecisionHeuristic,
    analyze: AnalyzeContext,
    simp: SimplifyGuard,
    learnt: LearningGuard,
}

impl Searcher {
    pub fn new(
        settings: SearcherSettings,
        db_set: ClauseDBSettings,
        heur_set: DecisionHeuristicSettings,
        ccmin_mode: CCMinMode,
        learn: LearningStrategy,
    ) -> Self {
        Searcher {
            settings,
            stats: Stats::default(),
            ca: ClauseAllocator::new_empty(),
            db: ClauseDB::new(db_set),
            assigns: Assignment::new(),
            watches: Watches::new(),
            heur: DecisionHeuristic::new(heur_set),
            analyze: AnalyzeContext::new(ccmin_mode),
            simp: SimplifyGuard::new(),
            learnt: LearningGuard::new(learn),
        }
    }

    #[inline]
    pub fn is_incremental(&self) -> bool {
        self.settings.incremental
    }

    pub fn number_of_vars(&self) -> usize {
        self.assigns.number_of_vars()
    }

    pub fn number_of_clauses(&self) -> usize {
        self.db.stats.num_clauses
    }

    pub fn number_of_learnts(&self) -> usize {
        self.db.stats.num_learnts
    }

    #[inline]
    pub fn assigns(&self) -> &Assignment {
        &self.assigns
    }

    #[inline]
    pub fn activity(&self, v: Var) -> f64 {
        self.heur.activity(v)
    }

    pub fn highest_activity(&self, vars: &[Var]) -> Option<Var> {
        self.heur.highest_activity(vars)
    }

    pub fn set_selection_order(&mut self, order: &[Lit]) {
        self.heur.set_selection_order(order);
    }

    /// Literals of the constraint that forced `v`, or `None` for decisions,
    /// unit facts and unassigned variables.
    pub fn reason_literals(&self, v: Var) -> Option<Vec<Lit>> {
        self.assigns
            .var_data(v)
            .and_then(|vd| vd.reason)
            .map(|cr| self.ca.literals(cr).to_vec())
    }

    pub fn new_var(&mut self, sign: bool, dvar: bool) -> Var {
        let v = self.assigns.new_var();
        self.watches.init_var(v);
        self.heur.init_var(v, sign, dvar);
        self.analyze.init_var(v);
        v
    }

    pub fn add_clause(&mut self, clause: &[Lit]) -> AddClauseRes {
        assert!(self.assigns.is_ground_level());

        if self.settings.use_rcheck && is_implied(self, clause) {
            return AddClauseRes::Consumed;
        }

        let ps = {
            let mut ps = clause.to_vec();

            // Check if clause is satisfied and remove false/duplicate literals:
            ps.sort();
            ps.dedup();
            ps.retain(|&lit| !self.assigns.is_assigned_neg(lit));

            let mut prev = None;
            for &lit in ps.iter() {
                if self.assigns.is_assigned_pos(lit) || prev == Some(!lit) {
                    return AddClauseRes::Consumed;
                }
                prev = Some(lit);
            }

            ps
        };

        match &ps[..] {
            [] => AddClauseRes::UnSAT,

            [unit] => {
                self.db.add_unit(*unit);
                self.assigns.assign_lit(*unit, None);
                match self.propagate() {
                    None => AddClauseRes::Consumed,
                    Some(_) => AddClauseRes::UnSAT,
                }
            }

            lits => {
                let cr = self.db.add_clause(&mut self.ca, lits);
                self.watches.watch_clause(self.ca.view(cr), cr);
                AddClauseRes::Added(cr)
            }
        }
    }

    pub fn add_at_most(&mut self, lits: &[Lit], bound: usize) -> AddClauseRes {
        assert!(self.assigns.is_ground_level());

        let mut ps = lits.to_vec();
        ps.sort();

        // True literals use up the bound, a complementary pair contributes exactly one
        // true literal, false and duplicate literals are dropped:
        let mut k = bound as i64;
        let mut kept: Vec<Lit> = Vec::with_capacity(ps.len());
        let mut prev = None;
        for &lit in ps.iter() {
            if self.assigns.is_assigned_pos(lit) {
                k -= 1;
            } else if prev == Some(!lit) {
                kept.pop();
                k -= 1;
                prev = Some(lit);
            } else if !self.assigns.is_assigned_neg(lit) && prev != Some(lit) {
                prev = Some(lit);
                kept.push(lit);
            }
        }

        if k >= kept.len() as i64 {
            return AddClauseRes::Consumed;
        }
        if k < 0 {
            return AddClauseRes::UnSAT;
        }

        if k == 0 {
            for &lit in kept.iter() {
                self.db.add_unit(!lit);
                self.assigns.assign_lit(!lit, None);
            }
            return match self.propagate() {
                None => AddClauseRes::Consumed,
                Some(_) => AddClauseRes::UnSAT,
            };
        }

        let cr = self.db.add_at_most(&mut self.ca, &kept, k as usize);
        self.watches.watch_clause(self.ca.view(cr), cr);
        AddClauseRes::Added(cr)
    }

    /// Propagates pending ground facts. False means the formula is unsatisfiable.
    pub fn preprocess(&mut self) -> bool {
        assert!(self.assigns.is_ground_level());
        if self.propagate().is_none() {
            self.try_simplify();
            true
        } else {
            false
        }
    }

    pub fn search(
        &mut self,
        ss: &SearchSettings,
        budget: &Budget,
        handler: &mut dyn SolveHandler,
        assumptions: &[Lit],
    ) -> SearchRes {
        info!("============================[ Search Statistics ]==============================");
        info!("| Conflicts |          ORIGINAL         |          LEARNT          | Progress |");
        info!("|           |    Vars  Clauses Literals |    Limit  Clauses Lit/Cl |          |");
        info!("===============================================================================");

        let res = self.search_internal(ss, budget, handler, assumptions);

        info!("===============================================================================");
        res
    }

    fn search_internal(
        &mut self,
        ss: &SearchSettings,
        budget: &Budget,
        handler: &mut dyn SolveHandler,
        assumptions: &[Lit],
    ) -> SearchRes {
        self.stats.solves += 1;
        self.learnt.reset(self.db.stats.num_clauses);
        let base = (self.stats.conflicts, self.watches.propagations);

        let mut curr_restarts = 0;
        loop {
            let conflicts_to_go = ss.restart.conflicts_to_go(curr_restarts);
            let res = self.search_loop(conflicts_to_go, budget, base, handler, assumptions);
            if let LoopRes::Restart = res {
                curr_restarts += 1;
                continue;
            }

            let res = match res {
                LoopRes::SAT => SearchRes::SAT(extract_model(&self.assigns)),
                LoopRes::UnSAT => SearchRes::UnSAT(Vec::new()),
                LoopRes::AssumpsConfl(confl) => SearchRes::UnSAT(confl.iter().map(|&l| !l).collect()),
                LoopRes::Interrupted(c) => SearchRes::Interrupted(c),
                LoopRes::Canceled | LoopRes::Restart => SearchRes::Canceled,
            };
            self.cancel_until(GROUND_LEVEL);
            return res;
        }
    }

    // Description:
    //   Search for a model the specified number of conflicts.
    //
    // Output:
    //   'SAT' if a partial assigment that is consistent with respect to the clauseset is found. If
    //   all variables are decision variables, this means that the clause set is satisfiable. 'UnSAT'
    //   if the clause set is unsatisfiable. 'Restart' if the bound on number of conflicts is reached.
    fn search_loop(
        &mut self,
        nof_conflicts: u64,
        budget: &Budget,
        (base_conflicts, base_propagations): (u64, u64),
        handler: &mut dyn SolveHandler,
        assumptions: &[Lit],
    ) -> LoopRes {
        self.stats.starts += 1;

        let confl_limit = self.stats.conflicts + nof_conflicts;
        loop {
            if let Err(res) = self.propagate_learn_backtrack(handler) {
                return res;
            }

            if !budget.within(
                self.stats.conflicts - base_conflicts,
                self.watches.propagations - base_propagations,
            ) {
                let progress_estimate = progress_estimate(&self.assigns);
                self.cancel_until(GROUND_LEVEL);
                return LoopRes::Interrupted(progress_estimate);
            }

            if self.stats.conflicts >= confl_limit {
                self.cancel_until(GROUND_LEVEL);
                return LoopRes::Restart;
            }

            // Simplify the set of problem clauses:
            self.try_simplify();

            if (self.db.number_of_learnts() as f64)
                >= self.learnt.border() + (self.assigns.number_of_assigns() as f64)
            {
                // Reduce the set of learnt clauses:
                let watches = &mut self.watches;
                self.db.reduce(&mut self.ca, &mut self.assigns, move |c| {
                    watches.unwatch_clause_lazy(c);
                });
            }

            match self.decide(assumptions) {
                Err(confl) => return LoopRes::AssumpsConfl(confl),
                Ok(None) => return LoopRes::SAT, // Model found:
                Ok(Some(next)) => {
                    // Increase decision level and enqueue 'next'
                    self.decide_lit(next);
                }
            }
        }
    }

    fn decide(&mut self, assumptions: &[Lit]) -> Result<Option<Lit>, Vec<Lit>> {
        while self.assigns.decision_level().offset() < assumptions.len() {
            // Perform user provided assumption:
            let p = assumptions[self.assigns.decision_level().offset()];
            match self.assigns.of_lit(p) {
                LBool::True => {
                    // Dummy decision level:
                    self.assigns.new_decision_level();
                }
                LBool::False => {
                    let conflict = self.analyze.analyze_final(&self.ca, &self.assigns, !p);
                    return Err(conflict);
                }
                LBool::Undef => {
                    return Ok(Some(p));
                }
            }
        }

        // New variable decision:
        let next = self.heur.pick_branch_lit(&self.assigns);
        if next.is_some() {
            self.stats.decisions += 1;
        }
        Ok(next)
    }

    fn propagate_learn_backtrack(&mut self, handler: &mut dyn SolveHandler) -> Result<(), LoopRes> {
        while let Some(confl) = self.propagate() {
            self.stats.conflicts += 1;
            if !handler.detected_conflict() {
                return Err(LoopRes::Canceled);
            }

            match self.analyze(confl) {
                Conflict::Ground => {
                    return Err(LoopRes::UnSAT);
                }

                Conflict::Unit(level, unit) => {
                    self.cancel_until(level);
                    self.learn(unit, &[unit]);
                }

                Conflict::Learned(level, lit, clause) => {
                    self.cancel_until(level);
                    self.learn(lit, &clause);
                }
            }

            self.decay_activities();
            self.bump_learnt_limit();
        }

        Ok(())
    }

    #[inline]
    pub fn propagate(&mut self) -> Option<ClauseRef> {
        self.watches.propagate(&mut self.ca, &mut self.assigns)
    }

    /// Opens a new decision level and assigns `lit` on it.
    pub fn decide_lit(&mut self, lit: Lit) {
        self.assigns.new_decision_level();
        self.assigns.assign_lit(lit, None);
    }

    pub fn analyze(&mut self, confl: ClauseRef) -> Conflict {
        let heur = &mut self.heur;
        let db = &mut self.db;
        self.analyze.analyze(
            &self.assigns,
            &mut self.ca,
            confl,
            move |v| heur.bump_activity(&v),
            move |ca, c| db.bump_activity(ca, c),
        )
    }

    /// Stores a learnt clause with its asserting literal `lit` first and enqueues `lit`.
    /// A unit is kept as a replayable fact instead.
    pub fn learn(&mut self, lit: Lit, clause: &[Lit]) {
        if clause.len() == 1 {
            self.db.add_unit(lit);
            self.assigns.assign_lit(lit, None);
        } else {
            let cr = self.db.learn_clause(&mut self.ca, clause);
            self.watches.watch_clause(self.ca.view(cr), cr);
            self.assigns.assign_lit(lit, Some(cr));
        }
    }

    pub fn decay_activities(&mut self) {
        self.heur.decay_activity();
        self.db.decay_activity();
    }

    pub fn bump_learnt_limit(&mut self) {
        if self.learnt.bump() {
            info!(
                "| {:9} | {:7} {:8} {:8} | {:8} {:8} {:6.0} | {:6.3} % |",
                self.stats.conflicts,
                self.heur.dec_vars.saturating_sub(self.assigns.number_of_ground_assigns()),
                self.db.stats.num_clauses,
                self.db.stats.clauses_literals,
                self.learnt.border() as u64,
                self.db.stats.num_learnts,
                (self.db.stats.learnts_literals as f64) / (self.db.stats.num_learnts as f64),
                progress_estimate(&self.assigns) * 100.0
            );
        }
    }

    // Description:
    //   Simplify the clause database according to the current top-level assigment. Satisfied learnt
    //   clauses always go. Original constraints are only touched outside incremental mode.
    fn try_simplify(&mut self) {
        if !self.assigns.is_ground_level()
            || self.simp.skip(self.assigns.number_of_assigns(), self.watches.propagations)
        {
            return;
        }

        let (before_clauses, before_learnts) = (self.db.stats.num_clauses, self.db.stats.num_learnts);
        {
            let originals = !self.settings.incremental;
            let watches = &mut self.watches;
            self.db.remove_satisfied(
                &mut self.ca,
                &mut self.assigns,
                originals,
                originals,
                move |c| {
                    watches.unwatch_clause_lazy(c);
                },
            );
        }
        trace!(
            "Simplified: clauses {} => {}, learnts {} => {}",
            before_clauses,
            self.db.stats.num_clauses,
            before_learnts,
            self.db.stats.num_learnts
        );

        self.heur.rebuild_order_heap(&self.assigns);
        self.simp.set_next(
            self.assigns.number_of_assigns(),
            self.watches.propagations,
            self.db.stats.clauses_literals + self.db.stats.learnts_literals,
        ); // (shouldn't depend on stats really, but it will do for now)
    }

    // Revert to the state at given level (keeping all assignment at 'level' but not beyond).
    pub fn cancel_until(&mut self, target_level: DecisionLevel) {
        let heur = &mut self.heur;
        let top_level = self.assigns.decision_level();
        self.assigns.rewind_until_level(target_level, |level, lit| {
            heur.cancel(lit, level == top_level);
        });
    }

    /// Sizes to hand to `rollback` later: variables, original constraints,
    /// learnt serial and unit facts.
    pub fn snapshot(&self) -> (usize, usize, usize, usize) {
        assert!(self.assigns.is_ground_level());
        (
            self.assigns.number_of_vars(),
            self.db.number_of_clauses(),
            self.db.learnt_serial(),
            self.db.units().len(),
        )
    }

    /// Restores the sizes taken by `snapshot`. With `replay` the surviving unit facts are
    /// propagated again; the result tells whether that stayed conflict free.
    pub fn rollback(&mut self, (vars, clauses, serial, units): (usize, usize, usize, usize), replay: bool) -> bool {
        {
            let heur = &mut self.heur;
            self.assigns.rewind_all(|lit| heur.cancel(lit, true));
        }

        {
            let watches = &mut self.watches;
            self.db.truncate(
                &mut self.ca,
                &mut self.assigns,
                clauses,
                serial,
                units,
                |c, cr| watches.unwatch_clause_strict(c, cr),
            );
        }

        let vars = vars.min(self.assigns.number_of_vars());
        self.assigns.truncate_vars(vars);
        self.watches.truncate_vars(vars);
        self.analyze.truncate_vars(vars);
        self.heur.truncate_vars(vars, &self.assigns);
        self.simp = SimplifyGuard::new();

        debug!(
            "Rolled back to {} vars, {} clauses, {} learnts, {} units",
            vars,
            self.db.number_of_clauses(),
            self.db.number_of_learnts(),
            self.db.units().len()
        );

        if !replay {
            return false;
        }

        for i in 0..self.db.units().len() {
            let lit = self.db.units()[i];
            if !try_assign_lit(&mut self.assigns, lit, None) || self.propagate().is_some() {
                return false;
            }
        }
        true
    }

    pub fn stats(&self) -> sat::Stats {
        sat::Stats {
            solves: self.stats.solves,
            restarts: self.stats.starts,
            decisions: self.stats.decisions,
            rnd_decisions: self.heur.rnd_decisions,
            conflicts: self.stats.conflicts,
            propagations: self.watches.propagations,
            tot_literals: self.analyze.tot_literals,
            del_literals: self.analyze.max_literals - self.analyze.tot_literals,
        }
    }
}


fn is_implied(search: &mut Searcher, c: &[Lit]) -> bool {
    assert!(search.assigns.is_ground_level());

    search.assigns.new_decision_level();
    for &lit in c.iter() {
        match search.assigns.of_lit(lit) {
            LBool::True => {
                search.cancel_until(GROUND_LEVEL);
                return true;
            }
            LBool::Undef => {
                search.assigns.assign_lit(!lit, None);
            }
            LBool::False => {}
        }
    }

    let result = search.propagate().is_some();
    search.cancel_until(GROUND_LEVEL);
    result
}
