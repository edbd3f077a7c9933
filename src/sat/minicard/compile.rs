//! Step-wise control over the search for callers that build their own
//! search tree on top of the engine, such as knowledge compilers.
//!
//! The caller opens decision levels one by one with `decide`, reads the
//! consequences with `newly_implied` and walks back with `undo_decide`. A
//! conflicting decision leaves a learnt clause behind; once the caller has
//! backtracked to its assertion level, `assert_learned_clause` adds it.

use crate::sat::formula::{LBool, Lit, Var};
use crate::sat::formula::assignment::{DecisionLevel, GROUND_LEVEL};
use crate::sat::formula::clause::ClauseRef;
use super::CoreSolver;
use super::search::conflict::Conflict;


pub trait DecisionControl {
    /// Propagates the ground facts. False means the constraints are unsatisfiable.
    fn start(&mut self) -> bool;

    fn value_of(&self, lit: Lit) -> LBool;

    /// Opens a new decision level assigning `var` to `phase` and propagates.
    /// False means a conflict; its learnt clause is kept for `assert_learned_clause`.
    fn decide(&mut self, var: Var, phase: bool) -> bool;

    /// Removes the decision level of `var` together with everything above it.
    fn undo_decide(&mut self, var: Var);

    fn at_assertion_level(&self) -> bool;

    /// Adds the clause learnt from the last conflict and propagates its
    /// asserting literal. Panics unless called at the assertion level.
    fn assert_learned_clause(&mut self) -> bool;

    /// Literals implied on the current level (without its decision) whose
    /// variables pass `known`. Only the first call after a change reports them.
    fn newly_implied(&mut self, known: &dyn Fn(Var) -> bool) -> Vec<Lit>;

    fn highest_var_activity(&self, vars: &[Var]) -> Option<Var>;
}


#[derive(Default)]
pub struct PendingLearnt {
    learnt: Option<(Lit, Box<[Lit]>)>,
    assertion_level: Option<DecisionLevel>,
    dirty: bool,
}


impl CoreSolver {
    fn propagate_after_decide(&mut self) -> bool {
        match self.search.propagate() {
            None => true,
            Some(confl) => {
                self.handle_conflict(confl);
                false
            }
        }
    }

    fn handle_conflict(&mut self, confl: ClauseRef) {
        match self.search.analyze(confl) {
            Conflict::Ground => {
                self.ok = false;
                self.search.cancel_until(GROUND_LEVEL);
                self.pending.learnt = None;
                self.pending.assertion_level = None;
            }

            Conflict::Unit(level, lit) => {
                self.pending.learnt = Some((lit, vec![lit].into_boxed_slice()));
                self.pending.assertion_level = Some(level);
            }

            Conflict::Learned(level, lit, clause) => {
                self.pending.learnt = Some((lit, clause));
                self.pending.assertion_level = Some(level);
            }
        }
    }
}


impl DecisionControl for CoreSolver {
    fn start(&mut self) -> bool {
        self.pending.dirty = true;
        self.search.propagate().is_none()
    }

    fn value_of(&self, lit: Lit) -> LBool {
        self.search.assigns().of_lit(lit)
    }

    fn decide(&mut self, var: Var, phase: bool) -> bool {
        self.pending.dirty = true;
        self.search.decide_lit(var.sign_lit(!phase));
        self.propagate_after_decide()
    }

    fn undo_decide(&mut self, var: Var) {
        self.pending.dirty = false;
        let level = match self.search.assigns().var_data(var) {
            Some(vd) => vd.level,
            None => panic!("undo_decide on unassigned variable {:?}", var),
        };
        match level.previous() {
            Some(target) => self.search.cancel_until(target),
            None => panic!("undo_decide on ground-level variable {:?}", var),
        }
    }

    fn at_assertion_level(&self) -> bool {
        Some(self.search.assigns().decision_level()) == self.pending.assertion_level
    }

    fn assert_learned_clause(&mut self) -> bool {
        self.pending.dirty = true;
        assert!(
            self.at_assertion_level(),
            "assert_learned_clause called although not at assertion level"
        );

        match self.pending.learnt.take() {
            Some((lit, clause)) => {
                self.search.learn(lit, &clause);
            }
            None => panic!("assert_learned_clause called without a learnt clause"),
        }

        self.search.decay_activities();
        self.search.bump_learnt_limit();
        self.propagate_after_decide()
    }

    fn newly_implied(&mut self, known: &dyn Fn(Var) -> bool) -> Vec<Lit> {
        let mut implied = Vec::new();
        if self.pending.dirty {
            let assigns = self.search.assigns();
            let trail = assigns.current_level_trail();
            let skip = if assigns.is_ground_level() { 0 } else { 1 };
            for &lit in trail.iter().skip(skip).rev() {
                if known(lit.var()) {
                    implied.push(lit);
                }
            }
        }
        self.pending.dirty = false;
        implied
    }

    fn highest_var_activity(&self, vars: &[Var]) -> Option<Var> {
        self.search.highest_activity(vars)
    }
}
