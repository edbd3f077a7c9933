use crate::sat::formula::{Lit, Var, VarHeap, VarMap};
use crate::sat::formula::assignment::Assignment;
use super::random::Random;


#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum PhaseSaving {
    None,
    Limited,
    Full,
}


#[derive(Clone, Copy, Debug)]
pub struct DecisionHeuristicSettings {
    pub var_decay: f64,
    pub random_seed: f64,
    pub random_var_freq: f64,
    pub phase_saving: PhaseSaving, // Controls the level of phase saving
    pub rnd_pol: bool,             // Use random polarities for branching heuristics.
    pub rnd_init_act: bool,        // Initialize variable activities with a small random value.
}

impl Default for DecisionHeuristicSettings {
    fn default() -> Self {
        DecisionHeuristicSettings {
            var_decay: 0.95,
            random_seed: 91648253.0,
            random_var_freq: 0.0,
            phase_saving: PhaseSaving::Full,
            rnd_pol: false,
            rnd_init_act: false,
        }
    }
}


#[derive(Debug)]
struct VarLine {
    sign: bool,     // Saved phase: the sign of the literal the next decision will assign.
    decision: bool, // Declares if a variable is eligible for selection in the decision heuristic.
}

pub struct DecisionHeuristic {
    settings: DecisionHeuristicSettings,
    var_inc: f64, // Amount to bump next variable with.
    rand: Random,
    var: VarMap<VarLine>,
    activity: VarMap<f64>,
    queue: VarHeap, // A priority queue of variables ordered with respect to the variable activity.
    selection_order: Vec<Lit>,
    selection_order_idx: usize,

    pub dec_vars: usize,
    pub rnd_decisions: u64,
}

impl DecisionHeuristic {
    pub fn new(settings: DecisionHeuristicSettings) -> DecisionHeuristic {
        let seed = settings.random_seed;
        DecisionHeuristic {
            settings,
            var_inc: 1.0,
            rand: Random::new(seed),
            var: VarMap::new(),
            activity: VarMap::new(),
            queue: VarHeap::new(),
            selection_order: Vec::new(),
            selection_order_idx: 0,
            dec_vars: 0,
            rnd_decisions: 0,
        }
    }

    pub fn init_var(&mut self, v: Var, sign: bool, dvar: bool) {
        let act = if self.settings.rnd_init_act {
            self.rand.drand() * 0.00001
        } else {
            0.0
        };
        self.activity.insert(&v, act);
        self.var.insert(
            &v,
            VarLine {
                sign,
                decision: false,
            },
        );
        self.set_decision_var(v, dvar);
    }

    /// Forgets every variable with index `>= vars`. Expects no variable to be assigned.
    pub fn truncate_vars(&mut self, vars: usize, assigns: &Assignment) {
        self.var.truncate(vars);
        self.activity.truncate(vars);
        self.dec_vars = self.var.iter().filter(|&(_, ln)| ln.decision).count();
        self.selection_order.retain(|lit| lit.var().index() < vars);
        self.selection_order_idx = 0;
        self.rebuild_order_heap(assigns);
    }

    pub fn set_decision_var(&mut self, v: Var, b: bool) {
        let ln = &mut self.var[&v];
        if b != ln.decision {
            if b {
                self.dec_vars += 1;
                let act = &self.activity;
                self.queue.insert(v, |a, b| act[a] > act[b]);
            } else {
                self.dec_vars -= 1;
            }
            ln.decision = b;
        }
    }

    pub fn set_selection_order(&mut self, order: &[Lit]) {
        self.selection_order = order.to_vec();
        self.selection_order_idx = 0;
    }

    pub fn cancel(&mut self, lit: Lit, top_level: bool) {
        let ln = &mut self.var[&lit.var()];
        match self.settings.phase_saving {
            PhaseSaving::Full => {
                ln.sign = lit.sign();
            }
            PhaseSaving::Limited if top_level => {
                ln.sign = lit.sign();
            }
            _ => {}
        }
        if ln.decision {
            let act = &self.activity;
            self.queue.insert(lit.var(), |a, b| act[a] > act[b]);
        }
        self.selection_order_idx = 0;
    }

    #[inline]
    pub fn activity(&self, v: Var) -> f64 {
        self.activity[&v]
    }

    /// The most active variable among `vars`, assigned or not.
    pub fn highest_activity(&self, vars: &[Var]) -> Option<Var> {
        let mut best: Option<(Var, f64)> = None;
        for &v in vars {
            let act = self.activity[&v];
            match best {
                Some((_, max)) if max >= act => {}
                _ => {
                    best = Some((v, act));
                }
            }
        }
        best.map(|(v, _)| v)
    }

    pub fn bump_activity(&mut self, v: &Var) {
        let new = self.activity[v] + self.var_inc;
        if new > 1e100 {
            // Rescale:
            self.var_inc *= 1e-100;
            for (_, act) in self.activity.iter_mut() {
                *act *= 1e-100;
            }
            self.activity[v] = new * 1e-100;
        } else {
            self.activity[v] = new;
        }

        let act = &self.activity;
        self.queue.update(v, |a, b| act[a] > act[b]);
    }

    pub fn decay_activity(&mut self) {
        self.var_inc *= 1.0 / self.settings.var_decay;
    }

    pub fn rebuild_order_heap(&mut self, assigns: &Assignment) {
        let mut tmp = Vec::with_capacity(self.queue.len());
        for (v, vl) in self.var.iter() {
            if vl.decision && assigns.is_undef(v) {
                tmp.push(v);
            }
        }

        let act = &self.activity;
        self.queue.heapify_from(tmp, |a, b| act[a] > act[b]);
    }

    fn pick_branch_var(&mut self, assigns: &Assignment) -> Option<Var> {
        // Random decision:
        if self.rand.chance(self.settings.random_var_freq) && !self.queue.is_empty() {
            let v = self.queue[self.rand.irand(self.queue.len())];
            if assigns.is_undef(v) && self.var[&v].decision {
                self.rnd_decisions += 1;
                return Some(v);
            }
        }

        // Activity based decision:
        while let Some(v) = {
            let act = &self.activity;
            self.queue.pop(|a, b| act[a] > act[b])
        } {
            if assigns.is_undef(v) && self.var[&v].decision {
                return Some(v);
            }
        }

        None
    }

    pub fn pick_branch_lit(&mut self, assigns: &Assignment) -> Option<Lit> {
        // User supplied order goes first, with the literal's own phase:
        while self.selection_order_idx < self.selection_order.len() {
            let lit = self.selection_order[self.selection_order_idx];
            self.selection_order_idx += 1;
            if assigns.is_undef(lit.var()) && self.var[&lit.var()].decision {
                return Some(lit);
            }
        }

        // Choose polarity based on different polarity modes (global or per-variable):
        self.pick_branch_var(assigns).map(|v| {
            let sign = if self.settings.rnd_pol {
                self.rand.chance(0.5)
            } else {
                self.var[&v].sign
            };
            v.sign_lit(sign)
        })
    }
}
