use std::{cmp, fmt};
use super::{LBool, Lit, Var, VarMap};
use super::clause::ClauseRef;


#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct DecisionLevel(usize);

pub const GROUND_LEVEL: DecisionLevel = DecisionLevel(0);

impl DecisionLevel {
    #[inline]
    pub fn offset(&self) -> usize {
        self.0
    }

    #[inline]
    pub fn is_ground(&self) -> bool {
        self.0 == 0
    }

    /// The level just below this one, or `None` for the ground level.
    #[inline]
    pub fn previous(&self) -> Option<DecisionLevel> {
        if self.0 > 0 {
            Some(DecisionLevel(self.0 - 1))
        } else {
            None
        }
    }
}


#[derive(Clone, Copy, Debug)]
pub struct VarData {
    pub reason: Option<ClauseRef>,
    pub level: DecisionLevel,
}


struct VarLine {
    assign: [LBool; 2],
    vd: VarData,
}


/// Current partial assignment: per-variable values, the trail in assignment
/// order, the trail offsets where each decision level starts, and the head of
/// the propagation queue.
pub struct Assignment {
    assignment: Vec<VarLine>,
    trail: Vec<Lit>,
    lim: Vec<usize>,
    qhead: usize,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment {
            assignment: Vec::new(),
            trail: Vec::new(),
            lim: Vec::new(),
            qhead: 0,
        }
    }


    #[inline]
    pub fn number_of_vars(&self) -> usize {
        self.assignment.len()
    }

    #[inline]
    pub fn number_of_assigns(&self) -> usize {
        self.trail.len()
    }

    #[inline]
    pub fn number_of_ground_assigns(&self) -> usize {
        match self.lim.first() {
            Some(&lim) => lim,
            None => self.trail.len(),
        }
    }


    pub fn new_var(&mut self) -> Var {
        self.assignment.push(VarLine {
            assign: [LBool::Undef, LBool::Undef],
            vd: VarData {
                reason: None,
                level: GROUND_LEVEL,
            },
        });
        Var::from_index(self.assignment.len() - 1)
    }

    /// Forgets every variable with index `>= vars`. Only legal on an empty trail.
    pub fn truncate_vars(&mut self, vars: usize) {
        assert!(self.trail.is_empty());
        self.assignment.truncate(vars);
    }


    #[inline]
    pub fn decision_level(&self) -> DecisionLevel {
        DecisionLevel(self.lim.len())
    }

    #[inline]
    pub fn is_ground_level(&self) -> bool {
        self.lim.is_empty()
    }

    #[inline]
    pub fn new_decision_level(&mut self) {
        self.lim.push(self.trail.len());
    }


    #[inline]
    pub fn assign_lit(&mut self, lit: Lit, reason: Option<ClauseRef>) {
        let level = DecisionLevel(self.lim.len());
        let line = &mut self.assignment[lit.var_index()];

        assert!(line.assign[0].is_undef());
        line.assign[lit.sign_index()] = LBool::True;
        line.assign[lit.sign_index() ^ 1] = LBool::False;
        line.vd.level = level;
        line.vd.reason = reason;
        self.trail.push(lit);
    }

    #[inline]
    pub fn rewind_until_level<F: FnMut(DecisionLevel, Lit)>(
        &mut self,
        DecisionLevel(target_level): DecisionLevel,
        mut f: F,
    ) {
        while self.lim.len() > target_level {
            let level = DecisionLevel(self.lim.len());
            let bottom = self.lim.pop().unwrap_or(0);
            while self.trail.len() > bottom {
                if let Some(lit) = self.trail.pop() {
                    f(level, lit);

                    let line = &mut self.assignment[lit.var_index()];
                    line.assign = [LBool::Undef, LBool::Undef];
                    line.vd.reason = None;
                }
            }
        }

        self.qhead = cmp::min(self.qhead, self.trail.len());
    }

    /// Unassigns everything, ground level included.
    pub fn rewind_all<F: FnMut(Lit)>(&mut self, mut f: F) {
        for lit in self.trail.drain(..) {
            f(lit);
            let line = &mut self.assignment[lit.var_index()];
            line.assign = [LBool::Undef, LBool::Undef];
            line.vd.reason = None;
        }
        self.lim.clear();
        self.qhead = 0;
    }

    /// Literals assigned strictly above `level`, in trail order.
    #[inline]
    pub fn trail_above(&self, DecisionLevel(level): DecisionLevel) -> &[Lit] {
        if self.lim.len() > level {
            &self.trail[self.lim[level]..]
        } else {
            &[]
        }
    }

    /// Literals of the current decision level, in trail order.
    #[inline]
    pub fn current_level_trail(&self) -> &[Lit] {
        match self.lim.last() {
            Some(&lim) => &self.trail[lim..],
            None => &self.trail[..],
        }
    }


    #[inline]
    pub fn dequeue_all(&mut self) {
        self.qhead = self.trail.len()
    }

    #[inline]
    pub fn dequeue(&mut self) -> Option<Lit> {
        if self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            Some(p)
        } else {
            None
        }
    }

    #[inline]
    pub fn assign_at(&self, index: usize) -> Lit {
        self.trail[index]
    }


    #[inline]
    pub fn is_undef(&self, var: Var) -> bool {
        self.assignment[var.index()].assign[0].is_undef()
    }

    #[inline]
    pub fn is_assigned_pos(&self, p: Lit) -> bool {
        match self.of_lit(p) {
            LBool::True => true,
            _ => false,
        }
    }

    #[inline]
    pub fn is_assigned_neg(&self, p: Lit) -> bool {
        match self.of_lit(p) {
            LBool::False => true,
            _ => false,
        }
    }

    #[inline]
    pub fn of_lit(&self, lit: Lit) -> LBool {
        self.assignment[lit.var_index()].assign[lit.sign_index()]
    }

    /// Level and reason of a literal that is currently false.
    #[inline]
    pub fn vardata(&self, lit: Lit) -> &VarData {
        let line = &self.assignment[lit.var_index()];
        debug_assert_eq!(line.assign[lit.sign_index()], LBool::False);
        &line.vd
    }

    /// Level and reason of an assigned variable.
    #[inline]
    pub fn var_data(&self, var: Var) -> Option<&VarData> {
        let line = &self.assignment[var.index()];
        if line.assign[0].is_undef() {
            None
        } else {
            Some(&line.vd)
        }
    }

    #[inline]
    pub fn clear_reason(&mut self, var: Var) {
        self.assignment[var.index()].vd.reason = None;
    }

    /// True if `lit` is assigned and `cr` is the reason for it.
    #[inline]
    pub fn is_reason_for(&self, cr: ClauseRef, lit: Lit) -> bool {
        let line = &self.assignment[lit.var_index()];
        !line.assign[0].is_undef() && line.vd.reason == Some(cr)
    }
}

impl Default for Assignment {
    fn default() -> Self {
        Assignment::new()
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for level in 0..1 + self.lim.len() {
            let l = if level > 0 { self.lim[level - 1] } else { 0 };
            let r = if level < self.lim.len() {
                self.lim[level]
            } else {
                self.trail.len()
            };

            if r > l {
                write!(f, "[{}:", level)?;
                for lit in self.trail[l..r].iter() {
                    write!(f, " {:?}", lit)?;
                }
                write!(f, " ]")?;
            }
        }

        Ok(())
    }
}


pub fn progress_estimate(assigns: &Assignment) -> f64 {
    if assigns.number_of_vars() == 0 {
        return 1.0;
    }

    let f = 1.0 / (assigns.number_of_vars() as f64);
    let mut progress = 0.0;

    let cl = assigns.lim.len();
    for level in 0..cl + 1 {
        let l = if level == 0 {
            0
        } else {
            assigns.lim[level - 1]
        };
        let r = if level == cl {
            assigns.trail.len()
        } else {
            assigns.lim[level]
        };
        progress += f.powi(level as i32) * ((r - l) as f64);
    }
    progress * f
}


pub fn extract_model(assigns: &Assignment) -> VarMap<bool> {
    let mut model = VarMap::new();
    for (i, line) in assigns.assignment.iter().enumerate() {
        match line.assign[0] {
            LBool::Undef => {}
            LBool::False => {
                model.insert(&Var::from_index(i), false);
            }
            LBool::True => {
                model.insert(&Var::from_index(i), true);
            }
        }
    }
    model
}


pub fn try_assign_lit(assigns: &mut Assignment, p: Lit, from: Option<ClauseRef>) -> bool {
    match assigns.of_lit(p) {
        LBool::True => true,
        LBool::False => false,
        LBool::Undef => {
            assigns.assign_lit(p, from);
            true
        }
    }
}
