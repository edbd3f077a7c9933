use std::cmp::Ordering;
use crate::sat::formula::{assignment::Assignment, clause::*, Lit};


#[derive(Clone, Copy, Debug)]
pub struct ClauseDBSettings {
    pub remove_satisfied: bool, // Indicates whether possibly inefficient linear scan for satisfied clauses should be performed in 'simplify'.
    pub clause_decay: f64,
}

impl Default for ClauseDBSettings {
    fn default() -> ClauseDBSettings {
        ClauseDBSettings {
            remove_satisfied: true,
            clause_decay: 0.999,
        }
    }
}


#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    pub num_clauses: usize,
    pub num_learnts: usize,
    pub clauses_literals: u64,
    pub learnts_literals: u64,
}

impl Stats {
    fn add(&mut self, clause: &Clause) {
        if clause.is_learnt() {
            self.num_learnts += 1;
            self.learnts_literals += clause.len() as u64;
        } else {
            self.num_clauses += 1;
            self.clauses_literals += clause.len() as u64;
        }
    }

    fn del(&mut self, clause: &Clause) {
        if clause.is_learnt() {
            self.num_learnts -= 1;
            self.learnts_literals -= clause.len() as u64;
        } else {
            self.num_clauses -= 1;
            self.clauses_literals -= clause.len() as u64;
        }
    }
}


/// Original constraints, learnt clauses and unit facts, in insertion order.
/// Learnt clauses carry a serial number so that a snapshot can tell the ones
/// learnt after it was taken, whatever reductions happened since.
pub struct ClauseDB {
    pub settings: ClauseDBSettings,
    cla_inc: f64,            // Amount to bump next clause with.
    clauses: Vec<ClauseRef>, // List of problem clauses and at-most constraints.
    learnts: Vec<ClauseRef>, // List of learnt clauses.
    units: Vec<Lit>,         // Unit facts, replayed when a snapshot is restored.
    next_serial: usize,
    pub stats: Stats,
}

impl ClauseDB {
    pub fn new(settings: ClauseDBSettings) -> ClauseDB {
        ClauseDB {
            settings,
            cla_inc: 1.0,
            clauses: Vec::new(),
            learnts: Vec::new(),
            units: Vec::new(),
            next_serial: 0,
            stats: Stats::default(),
        }
    }

    pub fn add_clause(&mut self, ca: &mut ClauseAllocator, literals: &[Lit]) -> ClauseRef {
        let (c, cr) = ca.alloc(literals, ClauseHeader::Clause);
        self.stats.add(c);
        self.clauses.push(cr);
        cr
    }

    pub fn add_at_most(&mut self, ca: &mut ClauseAllocator, literals: &[Lit], bound: usize) -> ClauseRef {
        assert!(0 < bound && bound < literals.len());
        let (c, cr) = ca.alloc(literals, ClauseHeader::AtMost { bound });
        self.stats.add(c);
        self.clauses.push(cr);
        cr
    }

    pub fn learn_clause(&mut self, ca: &mut ClauseAllocator, literals: &[Lit]) -> ClauseRef {
        let header = ClauseHeader::Learnt {
            activity: 0.0,
            serial: self.next_serial,
        };
        self.next_serial += 1;

        let (c, cr) = ca.alloc(literals, header);
        self.stats.add(c);
        self.learnts.push(cr);
        self.bump_activity(ca, cr);
        cr
    }

    #[inline]
    pub fn add_unit(&mut self, lit: Lit) {
        self.units.push(lit);
    }

    #[inline]
    pub fn units(&self) -> &[Lit] {
        &self.units[..]
    }

    #[inline]
    pub fn number_of_clauses(&self) -> usize {
        self.clauses.len()
    }

    #[inline]
    pub fn number_of_learnts(&self) -> usize {
        self.learnts.len()
    }

    #[inline]
    pub fn learnt_serial(&self) -> usize {
        self.next_serial
    }

    // Clears every reason that still points at 'cr' and frees it.
    fn remove_clause(stats: &mut Stats, ca: &mut ClauseAllocator, assigns: &mut Assignment, cr: ClauseRef) {
        {
            let c = ca.view(cr);
            stats.del(c);
            for &lit in c.lits() {
                if assigns.is_reason_for(cr, lit) {
                    assigns.clear_reason(lit.var());
                }
            }
        }
        ca.free(cr);
    }

    pub fn bump_activity(&mut self, ca: &mut ClauseAllocator, cr: ClauseRef) {
        let new = {
            let c = ca.edit(cr);
            if let ClauseHeader::Learnt { ref mut activity, .. } = c.header {
                *activity += self.cla_inc;
                *activity
            } else {
                return;
            }
        };

        if new > 1e20 {
            // Rescale:
            self.cla_inc *= 1e-20;
            for &cri in self.learnts.iter() {
                if let ClauseHeader::Learnt { ref mut activity, .. } = ca.edit(cri).header {
                    *activity *= 1e-20;
                }
            }
        }
    }

    pub fn decay_activity(&mut self) {
        self.cla_inc *= 1.0 / self.settings.clause_decay;
    }

    // Description:
    //   Remove half of the learnt clauses, minus the clauses locked by the current assignment. Locked
    //   clauses are clauses that are reason to some assignment. Binary clauses are never removed.
    pub fn reduce<F: FnMut(&Clause)>(&mut self, ca: &mut ClauseAllocator, assigns: &mut Assignment, mut notify: F) {
        self.learnts.sort_by(|&rx, &ry| {
            let x = ca.view(rx);
            let y = ca.view(ry);

            if x.len() == 2 && y.len() == 2 {
                Ordering::Equal
            } else if x.len() == 2 {
                Ordering::Greater
            } else if y.len() == 2 {
                Ordering::Less
            } else {
                x.header
                    .activity()
                    .partial_cmp(&y.header.activity())
                    .unwrap_or(Ordering::Equal)
            }
        });

        // Don't delete binary or locked clauses. From the rest, delete clauses from the first half
        // and clauses with activity smaller than 'extra_lim':
        let index_lim = self.learnts.len() / 2;
        let extra_lim = self.cla_inc / self.learnts.len() as f64; // Remove any clause below this activity
        let stats = &mut self.stats;

        let mut i = 0;
        let before = self.learnts.len();
        self.learnts.retain(|&cr| {
            let remove = {
                let c = ca.view(cr);
                c.len() > 2
                    && !assigns.is_reason_for(cr, c.head())
                    && (i < index_lim || c.header.activity() < extra_lim)
            };
            i += 1;

            if remove {
                notify(ca.view(cr));
                Self::remove_clause(stats, ca, assigns, cr);
            }
            !remove
        });

        debug!("Reduced learnt clauses: {} => {}", before, self.learnts.len());
    }

    fn retain_clause<F: FnMut(&Clause)>(
        stats: &mut Stats,
        ca: &mut ClauseAllocator,
        assigns: &mut Assignment,
        notify: &mut F,
        cr: ClauseRef,
        strengthen: bool,
    ) -> bool {
        if ca.view(cr).is_satisfied(assigns) {
            notify(ca.view(cr));
            Self::remove_clause(stats, ca, assigns, cr);
            false
        } else {
            let c = ca.edit(cr);
            if strengthen && !c.is_at_most() {
                debug_assert!({
                    let (c0, c1) = c.head_pair();
                    assigns.is_undef(c0.var()) && assigns.is_undef(c1.var())
                });

                stats.del(c);
                c.retain_suffix(2, |lit| !assigns.is_assigned_neg(lit));
                stats.add(c);
            }
            true
        }
    }

    // Removes constraints satisfied at the ground level. Original constraints are
    // only touched with 'originals', false literals only stripped with 'strengthen'.
    pub fn remove_satisfied<F: FnMut(&Clause)>(
        &mut self,
        ca: &mut ClauseAllocator,
        assigns: &mut Assignment,
        originals: bool,
        strengthen: bool,
        mut notify: F,
    ) {
        assert!(assigns.is_ground_level());

        let stats = &mut self.stats;
        self.learnts.retain(|&cr| {
            Self::retain_clause(stats, ca, assigns, &mut notify, cr, strengthen)
        });

        if originals && self.settings.remove_satisfied {
            self.clauses.retain(|&cr| {
                Self::retain_clause(stats, ca, assigns, &mut notify, cr, strengthen)
            });
        }
    }

    // Rolls the database back to a snapshot: keeps the first 'clauses' original
    // constraints, the learnt clauses with serial below 'serial' and the first
    // 'units' unit facts.
    pub fn truncate<F: FnMut(&Clause, ClauseRef)>(
        &mut self,
        ca: &mut ClauseAllocator,
        assigns: &mut Assignment,
        clauses: usize,
        serial: usize,
        units: usize,
        mut notify: F,
    ) {
        let stats = &mut self.stats;

        let doomed = self.clauses.split_off(clauses.min(self.clauses.len()));
        for &cr in doomed.iter().rev() {
            notify(ca.view(cr), cr);
            Self::remove_clause(stats, ca, assigns, cr);
        }

        self.learnts.retain(|&cr| {
            let keep = match ca.view(cr).header {
                ClauseHeader::Learnt { serial: s, .. } => s < serial,
                _ => true,
            };
            if !keep {
                notify(ca.view(cr), cr);
                Self::remove_clause(stats, ca, assigns, cr);
            }
            keep
        });
        self.next_serial = self.next_serial.min(serial);

        self.units.truncate(units);
    }
}
