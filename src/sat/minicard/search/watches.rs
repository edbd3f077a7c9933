use std::mem;
use crate::sat::formula::{LBool, Lit, LitVec, Var};
use crate::sat::formula::assignment::Assignment;
use crate::sat::formula::clause::*;


// Clause watchers live on the negation of a watched literal and carry the
// other watched literal as blocker. At-most watchers live on the literal itself
// and have no blocker.
#[derive(Clone, Copy, Debug)]
struct Watcher {
    cref: ClauseRef,
    blocker: Option<Lit>,
}


#[derive(Default, Debug)]
struct WatchesLine {
    watchers: Vec<Watcher>,
    dirty: bool,
}


enum AtMostWatch {
    Keep,
    Moved(Lit),
    Unit,
    Conflict,
}


pub struct Watches {
    watches: LitVec<WatchesLine>,
    pub propagations: u64,
}

impl Watches {
    pub fn new() -> Self {
        Watches {
            watches: LitVec::new(),
            propagations: 0,
        }
    }

    pub fn init_var(&mut self, v: Var) {
        self.watches.init(v.pos_lit());
        self.watches.init(v.neg_lit());
    }

    pub fn truncate_vars(&mut self, vars: usize) {
        self.watches.truncate(2 * vars);
    }

    pub fn watch_clause(&mut self, c: &Clause, cr: ClauseRef) {
        if c.is_at_most() {
            for &lit in c.watched() {
                self.watches[lit].watchers.push(Watcher { cref: cr, blocker: None });
            }
        } else {
            let (c0, c1) = c.head_pair();
            self.watches[!c0].watchers.push(Watcher {
                cref: cr,
                blocker: Some(c1),
            });
            self.watches[!c1].watchers.push(Watcher {
                cref: cr,
                blocker: Some(c0),
            });
        }
    }

    pub fn unwatch_clause_strict(&mut self, c: &Clause, cr: ClauseRef) {
        for lit in watch_lines(c) {
            self.watches[lit].watchers.retain(|w| w.cref != cr);
        }
    }

    pub fn unwatch_clause_lazy(&mut self, c: &Clause) {
        for lit in watch_lines(c) {
            self.watches[lit].dirty = true;
        }
    }

    // Description:
    //   Propagates all enqueued facts. If a conflict arises, the conflicting constraint is returned.
    //
    //   Post-conditions:
    //     * the propagation queue is empty, even if there was a conflict.
    pub fn propagate(&mut self, ca: &mut ClauseAllocator, assigns: &mut Assignment) -> Option<ClauseRef> {
        let mut confl = None;
        while let Some(p) = assigns.dequeue() {
            self.propagations += 1;
            let false_lit = !p;

            let mut ws = {
                let line = &mut self.watches[p];
                if line.dirty {
                    line.watchers.retain(|w| !ca.is_deleted(w.cref));
                    line.dirty = false;
                }
                mem::replace(&mut line.watchers, Vec::new())
            };

            let mut i = 0;
            let mut j = 0;
            while i < ws.len() {
                let pwi = ws[i];
                i += 1;

                if let Some(blocker) = pwi.blocker {
                    if assigns.is_assigned_pos(blocker) {
                        ws[j] = pwi;
                        j += 1;
                        continue;
                    }
                }

                if ca.is_deleted(pwi.cref) {
                    continue;
                }

                let c = ca.edit(pwi.cref);
                let found_conflict = if c.is_at_most() {
                    match find_new_watch(c, p, assigns) {
                        AtMostWatch::Keep => {
                            ws[j] = pwi;
                            j += 1;
                            false
                        }

                        AtMostWatch::Moved(lit) => {
                            self.watches[lit].watchers.push(pwi);
                            false
                        }

                        AtMostWatch::Unit => {
                            ws[j] = pwi;
                            j += 1;
                            for k in 0..c.watchers() {
                                let lit = c.lits()[k];
                                if lit != p && !assigns.is_assigned_neg(lit) {
                                    assigns.assign_lit(!lit, Some(pwi.cref));
                                }
                            }
                            false
                        }

                        AtMostWatch::Conflict => {
                            ws[j] = pwi;
                            j += 1;
                            true
                        }
                    }
                } else {
                    // Make sure the false literal is data[1]:
                    if c.head() == false_lit {
                        c.swap(0, 1);
                    }

                    // If 0th watch is true, then clause is already satisfied.
                    let first = c.head();
                    let cw = Watcher {
                        cref: pwi.cref,
                        blocker: Some(first),
                    };
                    if Some(first) != pwi.blocker && assigns.is_assigned_pos(first) {
                        ws[j] = cw;
                        j += 1;
                        continue;
                    }

                    // Look for new watch:
                    match c.pull_literal(1, |lit| !assigns.is_assigned_neg(lit)) {
                        Some(lit) => {
                            self.watches[!lit].watchers.push(cw);
                            false
                        }

                        // Did not find watch -- clause is unit under assignment:
                        None => {
                            ws[j] = cw;
                            j += 1;
                            if assigns.is_assigned_neg(first) {
                                true
                            } else {
                                assigns.assign_lit(first, Some(cw.cref));
                                false
                            }
                        }
                    }
                };

                if found_conflict {
                    assigns.dequeue_all();
                    confl = Some(pwi.cref);

                    // Copy the remaining watches:
                    while i < ws.len() {
                        ws[j] = ws[i];
                        j += 1;
                        i += 1;
                    }
                }
            }

            ws.truncate(j);
            self.watches[p].watchers = ws;
        }

        confl
    }
}


fn watch_lines<'c>(c: &'c Clause) -> impl Iterator<Item = Lit> + 'c {
    let at_most = c.is_at_most();
    c.watched()
        .iter()
        .map(move |&lit| if at_most { lit } else { !lit })
}


// Called when the watched literal `p` of an at-most constraint became true.
fn find_new_watch(c: &mut Clause, p: Lit, assigns: &Assignment) -> AtMostWatch {
    let watchers = c.watchers();
    let max_true = c.len() - watchers + 1;

    let mut num_false = 0;
    let mut num_true = 0;
    for q in 0..watchers {
        let lit = c.lits()[q];
        match assigns.of_lit(lit) {
            LBool::Undef => {}

            LBool::False => {
                num_false += 1;
                if num_false >= watchers - 1 {
                    return AtMostWatch::Keep;
                }
            }

            LBool::True => {
                num_true += 1;
                if num_true > max_true {
                    return AtMostWatch::Conflict;
                }

                if lit == p {
                    if let Some(next) = c.pull_literal(q, |l| !assigns.is_assigned_pos(l)) {
                        return AtMostWatch::Moved(next);
                    }
                }
            }
        }
    }

    if num_true > 1 {
        AtMostWatch::Conflict
    } else {
        AtMostWatch::Unit
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::formula::assignment::Assignment;

    fn setup(n: usize) -> (Assignment, Watches, ClauseAllocator, Vec<Var>) {
        let mut assigns = Assignment::new();
        let mut watches = Watches::new();
        let mut vars = Vec::new();
        for _ in 0..n {
            let v = assigns.new_var();
            watches.init_var(v);
            vars.push(v);
        }
        (assigns, watches, ClauseAllocator::new_empty(), vars)
    }

    #[test]
    fn at_most_one_forces_the_rest() {
        let (mut assigns, mut watches, mut ca, v) = setup(3);
        let lits: Vec<Lit> = v.iter().map(|v| v.pos_lit()).collect();
        let (c, cr) = ca.alloc(&lits, ClauseHeader::AtMost { bound: 1 });
        watches.watch_clause(c, cr);

        assigns.new_decision_level();
        assigns.assign_lit(v[1].pos_lit(), None);
        assert!(watches.propagate(&mut ca, &mut assigns).is_none());

        assert!(assigns.is_assigned_neg(v[0].pos_lit()));
        assert!(assigns.is_assigned_neg(v[2].pos_lit()));
        assert_eq!(assigns.var_data(v[0]).and_then(|vd| vd.reason), Some(cr));
    }

    #[test]
    fn at_most_two_moves_watch_then_forces() {
        let (mut assigns, mut watches, mut ca, v) = setup(4);
        let lits: Vec<Lit> = v.iter().map(|v| v.pos_lit()).collect();
        let (c, cr) = ca.alloc(&lits, ClauseHeader::AtMost { bound: 2 });
        watches.watch_clause(c, cr);

        assigns.new_decision_level();
        assigns.assign_lit(v[0].pos_lit(), None);
        assert!(watches.propagate(&mut ca, &mut assigns).is_none());
        assert!(assigns.is_undef(v[3]));

        assigns.new_decision_level();
        assigns.assign_lit(v[1].pos_lit(), None);
        assert!(watches.propagate(&mut ca, &mut assigns).is_none());
        assert!(assigns.is_assigned_neg(v[2].pos_lit()));
        assert!(assigns.is_assigned_neg(v[3].pos_lit()));
    }

    #[test]
    fn clause_becomes_unit() {
        let (mut assigns, mut watches, mut ca, v) = setup(3);
        let lits = [v[0].pos_lit(), v[1].pos_lit(), v[2].pos_lit()];
        let (c, cr) = ca.alloc(&lits, ClauseHeader::Clause);
        watches.watch_clause(c, cr);

        assigns.new_decision_level();
        assigns.assign_lit(v[0].neg_lit(), None);
        assigns.assign_lit(v[2].neg_lit(), None);
        assert!(watches.propagate(&mut ca, &mut assigns).is_none());
        assert!(assigns.is_assigned_pos(v[1].pos_lit()));
        assert_eq!(assigns.var_data(v[1]).and_then(|vd| vd.reason), Some(cr));
        assert_eq!(ca.view(cr).head(), v[1].pos_lit());
    }

    #[test]
    fn lazy_unwatch_skips_freed_clause() {
        let (mut assigns, mut watches, mut ca, v) = setup(2);
        let (c, cr) = ca.alloc(&[v[0].pos_lit(), v[1].pos_lit()], ClauseHeader::Clause);
        watches.watch_clause(c, cr);
        watches.unwatch_clause_lazy(ca.view(cr));
        ca.free(cr);

        assigns.new_decision_level();
        assigns.assign_lit(v[0].neg_lit(), None);
        assert!(watches.propagate(&mut ca, &mut assigns).is_none());
        assert!(assigns.is_undef(v[1]));
    }
}
