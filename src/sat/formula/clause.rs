use std::{fmt, slice};
use slotmap::{new_key_type, SlotMap};
use super::{assignment::Assignment, Lit};


new_key_type! {
    /// Generation-checked handle into the clause arena. A handle to a freed
    /// clause never aliases a clause allocated later.
    pub struct ClauseRef;
}


#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClauseHeader {
    Clause,
    Learnt { activity: f64, serial: usize },
    AtMost { bound: usize },
}

impl ClauseHeader {
    #[inline]
    pub fn activity(&self) -> f64 {
        match *self {
            ClauseHeader::Learnt { activity, .. } => activity,
            _ => 0.0,
        }
    }
}


pub struct Clause {
    pub header: ClauseHeader,
    lits: Vec<Lit>,
}

impl Clause {
    #[inline]
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    #[inline]
    pub fn lits(&self) -> &[Lit] {
        &self.lits[..]
    }

    #[inline]
    pub fn head(&self) -> Lit {
        self.lits[0]
    }

    #[inline]
    pub fn head_pair(&self) -> (Lit, Lit) {
        (self.lits[0], self.lits[1])
    }

    #[inline]
    pub fn swap(&mut self, i: usize, j: usize) {
        self.lits.swap(i, j);
    }

    #[inline]
    pub fn is_learnt(&self) -> bool {
        match self.header {
            ClauseHeader::Learnt { .. } => true,
            _ => false,
        }
    }

    #[inline]
    pub fn is_at_most(&self) -> bool {
        match self.header {
            ClauseHeader::AtMost { .. } => true,
            _ => false,
        }
    }

    /// Number of leading positions that carry a watcher: two for a clause,
    /// `len - bound + 1` for an at-most constraint.
    #[inline]
    pub fn watchers(&self) -> usize {
        match self.header {
            ClauseHeader::AtMost { bound } => self.lits.len() - bound + 1,
            _ => 2,
        }
    }

    #[inline]
    pub fn watched(&self) -> &[Lit] {
        &self.lits[..self.watchers()]
    }

    /// Looks for an unwatched literal satisfying `f` and swaps it into `place`.
    #[inline]
    pub fn pull_literal<F: FnMut(Lit) -> bool>(&mut self, place: usize, mut f: F) -> Option<Lit> {
        for i in self.watchers()..self.lits.len() {
            if f(self.lits[i]) {
                self.lits.swap(i, place);
                return Some(self.lits[place]);
            }
        }
        None
    }

    /// Drops every literal from position `base` on that fails `f`.
    pub fn retain_suffix<F: Fn(Lit) -> bool>(&mut self, base: usize, f: F) {
        let mut i = base;
        while i < self.lits.len() {
            if f(self.lits[i]) {
                i += 1;
            } else {
                self.lits.swap_remove(i);
            }
        }
    }

    pub fn is_satisfied(&self, assigns: &Assignment) -> bool {
        match self.header {
            ClauseHeader::AtMost { .. } => {
                // At most `bound` literals are left that could become true.
                let limit = self.watchers() - 1;
                self.lits.iter().filter(|&&lit| assigns.is_assigned_neg(lit)).count() >= limit
            }
            _ => self.lits.iter().any(|&lit| assigns.is_assigned_pos(lit)),
        }
    }

    /// False literals whose assignment explains either a conflict on this
    /// constraint or, with `skip_head`, the implication of its head.
    #[inline]
    pub fn antecedents<'c>(&'c self, assigns: &'c Assignment, skip_head: bool) -> Antecedents<'c> {
        match self.header {
            ClauseHeader::AtMost { .. } => Antecedents::Trues {
                lits: self.lits.iter(),
                assigns,
            },
            _ => Antecedents::Lits(self.lits[if skip_head { 1 } else { 0 }..].iter()),
        }
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sep = match self.header {
            ClauseHeader::AtMost { .. } => " + ",
            _ => " ∨ ",
        };

        write!(f, "(")?;
        for (i, lit) in self.lits.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", sep)?;
            }
            write!(f, "{:?}", lit)?;
        }
        write!(f, ")")?;

        if let ClauseHeader::AtMost { bound } = self.header {
            write!(f, " ≤ {}", bound)?;
        }
        Ok(())
    }
}


#[derive(Clone)]
pub enum Antecedents<'c> {
    Lits(slice::Iter<'c, Lit>),
    Trues {
        lits: slice::Iter<'c, Lit>,
        assigns: &'c Assignment,
    },
}

impl<'c> Iterator for Antecedents<'c> {
    type Item = Lit;

    #[inline]
    fn next(&mut self) -> Option<Lit> {
        match *self {
            Antecedents::Lits(ref mut it) => it.next().cloned(),
            Antecedents::Trues {
                ref mut lits,
                assigns,
            } => {
                for &lit in lits {
                    if assigns.is_assigned_pos(lit) {
                        return Some(!lit);
                    }
                }
                None
            }
        }
    }
}


pub struct ClauseAllocator {
    slots: SlotMap<ClauseRef, Clause>,
}

impl ClauseAllocator {
    pub fn new_empty() -> ClauseAllocator {
        ClauseAllocator {
            slots: SlotMap::with_key(),
        }
    }

    pub fn alloc(&mut self, literals: &[Lit], header: ClauseHeader) -> (&Clause, ClauseRef) {
        assert!(literals.len() >= 2);
        let cr = self.slots.insert(Clause {
            header,
            lits: literals.to_vec(),
        });
        (&self.slots[cr], cr)
    }

    pub fn free(&mut self, cr: ClauseRef) {
        let removed = self.slots.remove(cr);
        assert!(removed.is_some(), "double free of {:?}", cr);
    }

    #[inline]
    pub fn is_deleted(&self, cr: ClauseRef) -> bool {
        !self.slots.contains_key(cr)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn view(&self, cr: ClauseRef) -> &Clause {
        &self.slots[cr]
    }

    #[inline]
    pub fn edit(&mut self, cr: ClauseRef) -> &mut Clause {
        &mut self.slots[cr]
    }

    #[inline]
    pub fn literals(&self, cr: ClauseRef) -> &[Lit] {
        self.view(cr).lits()
    }
}
