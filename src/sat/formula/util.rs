use super::{Lit, VarMap};


// Returns true if a clause is satisfied with model
pub fn satisfied_with_model(clause: &[Lit], model: &VarMap<bool>) -> bool {
    for &lit in clause {
        match model.get(&lit.var()) {
            Some(sign) if *sign != lit.sign() => return true,
            _ => {}
        }
    }
    false
}

// Unassigned literals count as false here.
pub fn at_most_satisfied_with_model(lits: &[Lit], bound: usize, model: &VarMap<bool>) -> bool {
    let trues = lits
        .iter()
        .filter(|lit| match model.get(&lit.var()) {
            Some(sign) => *sign != lit.sign(),
            None => false,
        })
        .count();
    trues <= bound
}
