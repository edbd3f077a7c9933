extern crate minicard_rust;

use minicard_rust::sat::{SolveRes, Solver};
use minicard_rust::sat::formula::{LBool, Lit, Var, VarMap};
use minicard_rust::sat::formula::util::{at_most_satisfied_with_model, satisfied_with_model};
use minicard_rust::sat::minicard::{CCMinMode, CoreSolver, PhaseSaving, Settings};
use minicard_rust::sat::minicard::budget::{Budget, ConflictLimitHandler, NoHandler, TimeoutHandler};
use minicard_rust::sat::minicard::compile::DecisionControl;


fn new_solver() -> CoreSolver {
    CoreSolver::new(Settings::default())
}

fn new_vars<S: Solver>(solver: &mut S, n: usize) -> Vec<Var> {
    (0..n).map(|_| solver.new_var(false, true)).collect()
}

fn expect_sat(res: SolveRes) -> VarMap<bool> {
    match res {
        SolveRes::SAT(model) => model,
        _ => panic!("expected SAT"),
    }
}

fn expect_unsat(res: SolveRes) -> Vec<Lit> {
    match res {
        SolveRes::UnSAT(core) => core,
        _ => panic!("expected UNSAT"),
    }
}

fn count_true(model: &VarMap<bool>, lits: &[Lit]) -> usize {
    lits.iter()
        .filter(|lit| model.get(&lit.var()).map_or(false, |&v| v != lit.sign()))
        .count()
}

// 'pigeons' pigeons into 'holes' holes: every pigeon sits somewhere, every hole takes at most one.
fn pigeonhole(solver: &mut CoreSolver, pigeons: usize, holes: usize) -> Vec<Vec<Var>> {
    let x: Vec<Vec<Var>> = (0..pigeons).map(|_| new_vars(solver, holes)).collect();
    for row in x.iter() {
        let clause: Vec<Lit> = row.iter().map(|v| v.pos_lit()).collect();
        solver.add_clause(&clause);
    }
    for h in 0..holes {
        let column: Vec<Lit> = x.iter().map(|row| row[h].pos_lit()).collect();
        solver.add_at_most(&column, 1);
    }
    x
}


struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % (n as u64)) as usize
    }

    fn lit(&mut self, vars: &[Var]) -> Lit {
        let v = vars[self.below(vars.len())];
        v.sign_lit(self.next() & 1 == 1)
    }
}


enum Constr {
    Clause(Vec<Lit>),
    AtMost(Vec<Lit>, usize),
}

fn brute_force(n: usize, constrs: &[Constr]) -> bool {
    (0..(1u32 << n)).any(|bits| {
        let mut model = VarMap::new();
        for i in 0..n {
            model.insert(&Var::from_index(i), bits & (1 << i) != 0);
        }
        constrs.iter().all(|c| match c {
            Constr::Clause(lits) => satisfied_with_model(lits, &model),
            Constr::AtMost(lits, k) => at_most_satisfied_with_model(lits, *k, &model),
        })
    })
}


#[test]
fn unit_and_binary_clauses() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 2);
    assert!(solver.add_clause(&[v[0].pos_lit(), v[1].pos_lit()]));
    assert!(solver.add_clause(&[v[0].neg_lit()]));

    let model = expect_sat(solver.solve(&[]));
    assert_eq!(model[&v[0]], false);
    assert_eq!(model[&v[1]], true);
    assert!(solver.is_forced(v[1].pos_lit()));
}

#[test]
fn empty_clause_is_unsat_forever() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 1);
    assert!(!solver.add_clause(&[]));
    assert!(!solver.add_clause(&[v[0].pos_lit()]));
    assert!(expect_unsat(solver.solve(&[])).is_empty());
}

#[test]
fn complementary_units_are_unsat() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 1);
    assert!(solver.add_clause(&[v[0].pos_lit()]));
    assert!(!solver.add_clause(&[v[0].neg_lit()]));
    assert!(!solver.is_ok());
}

#[test]
fn tautologies_are_consumed() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 2);
    assert!(solver.add_clause(&[v[0].pos_lit(), v[0].neg_lit(), v[1].pos_lit()]));
    assert_eq!(solver.n_clauses(), 0);
}

#[test]
fn at_most_one_of_three() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 3);
    let lits: Vec<Lit> = v.iter().map(|v| v.pos_lit()).collect();
    assert!(solver.add_at_most(&lits, 1));
    assert!(solver.add_clause(&[v[0].pos_lit()]));

    let model = expect_sat(solver.solve(&[]));
    assert_eq!(count_true(&model, &lits), 1);
    assert!(solver.is_forced(v[1].neg_lit()));
    assert!(solver.is_forced(v[2].neg_lit()));
    assert_eq!(solver.reason_of(v[0]), None);
    match solver.reason_of(v[1]) {
        Some(mut reason) => {
            reason.sort();
            assert_eq!(reason, lits);
        }
        None => panic!("forced literal without reason"),
    }

    assert!(!solver.add_clause(&[v[1].pos_lit()]));
    assert!(expect_unsat(solver.solve(&[])).is_empty());
}

#[test]
fn at_most_bound_edge_cases() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 4);
    let lits: Vec<Lit> = v.iter().map(|v| v.pos_lit()).collect();

    // Trivially satisfied:
    assert!(solver.add_at_most(&lits, 4));
    assert_eq!(solver.n_clauses(), 0);

    // Bound zero forces every literal false:
    assert!(solver.add_at_most(&lits[..2], 0));
    assert_eq!(solver.value_of(v[0].pos_lit()), LBool::False);
    assert_eq!(solver.value_of(v[1].pos_lit()), LBool::False);

    // A complementary pair always contributes one true literal:
    assert!(solver.add_at_most(&[v[2].pos_lit(), v[2].neg_lit(), v[3].pos_lit()], 1));
    assert_eq!(solver.value_of(v[3].pos_lit()), LBool::False);

    // True literals use up the bound:
    assert!(solver.add_clause(&[v[2].pos_lit()]));
    assert!(!solver.add_at_most(&[v[2].pos_lit(), v[3].neg_lit()], 1));
}

#[test]
fn pigeonhole_is_unsat() {
    let mut solver = new_solver();
    pigeonhole(&mut solver, 6, 5);
    assert!(expect_unsat(solver.solve(&[])).is_empty());
    assert!(solver.stats().conflicts > 0);
}

#[test]
fn pigeons_fit_when_holes_suffice() {
    let mut solver = new_solver();
    let x = pigeonhole(&mut solver, 6, 6);
    let model = expect_sat(solver.solve(&[]));
    for h in 0..6 {
        let column: Vec<Lit> = x.iter().map(|row| row[h].pos_lit()).collect();
        assert!(count_true(&model, &column) <= 1);
    }
    for row in x.iter() {
        let lits: Vec<Lit> = row.iter().map(|v| v.pos_lit()).collect();
        assert!(count_true(&model, &lits) >= 1);
    }
}

#[test]
fn exactly_k_models() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 6);
    let lits: Vec<Lit> = v.iter().map(|v| v.pos_lit()).collect();
    assert!(solver.add_exactly(&lits, 3));

    let model = expect_sat(solver.solve(&[]));
    assert_eq!(count_true(&model, &lits), 3);

    let assumps = [lits[0], lits[1], lits[2], lits[3]];
    let core = expect_unsat(solver.solve(&assumps));
    assert!(!core.is_empty());
    assert!(core.iter().all(|l| assumps.contains(l)));

    let model = expect_sat(solver.solve(&[v[0].neg_lit(), v[1].neg_lit(), v[2].neg_lit()]));
    assert_eq!(count_true(&model, &lits[3..]), 3);
}

#[test]
fn at_least_more_than_available_is_unsat() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 2);
    assert!(!solver.add_at_least(&[v[0].pos_lit(), v[1].pos_lit()], 3));
    assert!(expect_unsat(solver.solve(&[])).is_empty());
}

#[test]
fn failed_assumptions_form_a_core() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 4);
    assert!(solver.add_clause(&[v[0].neg_lit(), v[1].neg_lit()]));
    assert!(solver.add_clause(&[v[2].pos_lit(), v[3].pos_lit()]));

    let assumps = [v[2].pos_lit(), v[0].pos_lit(), v[3].neg_lit(), v[1].pos_lit()];
    let core = expect_unsat(solver.solve(&assumps));
    assert!(!core.is_empty());
    assert!(core.iter().all(|l| assumps.contains(l)));
    assert!(core.contains(&v[1].pos_lit()));
    assert!(!core.contains(&v[2].pos_lit()));

    // The failure is local to the assumptions:
    assert!(solver.is_ok());
    expect_sat(solver.solve(&[]));
    expect_sat(solver.solve(&[v[0].pos_lit(), v[3].neg_lit()]));
}

#[test]
fn assumption_false_at_ground_level() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 2);
    assert!(solver.add_clause(&[v[0].neg_lit()]));
    let core = expect_unsat(solver.solve(&[v[1].pos_lit(), v[0].pos_lit()]));
    assert_eq!(core, vec![v[0].pos_lit()]);
    assert!(solver.is_ok());
}

fn check_against_brute_force(settings: Settings, seed: u64) {
    let mut rng = XorShift(seed);
    for round in 0..120 {
        let n = 8;
        let mut solver = CoreSolver::new(settings);
        let v = new_vars(&mut solver, n);

        let mut constrs = Vec::new();
        for _ in 0..(18 + round % 20) {
            let clause: Vec<Lit> = (0..3).map(|_| rng.lit(&v)).collect();
            constrs.push(Constr::Clause(clause));
        }
        for _ in 0..(round % 4) {
            // Distinct variables, random signs:
            let mut pool = v.clone();
            for i in 0..5 {
                let j = i + rng.below(n - i);
                pool.swap(i, j);
            }
            let lits: Vec<Lit> = pool[..5].iter().map(|v| v.sign_lit(rng.next() & 1 == 1)).collect();
            let k = 1 + rng.below(3);
            constrs.push(Constr::AtMost(lits, k));
        }

        for c in constrs.iter() {
            match c {
                Constr::Clause(lits) => solver.add_clause(lits),
                Constr::AtMost(lits, k) => solver.add_at_most(lits, *k),
            };
        }

        let expected = brute_force(n, &constrs);
        match solver.solve(&[]) {
            SolveRes::SAT(model) => {
                assert!(expected, "round {}: SAT reported for an unsatisfiable formula", round);
                for c in constrs.iter() {
                    match c {
                        Constr::Clause(lits) => assert!(satisfied_with_model(lits, &model)),
                        Constr::AtMost(lits, k) => assert!(at_most_satisfied_with_model(lits, *k, &model)),
                    }
                }

                // The model itself is a consistent set of assumptions:
                let assumps: Vec<Lit> = model.iter().map(|(v, &b)| v.sign_lit(!b)).collect();
                expect_sat(solver.solve(&assumps));
            }
            SolveRes::UnSAT(core) => {
                assert!(!expected, "round {}: UNSAT reported for a satisfiable formula", round);
                assert!(core.is_empty());
            }
            _ => panic!("unexpected result"),
        }
    }
}

#[test]
fn agrees_with_brute_force() {
    check_against_brute_force(Settings::default(), 0x9e37_79b9_7f4a_7c15);
}

#[test]
fn agrees_with_brute_force_basic_minimization() {
    let mut settings = Settings::default();
    settings.ccmin_mode = CCMinMode::Basic;
    check_against_brute_force(settings, 0x2545_f491_4f6c_dd1d);
}

#[test]
fn agrees_with_brute_force_without_minimization() {
    let mut settings = Settings::default();
    settings.ccmin_mode = CCMinMode::None;
    check_against_brute_force(settings, 0x5851_f42d_4c95_7f2d);
}

#[test]
fn agrees_with_brute_force_non_incremental() {
    let mut settings = Settings::default();
    settings.core.incremental = false;
    settings.heur.random_var_freq = 0.1;
    check_against_brute_force(settings, 0x1405_7b7e_f767_814f);
}

#[test]
fn non_incremental_simplification_keeps_answers() {
    let mut settings = Settings::default();
    settings.core.incremental = false;
    let mut solver = CoreSolver::new(settings);
    let v = new_vars(&mut solver, 4);
    assert!(solver.add_clause(&[v[0].pos_lit(), v[1].pos_lit()]));
    assert!(solver.add_clause(&[v[1].neg_lit(), v[2].pos_lit(), v[3].pos_lit()]));
    assert!(solver.add_at_most(&[v[1].pos_lit(), v[2].pos_lit(), v[3].pos_lit()], 2));
    expect_sat(solver.solve(&[]));

    // Ground units satisfy the first clause and shorten the second one:
    assert!(solver.add_clause(&[v[0].pos_lit()]));
    assert!(solver.add_clause(&[v[2].neg_lit()]));
    let model = expect_sat(solver.solve(&[v[1].pos_lit()]));
    assert!(model[&v[3]]);
    assert!(!model[&v[2]]);
    expect_unsat(solver.solve(&[v[1].pos_lit(), v[3].neg_lit()]));
}

#[test]
fn implied_clauses_are_skipped_with_rcheck() {
    let mut settings = Settings::default();
    settings.core.use_rcheck = true;
    let mut solver = CoreSolver::new(settings);
    let v = new_vars(&mut solver, 3);
    assert!(solver.add_clause(&[v[0].neg_lit(), v[1].pos_lit()]));
    assert!(solver.add_clause(&[v[1].neg_lit(), v[2].pos_lit()]));
    assert_eq!(solver.n_clauses(), 2);

    assert!(solver.add_clause(&[v[0].neg_lit(), v[2].pos_lit()]));
    assert_eq!(solver.n_clauses(), 2);
    assert_eq!(solver.value_of(v[0].pos_lit()), LBool::Undef);

    assert!(solver.add_clause(&[v[0].pos_lit(), v[2].neg_lit()]));
    assert_eq!(solver.n_clauses(), 3);

    let model = expect_sat(solver.solve(&[v[2].pos_lit()]));
    assert!(model[&v[0]] && model[&v[1]]);
}

#[test]
fn adding_constraints_never_revives_unsat() {
    let mut solver = new_solver();
    let x = pigeonhole(&mut solver, 4, 3);
    expect_unsat(solver.solve(&[]));
    solver.add_clause(&[x[0][0].pos_lit()]);
    expect_unsat(solver.solve(&[]));
}

#[test]
fn first_decision_follows_initial_sign() {
    let mut solver = new_solver();
    let neg = solver.new_var(true, true);
    let pos = solver.new_var(false, true);
    let model = expect_sat(solver.solve(&[]));
    assert_eq!(model[&neg], false);
    assert_eq!(model[&pos], true);
}

#[test]
fn non_decision_variables_stay_unassigned() {
    let mut solver = new_solver();
    let v = solver.new_var(false, true);
    let hidden = solver.new_var(false, false);
    solver.add_clause(&[v.pos_lit(), hidden.pos_lit()]);
    let model = expect_sat(solver.solve(&[]));
    assert_eq!(model[&v], true);
    assert!(model.get(&hidden).is_none());
}

#[test]
fn phase_saving_settings_are_accepted() {
    for &ps in [PhaseSaving::None, PhaseSaving::Limited, PhaseSaving::Full].iter() {
        let mut settings = Settings::default();
        settings.heur.phase_saving = ps;
        let mut solver = CoreSolver::new(settings);
        pigeonhole(&mut solver, 5, 4);
        expect_unsat(solver.solve(&[]));
    }
}

#[test]
fn selection_order_decides_first() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 3);
    solver.set_selection_order(&[v[1].neg_lit(), v[0].neg_lit()]);
    let model = expect_sat(solver.solve(&[]));
    assert_eq!(model[&v[1]], false);
    assert_eq!(model[&v[0]], false);
    assert_eq!(model[&v[2]], true);
}

#[test]
fn handler_cancels_search() {
    let mut solver = new_solver();
    let x = pigeonhole(&mut solver, 7, 6);

    let mut handler = ConflictLimitHandler::new(3);
    match solver.solve_limited(&Budget::new(), &[], &mut handler) {
        SolveRes::Canceled => {}
        _ => panic!("expected cancellation"),
    }
    for &v in x.iter().flatten() {
        assert!(solver.level_of(v).map_or(true, |l| l.is_ground()));
    }
    assert!(solver.is_ok());

    assert!(expect_unsat(solver.solve_limited(&Budget::new(), &[], &mut NoHandler)).is_empty());
}

#[test]
fn conflict_budget_interrupts() {
    let mut solver = new_solver();
    pigeonhole(&mut solver, 7, 6);

    let mut budget = Budget::new();
    budget.set_conflict_budget(5);
    match solver.solve_limited(&budget, &[], &mut NoHandler) {
        SolveRes::Interrupted(progress) => assert!(0.0 <= progress && progress <= 1.0),
        _ => panic!("expected interruption"),
    }

    budget.off();
    expect_unsat(solver.solve_limited(&budget, &[], &mut NoHandler));
}

#[test]
fn timeout_handler_cancels_once_deadline_passed() {
    let mut solver = new_solver();
    pigeonhole(&mut solver, 7, 6);

    let mut handler = TimeoutHandler::new(0.0);
    match solver.solve_limited(&Budget::new(), &[], &mut handler) {
        SolveRes::Canceled => {}
        _ => panic!("expected cancellation"),
    }
    assert!(handler.canceled());
    assert!(solver.is_ok());

    let mut handler = TimeoutHandler::new(3600.0);
    expect_unsat(solver.solve_limited(&Budget::new(), &[], &mut handler));
    assert!(!handler.canceled());
}

#[test]
fn decisions_count_only_assigned_literals() {
    let mut solver = new_solver();
    new_vars(&mut solver, 2);
    expect_sat(solver.solve(&[]));
    assert_eq!(solver.stats().decisions, 2);

    let mut solver = new_solver();
    let v = new_vars(&mut solver, 1);
    solver.add_clause(&[v[0].pos_lit()]);
    expect_sat(solver.solve(&[]));
    assert_eq!(solver.stats().decisions, 0);
}

#[test]
fn interrupted_budget_stops_immediately() {
    let mut solver = new_solver();
    pigeonhole(&mut solver, 5, 4);
    let budget = Budget::new();
    budget.interrupt();
    match solver.solve_limited(&budget, &[], &mut NoHandler) {
        SolveRes::Interrupted(_) => {}
        _ => panic!("expected interruption"),
    }
}

#[test]
fn load_state_rolls_back_constraints() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 3);
    assert!(solver.add_clause(&[v[0].pos_lit(), v[1].pos_lit()]));
    let state = solver.save_state();

    let w = new_vars(&mut solver, 2);
    assert!(solver.add_at_most(&[v[0].pos_lit(), v[1].pos_lit(), w[0].pos_lit()], 1));
    assert!(solver.add_clause(&[v[0].pos_lit()]));
    assert!(!solver.add_clause(&[v[1].pos_lit()]));
    expect_unsat(solver.solve(&[]));
    assert!(!solver.is_ok());

    solver.load_state(&state);
    assert!(solver.is_ok());
    assert_eq!(solver.n_vars(), 3);
    assert_eq!(solver.n_clauses(), 1);

    let model = expect_sat(solver.solve(&[v[0].pos_lit(), v[1].pos_lit()]));
    assert!(model[&v[0]] && model[&v[1]]);
    assert_eq!(solver.value_of(v[2].pos_lit()), LBool::Undef);
}

#[test]
fn load_state_replays_units() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 3);
    assert!(solver.add_clause(&[v[0].pos_lit()]));
    assert!(solver.add_clause(&[v[0].neg_lit(), v[1].pos_lit()]));
    let state = solver.save_state();

    assert!(solver.add_clause(&[v[2].pos_lit()]));
    solver.load_state(&state);

    assert!(solver.is_forced(v[0].pos_lit()));
    assert!(solver.is_forced(v[1].pos_lit()));
    assert_eq!(solver.value_of(v[2].pos_lit()), LBool::Undef);
    let model = expect_sat(solver.solve(&[v[2].neg_lit()]));
    assert_eq!(model[&v[2]], false);
}

#[test]
fn load_state_recovers_from_conflicting_unit() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 2);
    assert!(solver.add_clause(&[v[0].pos_lit()]));
    let state = solver.save_state();

    assert!(!solver.add_clause(&[v[0].neg_lit()]));
    assert!(expect_unsat(solver.solve(&[])).is_empty());
    assert!(!solver.is_ok());

    solver.load_state(&state);
    assert!(solver.is_ok());
    assert!(solver.is_forced(v[0].pos_lit()));
    let model = expect_sat(solver.solve(&[]));
    assert!(model[&v[0]]);
}

#[test]
fn unsat_snapshot_stays_unsat() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 1);
    let fresh = solver.save_state();
    solver.add_clause(&[v[0].pos_lit()]);
    solver.add_clause(&[v[0].neg_lit()]);
    let broken = solver.save_state();
    assert!(!broken.ok);

    solver.load_state(&fresh);
    assert!(solver.is_ok());
    expect_sat(solver.solve(&[]));

    solver.load_state(&broken);
    assert!(!solver.is_ok());
    expect_unsat(solver.solve(&[]));
}

#[test]
fn learnts_survive_rollback_when_older() {
    let mut solver = new_solver();
    pigeonhole(&mut solver, 6, 6);
    expect_sat(solver.solve(&[]));
    let state = solver.save_state();

    let extra = new_vars(&mut solver, 6);
    let lits: Vec<Lit> = extra.iter().map(|v| v.pos_lit()).collect();
    solver.add_at_least(&lits, 4);
    solver.add_at_most(&lits, 3);
    expect_unsat(solver.solve(&[]));

    solver.load_state(&state);
    assert!(solver.n_learnts() <= solver.save_state().learnts);
    expect_sat(solver.solve(&[]));
}

#[test]
#[should_panic]
fn save_state_requires_incremental_mode() {
    let mut settings = Settings::default();
    settings.core.incremental = false;
    let solver = CoreSolver::new(settings);
    solver.save_state();
}

#[test]
fn reset_forgets_everything() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 2);
    solver.add_clause(&[v[0].pos_lit()]);
    solver.add_clause(&[v[0].neg_lit()]);
    assert!(!solver.is_ok());

    solver.reset();
    assert!(solver.is_ok());
    assert_eq!(solver.n_vars(), 0);
    assert_eq!(solver.n_clauses(), 0);
}

#[test]
fn decide_reports_implied_literals() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 4);
    solver.add_clause(&[v[0].neg_lit(), v[1].pos_lit()]);
    solver.add_clause(&[v[1].neg_lit(), v[2].pos_lit()]);
    assert!(solver.start());

    assert!(solver.decide(v[0], true));
    let known = |_: Var| true;
    let implied = solver.newly_implied(&known);
    assert_eq!(implied.len(), 2);
    assert!(implied.contains(&v[1].pos_lit()));
    assert!(implied.contains(&v[2].pos_lit()));
    assert!(solver.newly_implied(&known).is_empty());

    let only_last = |x: Var| x == v[2];
    assert!(solver.decide(v[3], false));
    assert!(solver.newly_implied(&only_last).is_empty());

    solver.undo_decide(v[3]);
    assert_eq!(solver.value_of(v[3].pos_lit()), LBool::Undef);
    assert_eq!(DecisionControl::value_of(&solver, v[2].pos_lit()), LBool::True);

    solver.undo_decide(v[0]);
    assert_eq!(solver.value_of(v[1].pos_lit()), LBool::Undef);
}

#[test]
fn conflicting_decision_asserts_learnt_clause() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 3);
    solver.add_clause(&[v[1].neg_lit(), v[2].pos_lit()]);
    solver.add_clause(&[v[1].neg_lit(), v[2].neg_lit()]);
    assert!(solver.start());

    assert!(solver.decide(v[0], true));
    assert!(!solver.decide(v[1], true));
    assert!(!solver.at_assertion_level());

    solver.undo_decide(v[1]);
    assert!(!solver.at_assertion_level());
    solver.undo_decide(v[0]);
    assert!(solver.at_assertion_level());

    assert!(solver.assert_learned_clause());
    assert!(solver.is_forced(v[1].neg_lit()));
    let known = |_: Var| true;
    assert!(solver.newly_implied(&known).contains(&v[1].neg_lit()));
}

#[test]
fn conflict_with_cardinality_learns_clause() {
    let mut solver = new_solver();
    let v = new_vars(&mut solver, 4);
    let lits: Vec<Lit> = v[..3].iter().map(|v| v.pos_lit()).collect();
    solver.add_at_most(&lits, 1);
    solver.add_clause(&[v[3].neg_lit(), v[0].pos_lit()]);
    solver.add_clause(&[v[3].neg_lit(), v[1].pos_lit()]);
    assert!(solver.start());

    assert!(!solver.decide(v[3], true));
    solver.undo_decide(v[3]);
    assert!(solver.at_assertion_level());
    assert!(solver.assert_learned_clause());
    assert_eq!(solver.value_of(v[3].pos_lit()), LBool::False);
}

#[test]
fn highest_activity_follows_conflicts() {
    let mut solver = new_solver();
    let x = pigeonhole(&mut solver, 5, 4);
    let fresh = solver.new_var(false, true);
    expect_unsat(solver.solve(&[]));

    let mut candidates = vec![fresh];
    candidates.extend(x.iter().flatten().cloned());
    match solver.highest_var_activity(&candidates) {
        Some(best) => {
            assert_ne!(best, fresh);
            assert!(solver.activity(best) > solver.activity(fresh));
        }
        None => panic!("no candidate picked"),
    }
    assert!(solver.highest_var_activity(&[]).is_none());
}
