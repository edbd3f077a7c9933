use std::{fs, io, path, str};
use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use flate2::read::GzDecoder;
use crate::sat::formula::{Lit, Var, VarMap};
use crate::sat::Solver;


// A parsed line: a plain clause or one of the MiniCard "CNF+" cardinality forms.
enum Constraint {
    Clause(Vec<i32>),
    AtMost(Vec<i32>, usize),
    AtLeast(Vec<i32>, usize),
}


pub fn parse_file<P: AsRef<path::Path>, S: Solver>(path: P, solver: &mut S, validate: bool) -> io::Result<VarMap<i32>> {
    let mut reader = open(path)?;
    parse(&mut reader, solver, validate)
}


pub fn parse<R: io::Read, S: Solver>(stream: &mut R, solver: &mut S, validate: bool) -> io::Result<VarMap<i32>> {
    let mut subst = Subst::new(solver);
    DimacsParser::parse(stream, validate, |c| subst.add_constraint(c))?;
    Ok(subst.backward_subst)
}


pub fn write_model<W: io::Write>(stream: &mut W, backward_subst: &VarMap<i32>, model: &VarMap<bool>) -> io::Result<()> {
    for (var, &val) in model.iter() {
        if let Some(&var_id) = backward_subst.get(&var) {
            write!(stream, "{} ", if val { var_id } else { -var_id })?;
        }
    }
    writeln!(stream, "0")?;
    Ok(())
}


pub fn validate_model_file<P: AsRef<path::Path>>(
    path: P,
    backward_subst: &VarMap<i32>,
    model: &VarMap<bool>,
) -> io::Result<bool> {
    let mut reader = open(path)?;
    validate_model(&mut reader, backward_subst, model)
}

pub fn validate_model<R: io::Read>(stream: &mut R, backward_subst: &VarMap<i32>, model: &VarMap<bool>) -> io::Result<bool> {
    let mut lits = HashSet::new();
    for (var, &value) in model.iter() {
        let lit_id = {
            let var_id = match backward_subst.get(&var) {
                Some(&var_id) => var_id,
                None => continue,
            };
            if value {
                var_id
            } else {
                -var_id
            }
        };

        lits.insert(lit_id);
        if lits.contains(&(-lit_id)) {
            return Ok(false);
        }
    }

    let mut ok = true;
    DimacsParser::parse(stream, false, |c| {
        let holds = match c {
            Constraint::Clause(cl) => cl.iter().any(|lit| lits.contains(lit)),
            Constraint::AtMost(ls, k) => count_true(&ls, &lits) <= k,
            Constraint::AtLeast(ls, k) => count_true(&ls, &lits) >= k,
        };

        if !holds {
            ok = false;
        }
    })?;

    Ok(ok)
}

// Repeated literals count once, so a complementary pair always contributes exactly one.
fn count_true(ls: &[i32], model_lits: &HashSet<i32>) -> usize {
    let distinct: HashSet<i32> = ls.iter().cloned().collect();
    distinct.iter().filter(|lit| model_lits.contains(lit)).count()
}


// Opens a DIMACS file, looking through gzip compression when the magic bytes are there.
fn open<P: AsRef<path::Path>>(path: P) -> io::Result<Box<dyn io::Read>> {
    let mut reader = io::BufReader::new(fs::File::open(path)?);
    let gzipped = reader.fill_buf()?.starts_with(&[0x1f, 0x8b]);
    if gzipped {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}


struct Subst<'s, S: 's> {
    solver: &'s mut S,
    forward_subst: HashMap<i32, Var>,
    backward_subst: VarMap<i32>,
    mapped: i32,
}

impl<'s, S: Solver> Subst<'s, S> {
    fn new(solver: &'s mut S) -> Self {
        Subst {
            solver,
            forward_subst: HashMap::new(),
            backward_subst: VarMap::new(),
            mapped: 0,
        }
    }

    fn add_constraint(&mut self, c: Constraint) {
        match c {
            Constraint::Clause(raw) => {
                let lits = self.lits_by_ids(&raw);
                self.solver.add_clause(&lits);
            }

            Constraint::AtMost(raw, k) => {
                let lits = self.lits_by_ids(&raw);
                self.solver.add_at_most(&lits, k);
            }

            Constraint::AtLeast(raw, k) => {
                let lits = self.lits_by_ids(&raw);
                self.solver.add_at_least(&lits, k);
            }
        }
    }

    fn lits_by_ids(&mut self, raw: &[i32]) -> Vec<Lit> {
        raw.iter().map(|&lit_id| self.lit_by_id(lit_id)).collect()
    }

    fn lit_by_id(&mut self, lit_id: i32) -> Lit {
        let var_id = lit_id.abs();
        // Ids are mapped in order, independent of variables the solver already has:
        while var_id > self.mapped {
            self.mapped += 1;
            let v = self.solver.new_var(false, true);
            self.forward_subst.insert(self.mapped, v);
            self.backward_subst.insert(&v, self.mapped);
        }

        self.forward_subst[&var_id].sign_lit(lit_id < 0)
    }
}


struct DimacsParser<'p> {
    reader: str::Chars<'p>,
    cur: Option<char>,
    vars: HashSet<i32>,
    constraints: usize,
}

impl<'p> DimacsParser<'p> {
    fn parse<R: io::Read, F: FnMut(Constraint)>(reader: &mut R, validate: bool, constraint: F) -> io::Result<()> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;

        let mut p = DimacsParser {
            reader: buf.chars(),
            cur: None,
            vars: HashSet::new(),
            constraints: 0,
        };
        p.next();
        p.parse_body(validate, constraint)
    }

    fn parse_body<F: FnMut(Constraint)>(&mut self, validate: bool, mut constraint: F) -> io::Result<()> {
        enum State {
            Waiting,
            Parsing(usize, usize),
        }

        let mut state = State::Waiting;
        loop {
            self.skip_whitespace();
            match state {
                State::Waiting => match self.cur {
                    Some('c') => {
                        self.skip_line();
                    }

                    _ => {
                        self.consume("p cnf")?;
                        if self.cur == Some('+') {
                            self.next();
                        }
                        let vars = self.next_uint()?;
                        let constraints = self.next_uint()?;
                        state = State::Parsing(vars, constraints);
                    }
                },

                State::Parsing(vars, constraints) => match self.cur {
                    Some('c') => {
                        self.skip_line();
                    }

                    None => {
                        if validate {
                            if constraints != self.constraints {
                                return Err(parse_error(format!(
                                    "DIMACS header mismatch: {} clauses declared, {} found",
                                    constraints, self.constraints
                                )));
                            }

                            if vars < self.vars.len() {
                                return Err(parse_error(format!(
                                    "DIMACS header mismatch: {} vars declared, {} discovered",
                                    vars,
                                    self.vars.len()
                                )));
                            }
                        }
                        return Ok(());
                    }

                    _ => {
                        let c = self.parse_constraint()?;
                        constraint(c);
                    }
                },
            }
        }
    }

    fn parse_constraint(&mut self) -> io::Result<Constraint> {
        let mut lits = Vec::new();
        loop {
            self.skip_whitespace();
            match self.cur {
                Some('<') => {
                    self.consume("<=")?;
                    let k = self.next_uint()?;
                    self.constraints += 1;
                    return Ok(Constraint::AtMost(lits, k));
                }

                Some('>') => {
                    self.consume(">=")?;
                    let k = self.next_uint()?;
                    self.constraints += 1;
                    return Ok(Constraint::AtLeast(lits, k));
                }

                _ => {
                    let lit = self.next_int()?;
                    if lit == 0 {
                        self.constraints += 1;
                        return Ok(Constraint::Clause(lits));
                    }
                    self.vars.insert(lit.abs());
                    lits.push(lit);
                }
            }
        }
    }


    #[inline]
    fn next(&mut self) {
        self.cur = self.reader.next();
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.cur {
            if !c.is_whitespace() {
                break;
            }
            self.next();
        }
    }

    fn skip_line(&mut self) {
        loop {
            match self.cur {
                None => break,
                Some('\n') => {
                    self.next();
                    break;
                }
                _ => self.next(),
            }
        }
    }

    fn consume(&mut self, target: &str) -> io::Result<()> {
        for tc in target.chars() {
            match self.cur {
                Some(c) if c == tc => self.next(),
                _ => {
                    return Err(parse_error(format!("failed to consume; expected '{}'", target)));
                }
            }
        }
        Ok(())
    }

    fn read_int_body(&mut self) -> io::Result<usize> {
        let mut len: usize = 0;
        let mut value: usize = 0;
        loop {
            match self.cur.and_then(|c| c.to_digit(10)) {
                Some(d) => {
                    value = match value.checked_mul(10).and_then(|v| v.checked_add(d as usize)) {
                        Some(v) => v,
                        None => return Err(parse_error("int out of range".to_string())),
                    };
                    len += 1;
                    self.next();
                }

                _ if len > 0 => return Ok(value),

                _ => {
                    return Err(parse_error("int expected".to_string()));
                }
            }
        }
    }

    fn next_int(&mut self) -> io::Result<i32> {
        self.skip_whitespace();
        let sign = match self.cur {
            Some('+') => {
                self.next();
                1
            }
            Some('-') => {
                self.next();
                -1
            }
            _ => 1,
        };

        let val = self.read_int_body()?;
        if val > i32::max_value() as usize {
            return Err(parse_error(format!("literal {} out of range", val)));
        }
        Ok(sign * (val as i32))
    }

    fn next_uint(&mut self) -> io::Result<usize> {
        self.skip_whitespace();
        if let Some('+') = self.cur {
            self.next();
        }
        self.read_int_body()
    }
}


fn parse_error(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("PARSE ERROR! {}", msg))
}
