//! DIMACS CNF parser and writer for the satrace SAT solver.

use std::{borrow::Borrow, io};

use satrace_formula::{CnfFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error(
        "line {}: Unexpected character in DIMACS CNF input: '{}'",
        line,
        unexpected
    )]
    UnexpectedInput { line: usize, unexpected: char },
    #[error("line {}: Literal index is too large", line)]
    LiteralTooLarge { line: usize },
    #[error("line {}: Invalid header syntax: {}", line, header)]
    InvalidHeader { line: usize, header: String },
    #[error("line {}: Unterminated clause", line)]
    UnterminatedClause { line: usize },
    #[error("line {}: Clause contains a literal and its negation", line)]
    TautologicalClause { line: usize },
    #[error(
        "Formula has {} variables while the header specifies {} variables",
        var_count,
        header_var_count
    )]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
}

/// Variable and clause count of a DIMACS CNF header.
///
/// The clause count is advisory: the parser accepts inputs whose actual clause count differs.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Parser for DIMACS CNF files.
///
/// Comment lines start with `c`, the header is `p cnf <vars> <clauses>` and each clause is a
/// whitespace separated list of signed variable numbers terminated by `0`. Clauses may span
/// lines. A clause containing a literal and its negation is rejected.
pub struct DimacsParser {
    input: Vec<u8>,
    pos: usize,
    line: usize,

    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,
    clause_count: usize,
}

impl DimacsParser {
    /// Parse the given input into a single [`CnfFormula`].
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, Error> {
        Ok(Self::parse_detailed(input)?.formula)
    }

    /// Parse the given input, keeping the parser around for header and count queries.
    pub fn parse_detailed(mut input: impl io::Read) -> Result<DimacsParser, Error> {
        let mut bytes = vec![];
        input.read_to_end(&mut bytes)?;

        let mut parser = DimacsParser {
            input: bytes,
            pos: 0,
            line: 1,
            formula: CnfFormula::new(),
            partial_clause: vec![],
            header: None,
            clause_count: 0,
        };
        parser.run()?;
        Ok(parser)
    }

    /// The parsed formula.
    pub fn formula(&self) -> &CnfFormula {
        &self.formula
    }

    /// The header data, if the input had a header.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed.
    ///
    /// Can differ from the header's clause count, which is advisory only.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables of the parsed formula.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    fn run(&mut self) -> Result<(), ParserError> {
        let mut start_of_line = true;
        while let Some(&byte) = self.input.get(self.pos) {
            match byte {
                b'\n' => {
                    self.pos += 1;
                    self.line += 1;
                    start_of_line = true;
                }
                b'\r' => {
                    self.pos += 1;
                    start_of_line = true;
                }
                b' ' | b'\t' => {
                    self.pos += 1;
                }
                b'c' if start_of_line => self.skip_comment(),
                b'p' if start_of_line && self.header.is_none() => {
                    self.parse_header_line()?;
                    start_of_line = false;
                }
                b'-' | b'0'..=b'9' => {
                    self.parse_literal()?;
                    start_of_line = false;
                }
                _ => return Err(self.unexpected(byte)),
            }
        }

        if !self.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause { line: self.line });
        }

        if let Some(header) = self.header {
            let var_count = self.formula.var_count();
            if var_count > header.var_count {
                return Err(ParserError::VarCount {
                    var_count,
                    header_var_count: header.var_count,
                });
            }
        }

        Ok(())
    }

    fn unexpected(&self, byte: u8) -> ParserError {
        ParserError::UnexpectedInput {
            line: self.line,
            unexpected: byte as char,
        }
    }

    /// Skip input up to (but not including) the next newline.
    fn skip_comment(&mut self) {
        while let Some(&byte) = self.input.get(self.pos) {
            if byte == b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn parse_header_line(&mut self) -> Result<(), ParserError> {
        let start = self.pos;
        self.skip_comment();
        let line = self.line;
        let header_line = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();

        let invalid_header = || ParserError::InvalidHeader {
            line,
            header: header_line.clone(),
        };

        if !header_line.starts_with("p ") {
            return Err(invalid_header());
        }

        let mut header_values = header_line[2..].split_whitespace();

        if header_values.next() != Some("cnf") {
            return Err(invalid_header());
        }

        let var_count: usize = match header_values.next().and_then(|value| value.parse().ok()) {
            None => return Err(invalid_header()),
            Some(value) => value,
        };

        if var_count > Var::max_count() {
            return Err(ParserError::LiteralTooLarge { line: self.line });
        }

        let clause_count: usize = match header_values.next().and_then(|value| value.parse().ok()) {
            None => return Err(invalid_header()),
            Some(value) => value,
        };

        if header_values.next().is_some() {
            return Err(invalid_header());
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        self.formula.set_var_count(var_count);

        Ok(())
    }

    fn parse_literal(&mut self) -> Result<(), ParserError> {
        let negative = self.input[self.pos] == b'-';
        if negative {
            self.pos += 1;
            match self.input.get(self.pos) {
                Some(&byte) if byte.is_ascii_digit() => (),
                Some(&byte) => return Err(self.unexpected(byte)),
                None => return Err(ParserError::UnterminatedClause { line: self.line }),
            }
        }

        let mut value: usize = 0;
        while let Some(&byte) = self.input.get(self.pos) {
            if !byte.is_ascii_digit() {
                break;
            }
            value = value * 10 + (byte - b'0') as usize;
            if value > Var::max_count() {
                return Err(ParserError::LiteralTooLarge { line: self.line });
            }
            self.pos += 1;
        }

        // A literal token ends at whitespace or the end of the input.
        match self.input.get(self.pos) {
            None | Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => (),
            Some(&byte) => return Err(self.unexpected(byte)),
        }

        if value == 0 {
            if negative {
                return Err(self.unexpected(b'0'));
            }
            self.finish_clause()
        } else {
            self.partial_clause
                .push(Var::from_dimacs(value as isize).lit(!negative));
            Ok(())
        }
    }

    fn finish_clause(&mut self) -> Result<(), ParserError> {
        let mut sorted = self.partial_clause.clone();
        sorted.sort_unstable();
        // Sorting by code makes both literals of a variable adjacent.
        let tautological = sorted
            .windows(2)
            .any(|pair| pair[0].var() == pair[1].var() && pair[0] != pair[1]);
        if tautological {
            return Err(ParserError::TautologicalClause { line: self.line });
        }

        self.formula.add_clause(&self.partial_clause);
        self.partial_clause.clear();
        self.clause_count += 1;
        Ok(())
    }
}

/// Write a DIMACS CNF header.
///
/// Can be used with [`write_dimacs_clauses`] to implement incremental writing.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write an iterator of clauses as headerless DIMACS CNF.
///
/// Can be used with [`write_dimacs_header`] to implement incremental writing.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a formula as DIMACS CNF.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Error;
    use proptest::{test_runner::TestCaseError, *};

    use satrace_formula::{cnf::strategy::*, cnf_formula};

    #[test]
    fn odd_whitespace() -> Result<(), Error> {
        let parsed = DimacsParser::parse(
            b"p  cnf  4   3  \n  1  \n 2  3\n0 -4 0 2\nccomment  \n\n0\n\n" as &[_],
        )?;

        let expected = cnf_formula![
            1, 2, 3;
            -4;
            2;
        ];

        assert_eq!(parsed, expected);

        Ok(())
    }

    #[test]
    fn advisory_clause_count() -> Result<(), Error> {
        // The header announces 7 clauses, the input has 2. Not an error.
        let parser = DimacsParser::parse_detailed(b"p cnf 3 7\n1 2 0\n-3 0\n" as &[_])?;

        assert_eq!(parser.clause_count(), 2);
        assert_eq!(parser.header().unwrap().clause_count, 7);
        assert_eq!(parser.formula().len(), 2);

        Ok(())
    }

    #[test]
    fn header_var_count_covers_unused_vars() -> Result<(), Error> {
        let parsed = DimacsParser::parse(b"p cnf 10 1\n1 2 0\n" as &[_])?;

        assert_eq!(parsed.var_count(), 10);

        Ok(())
    }

    macro_rules! expect_error {
        ( $input:expr, $( $cases:tt )* ) => {
            match DimacsParser::parse($input as &[_]) {
                Ok(parsed) => panic!("Expected error but got {:?}", parsed),
                Err(err) => match err.downcast_ref() {
                    Some(casted_err) => match casted_err {
                        $( $cases )*,
                        _ => panic!("Unexpected error {:?}", casted_err),
                    },
                    None => panic!("Unexpected error type {:?}", err),
                }
            }
        };
    }

    #[test]
    fn invalid_headers() {
        expect_error!(b"pcnf 1 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p notcnf 1 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf 1", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf 1 2 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf foo bar", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf -3 -6", ParserError::InvalidHeader { .. } => ());

        expect_error!(
            format!("p cnf {} 4", Var::max_var().to_dimacs() + 1).as_bytes(),
            ParserError::LiteralTooLarge { .. } => ()
        );
        DimacsParser::parse(format!("p cnf {} 0", Var::max_var().to_dimacs()).as_bytes()).unwrap();

        expect_error!(b"p cnf 4 18446744073709551616", ParserError::InvalidHeader { .. } => ());

        expect_error!(
            b"p cnf 1 2\np cnf 1 2\n",
            ParserError::UnexpectedInput { unexpected: 'p', .. } => ()
        );
    }

    #[test]
    fn header_var_count_too_small() {
        expect_error!(
            b"p cnf 1 1\n 2 0",
            ParserError::VarCount { var_count: 2, header_var_count: 1 } => ()
        );
    }

    #[test]
    fn syntax_errors() {
        expect_error!(
            b"1 2 ?foo",
            ParserError::UnexpectedInput { unexpected: '?', .. } => ()
        );

        expect_error!(
            b"1 2 - 3 0",
            ParserError::UnexpectedInput { unexpected: ' ', .. } => ()
        );

        expect_error!(
            b"1 2 -\n3 0",
            ParserError::UnexpectedInput { unexpected: '\n', .. } => ()
        );

        expect_error!(
            b"1 2 --3 0",
            ParserError::UnexpectedInput { unexpected: '-', .. } => ()
        );

        expect_error!(
            b"1 2-3 0",
            ParserError::UnexpectedInput { unexpected: '-', .. } => ()
        );
    }

    #[test]
    fn unterminated_clause() {
        expect_error!(
            b"1 2 3",
            ParserError::UnterminatedClause { .. } => ()
        );
    }

    #[test]
    fn tautological_clause() {
        expect_error!(
            b"p cnf 3 1\n1 -2 -1 0\n",
            ParserError::TautologicalClause { .. } => ()
        );
    }

    #[test]
    fn literal_too_large() {
        expect_error!(
            format!("1 {} 2 0", Var::max_var().to_dimacs() + 1).as_bytes(),
            ParserError::LiteralTooLarge { .. } => ()
        );

        assert_eq!(
            DimacsParser::parse(format!("1 {} 2 0", Var::max_var().to_dimacs()).as_bytes())
                .unwrap(),
            cnf_formula![
                1, Var::max_var().to_dimacs(), 2;
            ]
        );
    }

    proptest! {

        #[test]
        fn roundtrip(input in cnf_formula(1..100usize, 0..100, 0..10)) {
            let mut buf = vec![];

            write_dimacs(&mut buf, &input)?;

            let parsed = DimacsParser::parse(&buf[..]).map_err(|e| TestCaseError::fail(e.to_string()))?;

            prop_assert_eq!(parsed, input);
        }
    }
}
