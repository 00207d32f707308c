//! DIMACS CNF parsing and writing for the rupcheck proof checker.
//!
//! The parser pulls clauses one at a time from a buffered reader, so proof
//! files with millions of clauses are processed in constant memory and each
//! clause can be handed to the checker the moment its terminating `0` is
//! read. The `p cnf` header line is optional; RUP proof files, which are
//! bare zero-terminated clauses in the same literal syntax, parse with the
//! same type.

use std::borrow::Borrow;
use std::io;

use rupcheck_formula::{CnfFormula, Lit, Var};

use thiserror::Error;

/// Errors while reading DIMACS CNF or RUP input.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line {line}: unexpected character '{unexpected}'")]
    UnexpectedChar { line: usize, unexpected: char },
    #[error("line {line}: literal index exceeds the supported maximum")]
    LiteralTooLarge { line: usize },
    #[error("line {line}: invalid header")]
    InvalidHeader { line: usize },
    #[error("line {line}: clause not terminated by 0")]
    UnterminatedClause { line: usize },
    #[error("formula uses variable {var} but the header declares only {header_var_count}")]
    VarCount { var: usize, header_var_count: usize },
    #[error("formula has {clause_count} clauses but the header declares {header_clause_count}")]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
}

/// Variable and clause count of a DIMACS CNF header line.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Pull parser for DIMACS CNF files and headerless RUP clause streams.
///
/// [`next_clause`](DimacsParser::next_clause) scans forward to the next
/// complete clause and returns its literals, borrowed from an internal
/// buffer that is reused for every clause. Comment lines and the optional
/// header are consumed along the way; header counts are verified when the
/// end of the input is reached.
pub struct DimacsParser<R> {
    reader: R,
    /// Whether the next byte read starts a new input line.
    at_line_start: bool,
    /// Current line, for error reporting.
    line: usize,
    header: Option<DimacsHeader>,
    /// Literals of the clause being assembled.
    clause: Vec<Lit>,
    clause_count: usize,
    /// Largest 1-based variable seen in a clause.
    max_var: usize,
    finished: bool,
}

impl<R: io::BufRead> DimacsParser<R> {
    /// Create a parser reading from the given input.
    pub fn new(reader: R) -> DimacsParser<R> {
        DimacsParser {
            reader,
            at_line_start: true,
            line: 1,
            header: None,
            clause: vec![],
            clause_count: 0,
            max_var: 0,
            finished: false,
        }
    }

    /// Parse a complete input into a single formula.
    pub fn parse(input: R) -> Result<CnfFormula, ParserError> {
        let mut parser = DimacsParser::new(input);
        let mut formula = CnfFormula::new();

        while let Some(clause) = parser.next_clause()? {
            formula.add_clause(clause);
        }
        formula.set_var_count(parser.var_count());

        Ok(formula)
    }

    /// Advance to the next clause and return its literals.
    ///
    /// Returns `None` once the input is exhausted; if a header was present
    /// its variable and clause counts are verified at that point. The
    /// returned slice is valid until the next call.
    pub fn next_clause(&mut self) -> Result<Option<&[Lit]>, ParserError> {
        if self.finished {
            return Ok(None);
        }
        self.clause.clear();

        loop {
            let byte = match self.next_token_byte()? {
                Some(byte) => byte,
                None => {
                    if !self.clause.is_empty() {
                        return Err(ParserError::UnterminatedClause { line: self.line });
                    }
                    self.finished = true;
                    self.check_header()?;
                    return Ok(None);
                }
            };

            let number = self.read_number(byte)?;
            if number == 0 {
                self.clause_count += 1;
                return Ok(Some(&self.clause));
            }

            self.max_var = self.max_var.max(number.abs() as usize);
            self.clause.push(Lit::from_dimacs(number));
        }
    }

    /// The header data, if a header line was seen.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed so far.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables in the parsed input.
    ///
    /// The maximum of the largest variable seen and the header count.
    pub fn var_count(&self) -> usize {
        self.max_var.max(self.header.map_or(0, |header| header.var_count))
    }

    /// Next input byte, paired with a flag telling whether it starts a line.
    fn next_byte(&mut self) -> Result<Option<(u8, bool)>, io::Error> {
        let buf = self.reader.fill_buf()?;
        let byte = match buf.first() {
            None => return Ok(None),
            Some(&byte) => byte,
        };
        self.reader.consume(1);

        let at_line_start = self.at_line_start;
        self.at_line_start = byte == b'\n';
        if byte == b'\n' {
            self.line += 1;
        }

        Ok(Some((byte, at_line_start)))
    }

    /// Skip whitespace, comment lines and the header line, returning the
    /// first byte of the next token.
    fn next_token_byte(&mut self) -> Result<Option<u8>, ParserError> {
        loop {
            let (byte, at_line_start) = match self.next_byte()? {
                None => return Ok(None),
                Some(entry) => entry,
            };

            match byte {
                b' ' | b'\t' | b'\r' | b'\n' => (),
                b'c' if at_line_start => self.skip_line()?,
                b'p'
                    if at_line_start
                        && self.header.is_none()
                        && self.clause_count == 0
                        && self.clause.is_empty() =>
                {
                    self.read_header()?
                }
                _ => return Ok(Some(byte)),
            }
        }
    }

    fn skip_line(&mut self) -> Result<(), io::Error> {
        while let Some((byte, _)) = self.next_byte()? {
            if byte == b'\n' {
                break;
            }
        }
        Ok(())
    }

    /// Read a signed integer token whose first byte has already been
    /// consumed.
    ///
    /// The token must be followed by whitespace or the end of the input.
    fn read_number(&mut self, first: u8) -> Result<isize, ParserError> {
        let negative = first == b'-';

        let mut value = if negative {
            match self.next_byte()? {
                Some((byte @ b'0'..=b'9', _)) => (byte - b'0') as usize,
                Some((byte, _)) => {
                    return Err(ParserError::UnexpectedChar {
                        line: self.line,
                        unexpected: byte as char,
                    })
                }
                None => return Err(ParserError::UnterminatedClause { line: self.line }),
            }
        } else {
            match first {
                b'0'..=b'9' => (first - b'0') as usize,
                _ => {
                    return Err(ParserError::UnexpectedChar {
                        line: self.line,
                        unexpected: first as char,
                    })
                }
            }
        };

        loop {
            match self.next_byte()? {
                Some((byte @ b'0'..=b'9', _)) => {
                    value = value * 10 + (byte - b'0') as usize;
                    if value > Var::max_count() {
                        return Err(ParserError::LiteralTooLarge { line: self.line });
                    }
                }
                Some((byte, _)) if is_space(byte) => break,
                Some((byte, _)) => {
                    return Err(ParserError::UnexpectedChar {
                        line: self.line,
                        unexpected: byte as char,
                    })
                }
                None => break,
            }
        }

        Ok(if negative {
            -(value as isize)
        } else {
            value as isize
        })
    }

    /// Parse the rest of a `p cnf <vars> <clauses>` line. The leading `p`
    /// has already been consumed.
    fn read_header(&mut self) -> Result<(), ParserError> {
        let line = self.line;

        let mut rest = vec![];
        while let Some((byte, _)) = self.next_byte()? {
            if byte == b'\n' {
                break;
            }
            rest.push(byte);
        }

        let separated = rest.first() == Some(&b' ') || rest.first() == Some(&b'\t');
        if !separated {
            return Err(ParserError::InvalidHeader { line });
        }

        let text = String::from_utf8_lossy(&rest);
        let mut fields = text.split_whitespace();

        if fields.next() != Some("cnf") {
            return Err(ParserError::InvalidHeader { line });
        }

        let var_count: usize = match fields.next().and_then(|field| field.parse().ok()) {
            Some(value) => value,
            None => return Err(ParserError::InvalidHeader { line }),
        };

        if var_count > Var::max_count() {
            return Err(ParserError::LiteralTooLarge { line });
        }

        let clause_count: usize = match fields.next().and_then(|field| field.parse().ok()) {
            Some(value) => value,
            None => return Err(ParserError::InvalidHeader { line }),
        };

        if fields.next().is_some() {
            return Err(ParserError::InvalidHeader { line });
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        Ok(())
    }

    /// Compare what was parsed against the header counts, if any.
    fn check_header(&self) -> Result<(), ParserError> {
        if let Some(header) = self.header {
            if self.max_var > header.var_count {
                return Err(ParserError::VarCount {
                    var: self.max_var,
                    header_var_count: header.var_count,
                });
            }

            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }

        Ok(())
    }
}

fn is_space(byte: u8) -> bool {
    byte == b' ' || byte == b'\t' || byte == b'\r' || byte == b'\n'
}

/// Write a formula as DIMACS CNF, header included.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    writeln!(target, "p cnf {} {}", formula.var_count(), formula.len())?;
    write_dimacs_clauses(target, formula.iter())
}

/// Write clauses as zero-terminated literal lines.
///
/// Without a preceding header this is the textual RUP proof format.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses {
        for lit in clause {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::{test_runner::TestCaseError, *};

    use rupcheck_formula::{cnf::strategy::*, cnf_formula, lits};

    fn parse(input: &str) -> Result<CnfFormula, ParserError> {
        DimacsParser::parse(input.as_bytes())
    }

    #[test]
    fn odd_whitespace() {
        let parsed =
            parse("p  cnf  4   3  \n  1  \n 2  3\n0 -4 0 2\nccomment  \n\n0\n\n").unwrap();

        let expected = cnf_formula![
            1, 2, 3;
            -4;
            2;
        ];

        assert_eq!(parsed, expected);
    }

    #[test]
    fn headerless_proof_stream() {
        let parsed = parse("3 0\n-1 -2 0\n0\n").unwrap();

        let expected = cnf_formula![
            3;
            -1, -2;
            ;
        ];

        assert_eq!(parsed, expected);
    }

    #[test]
    fn clause_by_clause() {
        let mut parser = DimacsParser::new(&b"1 -2 0 0\nc done\n"[..]);

        assert_eq!(parser.next_clause().unwrap(), Some(&lits![1, -2][..]));
        assert_eq!(parser.next_clause().unwrap(), Some(&[][..]));
        assert_eq!(parser.next_clause().unwrap(), None);
        // stays exhausted
        assert_eq!(parser.next_clause().unwrap(), None);
        assert_eq!(parser.clause_count(), 2);
        assert_eq!(parser.var_count(), 2);
    }

    #[test]
    fn invalid_headers() {
        assert!(matches!(
            parse("pcnf 1 3"),
            Err(ParserError::InvalidHeader { .. })
        ));
        assert!(matches!(
            parse("p notcnf 1 3"),
            Err(ParserError::InvalidHeader { .. })
        ));
        assert!(matches!(
            parse("p cnf 1"),
            Err(ParserError::InvalidHeader { .. })
        ));
        assert!(matches!(
            parse("p cnf 1 2 3"),
            Err(ParserError::InvalidHeader { .. })
        ));
        assert!(matches!(
            parse("p cnf foo bar"),
            Err(ParserError::InvalidHeader { .. })
        ));
        assert!(matches!(
            parse("p cnf -3 -6"),
            Err(ParserError::InvalidHeader { .. })
        ));
        assert!(matches!(
            parse("p cnf 4 18446744073709551616"),
            Err(ParserError::InvalidHeader { .. })
        ));

        assert!(matches!(
            parse(&format!("p cnf {} 4", Var::max_var().to_dimacs() + 1)),
            Err(ParserError::LiteralTooLarge { .. })
        ));
        parse(&format!("p cnf {} 0", Var::max_var().to_dimacs())).unwrap();

        // a second header is not recognized as one
        assert!(matches!(
            parse("p cnf 1 2\np cnf 1 2\n"),
            Err(ParserError::UnexpectedChar { unexpected: 'p', .. })
        ));
    }

    #[test]
    fn header_count_mismatches() {
        assert!(matches!(
            parse("p cnf 1 1\n 2 0"),
            Err(ParserError::VarCount {
                var: 2,
                header_var_count: 1,
            })
        ));

        assert!(matches!(
            parse("p cnf 10 1\n 1 0 0"),
            Err(ParserError::ClauseCount {
                clause_count: 2,
                header_clause_count: 1,
            })
        ));

        assert!(matches!(
            parse("p cnf 10 4\n 1 0"),
            Err(ParserError::ClauseCount {
                clause_count: 1,
                header_clause_count: 4,
            })
        ));
    }

    #[test]
    fn syntax_errors() {
        assert!(matches!(
            parse("1 2 ?foo"),
            Err(ParserError::UnexpectedChar { unexpected: '?', .. })
        ));
        assert!(matches!(
            parse("1 2 - 3 0"),
            Err(ParserError::UnexpectedChar { unexpected: ' ', .. })
        ));
        assert!(matches!(
            parse("1 2 -\n3 0"),
            Err(ParserError::UnexpectedChar { unexpected: '\n', .. })
        ));
        assert!(matches!(
            parse("1 2 --3 0"),
            Err(ParserError::UnexpectedChar { unexpected: '-', .. })
        ));
        assert!(matches!(
            parse("1 2-3 0"),
            Err(ParserError::UnexpectedChar { unexpected: '-', .. })
        ));
    }

    #[test]
    fn unterminated_clause() {
        assert!(matches!(
            parse("1 2 3"),
            Err(ParserError::UnterminatedClause { .. })
        ));
        assert!(matches!(
            parse("1 2 -"),
            Err(ParserError::UnterminatedClause { .. })
        ));
    }

    #[test]
    fn literal_too_large() {
        assert!(matches!(
            parse(&format!("1 {} 2 0", Var::max_var().to_dimacs() + 1)),
            Err(ParserError::LiteralTooLarge { .. })
        ));

        assert_eq!(
            parse(&format!("1 {} 2 0", Var::max_var().to_dimacs())).unwrap(),
            cnf_formula![
                1, Var::max_var().to_dimacs(), 2;
            ]
        );
    }

    #[test]
    fn error_lines_are_reported() {
        assert!(matches!(
            parse("1 0\n2 0\nx 0\n"),
            Err(ParserError::UnexpectedChar { line: 3, .. })
        ));
    }

    proptest! {

        #[test]
        fn roundtrip(input in cnf_formula(1..100usize, 0..1000, 0..10)) {
            let mut buf = vec![];

            write_dimacs(&mut buf, &input)?;

            let parsed = DimacsParser::parse(&buf[..]).map_err(|e| TestCaseError::fail(e.to_string()))?;

            prop_assert_eq!(parsed, input);
        }
    }
}
