//! Line-oriented record scanner.
//!
//! Segments a flat sequence of text lines into records. A [`Grammar`]
//! decides which lines start a record and which field rules apply to the
//! lines in between; the scanner owns the state machine:
//!
//! ```text
//! NoRecord ──start──▶ InRecord(r) ──start──▶ seal r, InRecord(r')
//!    ▲                   │  └──field──▶ InRecord(r) (first matching rule)
//!    └──malformed start──┘  seal r
//! ```
//!
//! End of input seals the open record. Field lines seen while in
//! `NoRecord` are ignored, and a failing field rule only records a
//! [`ParseError`]; neither aborts the scan.

use crate::error::ParseError;

/// Outcome of offering a line to a grammar's record-start recognizer.
#[derive(Debug, PartialEq)]
pub enum StartLine<R> {
    /// Not a record-start line.
    No,
    /// A record-start line and the fresh record it opens.
    Record(R),
    /// A record-start line that could not be parsed; the record is dropped.
    Malformed(String),
}

/// One entry of a grammar's field table.
pub struct FieldRule<R> {
    /// Field name used in error reports.
    pub field: &'static str,
    /// Whether this rule claims the (trimmed) line.
    pub matches: fn(&str) -> bool,
    /// Writes the field into the record. An `Err` leaves the field unset.
    pub apply: fn(&str, &mut R) -> Result<(), String>,
}

/// A record grammar: start recognizer, optional context lines, field table.
///
/// `C` carries scan-wide context that outlives single records, such as the
/// interface name announced once before a list of cells.
pub struct Grammar<R: 'static, C = ()> {
    pub name: &'static str,
    /// Consumes lines that only update context. Returns `true` when claimed.
    pub context: fn(&str, &mut C) -> bool,
    /// Recognizes a record-start line. The `usize` is the zero-based index
    /// the new record will have among the sealed records.
    pub start: fn(&str, &C, usize) -> StartLine<R>,
    /// Field rules, tried in order; the first match wins.
    pub rules: &'static [FieldRule<R>],
}

/// Records sealed by one scan, plus the local errors met on the way.
#[derive(Debug)]
pub struct Scan<R> {
    pub records: Vec<R>,
    pub errors: Vec<ParseError>,
}

enum State<R> {
    NoRecord,
    InRecord(R),
}

impl<R> State<R> {
    /// Opens `record`, returning the record it replaces, if any.
    fn begin(self, record: R) -> (Self, Option<R>) {
        (State::InRecord(record), self.finish())
    }

    /// Leaves the current record after an unparseable start line.
    fn abandon(self) -> (Self, Option<R>) {
        (State::NoRecord, self.finish())
    }

    /// Seals the open record, if any.
    fn finish(self) -> Option<R> {
        match self {
            State::NoRecord => None,
            State::InRecord(record) => Some(record),
        }
    }
}

/// Runs `grammar` over `lines`.
///
/// Lines are trimmed before they reach the grammar; blank lines are skipped.
pub fn scan<R, C, I, S>(grammar: &Grammar<R, C>, lines: I) -> Scan<R>
where
    C: Default,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut context = C::default();
    let mut records = Vec::new();
    let mut errors = Vec::new();
    let mut state = State::NoRecord;

    for (idx, raw) in lines.into_iter().enumerate() {
        let number = idx + 1;
        let line = raw.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        if (grammar.context)(line, &mut context) {
            continue;
        }

        let ordinal = records.len() + usize::from(matches!(state, State::InRecord(_)));
        let sealed = match (grammar.start)(line, &context, ordinal) {
            StartLine::Record(record) => {
                let (next, sealed) = state.begin(record);
                state = next;
                sealed
            }
            StartLine::Malformed(reason) => {
                tracing::debug!(grammar = grammar.name, line = number, %reason, "dropping record");
                errors.push(ParseError::malformed_record(number, line, reason));
                let (next, sealed) = state.abandon();
                state = next;
                sealed
            }
            StartLine::No => {
                match &mut state {
                    State::NoRecord => {
                        tracing::trace!(grammar = grammar.name, line = number, "line outside record");
                    }
                    State::InRecord(record) => {
                        apply_rules(grammar, record, number, line, &mut errors);
                    }
                }
                None
            }
        };

        records.extend(sealed);
    }

    records.extend(state.finish());

    tracing::debug!(
        grammar = grammar.name,
        records = records.len(),
        errors = errors.len(),
        "scan complete"
    );

    Scan { records, errors }
}

fn apply_rules<R, C>(
    grammar: &Grammar<R, C>,
    record: &mut R,
    number: usize,
    line: &str,
    errors: &mut Vec<ParseError>,
) {
    let Some(rule) = grammar.rules.iter().find(|rule| (rule.matches)(line)) else {
        return;
    };

    if let Err(reason) = (rule.apply)(line, record) {
        tracing::debug!(
            grammar = grammar.name,
            line = number,
            field = rule.field,
            %reason,
            "field left unset"
        );
        errors.push(ParseError::field(rule.field, number, line, reason));
    }
}

/// A context recognizer for grammars without scan-wide context.
pub fn no_context<C>(_line: &str, _context: &mut C) -> bool {
    false
}
