//! The usefulness decision procedure and its derived checks.
//!
//! A row is *useful* relative to the rows above it when some value matches
//! it and none of them. Exhaustiveness is usefulness of the all-wildcard
//! row, refined to synthesize a witness; redundancy is non-usefulness of a
//! row against its prefix.
//!
//! Every recursion decreases the number of rows, the row width, or the
//! residual of an incomplete signature, so the procedure terminates; the
//! successor search for literal domains is bounded by the set of literals
//! actually present in the column.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;

use rill_ir::VCObjectHash;

/// A generalized pattern: a wildcard or a constructor applied to
/// sub-patterns.
#[derive(Clone, PartialEq, Debug)]
pub enum Pattern {
    Wild,
    Con(Con, Vec<Pattern>),
}

impl Pattern {
    pub fn con(c: Con, args: Vec<Pattern>) -> Pattern {
        Pattern::Con(c, args)
    }

    /// A nullary constructor pattern.
    pub fn tag(c: Con) -> Pattern {
        Pattern::Con(c, Vec::new())
    }
}

/// A generalized constructor.
#[derive(Clone, PartialEq, Debug)]
pub enum Con {
    /// `Some _` of the optional type.
    One,
    /// `None` of the optional type.
    Empty,
    /// The tuple constructor of the given arity.
    Tuple(usize),
    /// One tag of the enum whose definition hashes to `owner`.
    Enum { owner: VCObjectHash, tag: String },
    /// A literal of an order-enumerable domain.
    Inf(InfCon),
}

/// A literal element of an "infinite" domain.
#[derive(Clone, PartialEq, Debug)]
pub enum InfCon {
    Int(i64),
    Word(u64),
    Double(f64),
    Text(String),
}

impl Con {
    /// Number of sub-patterns this constructor carries.
    #[inline]
    pub fn arity(&self) -> usize {
        match self {
            Con::One => 1,
            Con::Tuple(n) => *n,
            Con::Empty | Con::Enum { .. } | Con::Inf(_) => 0,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Wild => write!(f, "_"),
            Pattern::Con(Con::One, args) => match args.first() {
                Some(inner @ Pattern::Con(Con::One, _)) => write!(f, "Some ({inner})"),
                Some(inner) => write!(f, "Some {inner}"),
                None => write!(f, "Some _"),
            },
            Pattern::Con(Con::Empty, _) => write!(f, "None"),
            Pattern::Con(Con::Tuple(_), args) => {
                write!(f, "(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
            Pattern::Con(Con::Enum { tag, .. }, _) => write!(f, "#{tag}"),
            Pattern::Con(Con::Inf(i), _) => match i {
                InfCon::Int(n) => write!(f, "{n}"),
                InfCon::Word(w) => write!(f, "0x{w:x}"),
                InfCon::Double(d) => write!(f, "{d}"),
                InfCon::Text(s) => write!(f, "{s:?}"),
            },
        }
    }
}

/// Complete constructor sets for the enums in play, keyed by the owning
/// definition's hash. The analyzer's only context.
#[derive(Clone, Default, Debug)]
pub struct EnumSigs {
    sigs: FxHashMap<VCObjectHash, BTreeSet<String>>,
}

impl EnumSigs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        owner: VCObjectHash,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) {
        self.sigs
            .insert(owner, tags.into_iter().map(Into::into).collect());
    }

    pub fn get(&self, owner: &VCObjectHash) -> Option<&BTreeSet<String>> {
        self.sigs.get(owner)
    }
}

/// Specialize a matrix by constructor `c`: rows headed by `c` shed the
/// head and expose its arguments, wildcard-headed rows expand into
/// `arity(c)` wildcards, and rows headed by other constructors drop out.
pub fn specialize(c: &Con, matrix: &[Vec<Pattern>]) -> Vec<Vec<Pattern>> {
    let mut out = Vec::new();
    for row in matrix {
        // Empty rows are ill-formed; a well-typed matrix never has them.
        let Some((head, tail)) = row.split_first() else {
            continue;
        };
        match head {
            Pattern::Con(c2, args) if c2 == c => {
                let mut new_row = args.clone();
                new_row.extend_from_slice(tail);
                out.push(new_row);
            }
            Pattern::Con(..) => {}
            Pattern::Wild => {
                let mut new_row = vec![Pattern::Wild; c.arity()];
                new_row.extend_from_slice(tail);
                out.push(new_row);
            }
        }
    }
    out
}

/// Drop constructor-headed rows and strip the head wildcard from the rest.
pub fn default_matrix(matrix: &[Vec<Pattern>]) -> Vec<Vec<Pattern>> {
    matrix
        .iter()
        .filter_map(|row| match row.split_first() {
            Some((Pattern::Wild, tail)) => Some(tail.to_vec()),
            _ => None,
        })
        .collect()
}

/// The first column: the head of every row.
pub fn col(matrix: &[Vec<Pattern>]) -> Vec<&Pattern> {
    matrix.iter().filter_map(|row| row.first()).collect()
}

/// The constructors mentioned in the first column, deduplicated in order
/// of first occurrence.
pub fn con_names(matrix: &[Vec<Pattern>]) -> Vec<Con> {
    let mut out: Vec<Con> = Vec::new();
    for head in col(matrix) {
        if let Pattern::Con(c, _) = head {
            if !out.contains(c) {
                out.push(c.clone());
            }
        }
    }
    out
}

/// Whether a constructor set covers its whole type.
#[derive(Clone, PartialEq, Debug)]
pub enum Signature {
    /// The set is complete; splitting on these constructors is exhaustive.
    Complete(Vec<Con>),
    /// The set misses something; the pattern is a witness outside it.
    Incomplete(Pattern),
}

/// Decide completeness of a constructor set and, when incomplete, produce
/// a witness pattern for a value outside it.
pub fn complete_signature(sigs: &EnumSigs, cons: &[Con]) -> Signature {
    let Some(first) = cons.first() else {
        return Signature::Incomplete(Pattern::Wild);
    };
    match first {
        Con::One | Con::Empty => {
            let has_one = cons.contains(&Con::One);
            let has_empty = cons.contains(&Con::Empty);
            if has_one && has_empty {
                Signature::Complete(vec![Con::One, Con::Empty])
            } else if has_one {
                Signature::Incomplete(Pattern::tag(Con::Empty))
            } else {
                Signature::Incomplete(Pattern::con(Con::One, vec![Pattern::Wild]))
            }
        }
        // The tuple constructor is the only one of its type.
        Con::Tuple(n) => Signature::Complete(vec![Con::Tuple(*n)]),
        Con::Enum { owner, .. } => {
            let Some(all) = sigs.get(owner) else {
                // Unknown enum: treat the signature as open.
                return Signature::Incomplete(Pattern::Wild);
            };
            let covered: BTreeSet<&str> = cons
                .iter()
                .filter_map(|c| match c {
                    Con::Enum { owner: o, tag } if o == owner => Some(tag.as_str()),
                    _ => None,
                })
                .collect();
            // BTreeSet iteration gives the lexicographically smallest
            // missing tag as the witness.
            match all.iter().find(|t| !covered.contains(t.as_str())) {
                Some(missing) => Signature::Incomplete(Pattern::tag(Con::Enum {
                    owner: *owner,
                    tag: missing.clone(),
                })),
                None => Signature::Complete(
                    all.iter()
                        .map(|t| Con::Enum {
                            owner: *owner,
                            tag: t.clone(),
                        })
                        .collect(),
                ),
            }
        }
        Con::Inf(seed) => Signature::Incomplete(Pattern::tag(Con::Inf(successor(seed, cons)))),
    }
}

/// Produce a literal outside the encountered set.
///
/// This is a witness generator, not a semantic successor: any value known
/// to be absent will do. Numbers count upward from a fixed seed; text
/// doubles the candidate starting from `"a"`.
fn successor(seed: &InfCon, cons: &[Con]) -> InfCon {
    let present = |cand: &InfCon| cons.iter().any(|c| matches!(c, Con::Inf(i) if i == cand));
    match seed {
        InfCon::Int(n) => {
            let mut next = n.wrapping_add(1);
            while present(&InfCon::Int(next)) {
                next = next.wrapping_add(1);
            }
            InfCon::Int(next)
        }
        InfCon::Word(w) => {
            let mut next = w.wrapping_add(1);
            while present(&InfCon::Word(next)) {
                next = next.wrapping_add(1);
            }
            InfCon::Word(next)
        }
        InfCon::Double(_) => {
            // Counting from zero keeps the candidates distinct regardless
            // of the magnitudes in the column.
            let mut cand = 0.0f64;
            while present(&InfCon::Double(cand)) {
                cand += 1.0;
            }
            InfCon::Double(cand)
        }
        InfCon::Text(_) => {
            let mut cand = "a".to_string();
            while present(&InfCon::Text(cand.clone())) {
                cand = cand.repeat(2);
            }
            InfCon::Text(cand)
        }
    }
}

/// Whether candidate row `q` matches some value no row of `matrix` does.
pub fn is_useful(sigs: &EnumSigs, matrix: &[Vec<Pattern>], q: &[Pattern]) -> bool {
    // An empty matrix covers nothing.
    if matrix.is_empty() {
        return true;
    }
    // Width zero with rows present: everything is covered.
    let Some((head, tail)) = q.split_first() else {
        return false;
    };
    match head {
        Pattern::Con(c, args) => {
            let mut q2 = args.clone();
            q2.extend_from_slice(tail);
            is_useful(sigs, &specialize(c, matrix), &q2)
        }
        Pattern::Wild => {
            let sigma = con_names(matrix);
            match complete_signature(sigs, &sigma) {
                Signature::Complete(cons) => cons.iter().any(|c| {
                    let mut q2 = vec![Pattern::Wild; c.arity()];
                    q2.extend_from_slice(tail);
                    is_useful(sigs, &specialize(c, matrix), &q2)
                }),
                Signature::Incomplete(_) => is_useful(sigs, &default_matrix(matrix), tail),
            }
        }
    }
}

/// Prove `matrix` exhaustive (`None`) or produce a missing pattern vector
/// of the original `width`.
///
/// The witness is built by threading one missing constructor into the
/// inductive position: for complete signatures the failing constructor
/// re-wraps the sub-witness, for incomplete ones the signature's witness
/// is spliced in at the current column.
pub fn exhaustive(sigs: &EnumSigs, matrix: &[Vec<Pattern>], width: usize) -> Option<Vec<Pattern>> {
    if width == 0 {
        return if matrix.is_empty() {
            Some(Vec::new())
        } else {
            None
        };
    }
    let sigma = con_names(matrix);
    match complete_signature(sigs, &sigma) {
        Signature::Complete(cons) => {
            for c in cons {
                let sub = specialize(&c, matrix);
                if let Some(mut w) = exhaustive(sigs, &sub, c.arity() + width - 1) {
                    let rest = w.split_off(c.arity());
                    let mut out = vec![Pattern::Con(c, w)];
                    out.extend(rest);
                    return Some(out);
                }
            }
            None
        }
        Signature::Incomplete(witness) => {
            exhaustive(sigs, &default_matrix(matrix), width - 1).map(|rest| {
                let mut out = vec![witness];
                out.extend(rest);
                out
            })
        }
    }
}

/// A row shadowed by the rows above it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Overlap {
    /// Index of the shadowed row.
    pub row: usize,
    /// Index of the earliest row whose prefix already covers it.
    pub covered_by: usize,
}

/// Report every row that is not useful given the rows before it, with the
/// earliest prefix that covers it.
pub fn check_usefulness(sigs: &EnumSigs, matrix: &[Vec<Pattern>]) -> Vec<Overlap> {
    let mut out = Vec::new();
    for i in 0..matrix.len() {
        if !is_useful(sigs, &matrix[..i], &matrix[i]) {
            let covered_by = (0..i)
                .find(|&j| !is_useful(sigs, &matrix[..=j], &matrix[i]))
                .unwrap_or(0);
            out.push(Overlap {
                row: i,
                covered_by,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wilds(n: usize) -> Vec<Pattern> {
        vec![Pattern::Wild; n]
    }

    fn one_wild() -> Pattern {
        Pattern::con(Con::One, vec![Pattern::Wild])
    }

    fn empty() -> Pattern {
        Pattern::tag(Con::Empty)
    }

    fn bool_tag(b: bool) -> Pattern {
        Pattern::tag(Con::Enum {
            owner: rill_vc::bool_enum_hash(),
            tag: if b { "true" } else { "false" }.into(),
        })
    }

    fn bool_sigs() -> EnumSigs {
        let mut sigs = EnumSigs::new();
        sigs.insert(rill_vc::bool_enum_hash(), ["true", "false"]);
        sigs
    }

    // ── Optionals ─────────────────────────────────────────────────

    #[test]
    fn optional_split_is_exhaustive() {
        let matrix = vec![vec![one_wild()], vec![empty()]];
        assert_eq!(exhaustive(&EnumSigs::new(), &matrix, 1), None);
    }

    #[test]
    fn lone_some_misses_none() {
        let matrix = vec![vec![one_wild()]];
        assert_eq!(
            exhaustive(&EnumSigs::new(), &matrix, 1),
            Some(vec![empty()])
        );
    }

    #[test]
    fn lone_none_misses_some() {
        let matrix = vec![vec![empty()]];
        assert_eq!(
            exhaustive(&EnumSigs::new(), &matrix, 1),
            Some(vec![one_wild()])
        );
    }

    #[test]
    fn nested_optional_witness_wraps() {
        // Some (Some _) and None leave Some None uncovered.
        let matrix = vec![
            vec![Pattern::con(Con::One, vec![one_wild()])],
            vec![empty()],
        ];
        assert_eq!(
            exhaustive(&EnumSigs::new(), &matrix, 1),
            Some(vec![Pattern::con(Con::One, vec![empty()])])
        );
    }

    // ── Enums ─────────────────────────────────────────────────────

    #[test]
    fn duplicate_enum_row_is_redundant() {
        let sigs = bool_sigs();
        let matrix = vec![vec![bool_tag(true)], vec![bool_tag(true)]];
        assert_eq!(
            check_usefulness(&sigs, &matrix),
            vec![Overlap {
                row: 1,
                covered_by: 0
            }]
        );
    }

    #[test]
    fn full_enum_split_is_exhaustive() {
        let sigs = bool_sigs();
        let matrix = vec![vec![bool_tag(true)], vec![bool_tag(false)]];
        assert_eq!(exhaustive(&sigs, &matrix, 1), None);
        assert!(!is_useful(&sigs, &matrix, &wilds(1)));
    }

    #[test]
    fn missing_enum_tag_is_the_witness() {
        let sigs = bool_sigs();
        let matrix = vec![vec![bool_tag(true)]];
        assert_eq!(exhaustive(&sigs, &matrix, 1), Some(vec![bool_tag(false)]));
    }

    #[test]
    fn unknown_enum_owner_is_treated_as_open() {
        let matrix = vec![vec![bool_tag(true)], vec![bool_tag(false)]];
        // Without the signature the split cannot be proven complete.
        assert_eq!(
            exhaustive(&EnumSigs::new(), &matrix, 1),
            Some(vec![Pattern::Wild])
        );
    }

    // ── Tuples ────────────────────────────────────────────────────

    #[test]
    fn tuple_witness_reports_the_failing_component() {
        let sigs = bool_sigs();
        // (#true, _) leaves (#false, _) uncovered.
        let matrix = vec![vec![Pattern::con(
            Con::Tuple(2),
            vec![bool_tag(true), Pattern::Wild],
        )]];
        assert_eq!(
            exhaustive(&sigs, &matrix, 1),
            Some(vec![Pattern::con(
                Con::Tuple(2),
                vec![bool_tag(false), Pattern::Wild]
            )])
        );
    }

    #[test]
    fn wider_matrices_thread_the_remaining_columns() {
        let sigs = bool_sigs();
        let matrix = vec![vec![bool_tag(true), one_wild()]];
        // The first column already misses #false; the remaining columns
        // are filled with wildcards.
        assert_eq!(
            exhaustive(&sigs, &matrix, 2),
            Some(vec![bool_tag(false), Pattern::Wild])
        );

        // Completing the first column pushes the failure into the second.
        let matrix = vec![
            vec![bool_tag(true), one_wild()],
            vec![bool_tag(false), one_wild()],
        ];
        assert_eq!(
            exhaustive(&sigs, &matrix, 2),
            Some(vec![bool_tag(false), empty()])
        );
    }

    // ── Literal domains ───────────────────────────────────────────

    #[test]
    fn int_literals_never_cover() {
        let matrix = vec![vec![Pattern::tag(Con::Inf(InfCon::Int(0)))]];
        assert_eq!(
            exhaustive(&EnumSigs::new(), &matrix, 1),
            Some(vec![Pattern::tag(Con::Inf(InfCon::Int(1)))])
        );
    }

    #[test]
    fn int_witness_skips_encountered_literals() {
        let matrix = vec![
            vec![Pattern::tag(Con::Inf(InfCon::Int(0)))],
            vec![Pattern::tag(Con::Inf(InfCon::Int(1)))],
            vec![Pattern::tag(Con::Inf(InfCon::Int(2)))],
        ];
        assert_eq!(
            exhaustive(&EnumSigs::new(), &matrix, 1),
            Some(vec![Pattern::tag(Con::Inf(InfCon::Int(3)))])
        );
    }

    #[test]
    fn text_witness_doubles_until_fresh() {
        let matrix = vec![
            vec![Pattern::tag(Con::Inf(InfCon::Text("a".into())))],
            vec![Pattern::tag(Con::Inf(InfCon::Text("aa".into())))],
        ];
        assert_eq!(
            exhaustive(&EnumSigs::new(), &matrix, 1),
            Some(vec![Pattern::tag(Con::Inf(InfCon::Text("aaaa".into())))])
        );
    }

    #[test]
    fn literal_rows_with_wildcard_fallback_are_exhaustive() {
        let matrix = vec![
            vec![Pattern::tag(Con::Inf(InfCon::Double(0.0)))],
            vec![Pattern::Wild],
        ];
        assert_eq!(exhaustive(&EnumSigs::new(), &matrix, 1), None);
        assert_eq!(
            check_usefulness(&EnumSigs::new(), &matrix),
            Vec::<Overlap>::new()
        );
    }

    // ── Core invariants ───────────────────────────────────────────

    #[test]
    fn matrix_operations_follow_their_definitions() {
        let matrix = vec![
            vec![one_wild(), Pattern::Wild],
            vec![empty(), one_wild()],
            vec![Pattern::Wild, empty()],
        ];
        assert_eq!(col(&matrix).len(), 3);
        assert_eq!(con_names(&matrix), vec![Con::One, Con::Empty]);

        // Specializing by Some keeps its rows (exposing the argument)
        // and expands wildcard-headed rows.
        assert_eq!(
            specialize(&Con::One, &matrix),
            vec![
                vec![Pattern::Wild, Pattern::Wild],
                vec![Pattern::Wild, empty()],
            ]
        );

        // The default matrix keeps only wildcard-headed rows, beheaded.
        assert_eq!(default_matrix(&matrix), vec![vec![empty()]]);
    }

    #[test]
    fn empty_matrix_is_never_covering() {
        assert!(is_useful(&EnumSigs::new(), &[], &wilds(3)));
    }

    #[test]
    fn exhaustive_agrees_with_wildcard_usefulness() {
        let sigs = bool_sigs();
        let cases: Vec<Vec<Vec<Pattern>>> = vec![
            vec![vec![one_wild()], vec![empty()]],
            vec![vec![one_wild()]],
            vec![vec![bool_tag(true)], vec![bool_tag(false)]],
            vec![vec![bool_tag(true)]],
            vec![vec![Pattern::Wild]],
        ];
        for matrix in cases {
            let width = matrix[0].len();
            assert_eq!(
                exhaustive(&sigs, &matrix, width).is_none(),
                !is_useful(&sigs, &matrix, &wilds(width)),
                "disagreement on {matrix:?}"
            );
        }
    }

    fn arb_opt_pattern() -> impl Strategy<Value = Pattern> {
        prop_oneof![
            Just(Pattern::Wild),
            Just(Pattern::tag(Con::Empty)),
            Just(Pattern::con(Con::One, vec![Pattern::Wild])),
            Just(Pattern::con(
                Con::One,
                vec![Pattern::con(Con::One, vec![Pattern::Wild])]
            )),
            Just(Pattern::con(Con::One, vec![Pattern::tag(Con::Empty)])),
        ]
    }

    proptest! {
        // Adding rows can only turn useful into not-useful.
        #[test]
        fn prop_usefulness_is_antitone_in_the_matrix(
            rows in proptest::collection::vec(arb_opt_pattern(), 0..6),
            extra in arb_opt_pattern(),
            q in arb_opt_pattern(),
        ) {
            let sigs = EnumSigs::new();
            let matrix: Vec<Vec<Pattern>> = rows.into_iter().map(|p| vec![p]).collect();
            let before = is_useful(&sigs, &matrix, &[q.clone()]);
            let mut grown = matrix.clone();
            grown.push(vec![extra]);
            let after = is_useful(&sigs, &grown, &[q]);
            prop_assert!(before || !after);
        }

        #[test]
        fn prop_exhaustive_iff_wildcard_not_useful(
            rows in proptest::collection::vec(arb_opt_pattern(), 0..6),
        ) {
            let sigs = EnumSigs::new();
            let matrix: Vec<Vec<Pattern>> = rows.into_iter().map(|p| vec![p]).collect();
            prop_assert_eq!(
                exhaustive(&sigs, &matrix, 1).is_none(),
                !is_useful(&sigs, &matrix, &[Pattern::Wild])
            );
        }
    }
}
