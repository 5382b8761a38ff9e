//! Bridge from elaborated source patterns to the analyzer lattice.

use rill_ir::Pat;

use crate::usefulness::{
    check_usefulness, exhaustive, Con, EnumSigs, InfCon, Overlap, Pattern,
};

/// Lower one source pattern. Variables bind, so they analyze as wildcards.
pub fn lower_pat(p: &Pat) -> Pattern {
    match p {
        Pat::Var(_) | Pat::Wild => Pattern::Wild,
        Pat::LInt(n) => Pattern::tag(Con::Inf(InfCon::Int(*n))),
        Pat::LDouble(d) => Pattern::tag(Con::Inf(InfCon::Double(*d))),
        Pat::LHex(w) => Pattern::tag(Con::Inf(InfCon::Word(*w))),
        Pat::LText(s) => Pattern::tag(Con::Inf(InfCon::Text(s.clone()))),
        Pat::Enum { hash, tag } => Pattern::tag(Con::Enum {
            owner: *hash,
            tag: tag.clone(),
        }),
        Pat::One(inner) => Pattern::con(Con::One, vec![lower_pat(inner)]),
        Pat::Empty => Pattern::tag(Con::Empty),
        Pat::Tuple(ps) => Pattern::con(Con::Tuple(ps.len()), ps.iter().map(lower_pat).collect()),
    }
}

/// Coverage report for one `match` expression.
#[derive(Clone, Debug)]
pub struct CaseReport {
    /// A pattern no arm matches, if the arms are not exhaustive.
    pub missing: Option<Pattern>,
    /// Arms shadowed by earlier arms.
    pub redundant: Vec<Overlap>,
}

/// Check the arms of a `match` for exhaustiveness and redundancy.
pub fn check_case(sigs: &EnumSigs, arms: &[Pat]) -> CaseReport {
    let matrix: Vec<Vec<Pattern>> = arms.iter().map(|p| vec![lower_pat(p)]).collect();
    let missing =
        exhaustive(sigs, &matrix, 1).map(|v| v.into_iter().next().unwrap_or(Pattern::Wild));
    CaseReport {
        missing,
        redundant: check_usefulness(sigs, &matrix),
    }
}
