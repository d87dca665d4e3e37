//! Validation of explicit reorder permutations.

use std::collections::{HashMap, HashSet};

use crate::error::{ParseError, PermutationDefect, PlanError};
use crate::model::Operation;

/// Resolve `requested` against the current `(number, heading line)` pairs.
///
/// Returns, for each new position, the index of the element that moves
/// there. The permutation must name every current number exactly once;
/// defects are reported in the order unknown, duplicate, missing.
pub(super) fn resolve(
    op: Operation,
    scope: &str,
    current: &[(u32, usize)],
    requested: &[u32],
) -> Result<Vec<usize>, PlanError> {
    let mut index: HashMap<u32, usize> = HashMap::with_capacity(current.len());
    for (idx, (number, line)) in current.iter().enumerate() {
        if index.insert(*number, idx).is_some() {
            return Err(PlanError::parse(
                op,
                ParseError::new(
                    *line,
                    format!("{scope}: number {number} appears more than once; repair numbering first"),
                ),
            ));
        }
    }

    let invalid = |defect| PlanError::InvalidPermutation {
        op,
        scope: scope.to_owned(),
        defect,
    };

    let mut unknown = Vec::new();
    for n in requested {
        if !index.contains_key(n) && !unknown.contains(n) {
            unknown.push(*n);
        }
    }
    if !unknown.is_empty() {
        return Err(invalid(PermutationDefect::Unknown(unknown)));
    }

    let mut seen = HashSet::new();
    let mut duplicate = Vec::new();
    for n in requested {
        if !seen.insert(*n) && !duplicate.contains(n) {
            duplicate.push(*n);
        }
    }
    if !duplicate.is_empty() {
        return Err(invalid(PermutationDefect::Duplicate(duplicate)));
    }

    let missing: Vec<u32> = current
        .iter()
        .map(|(n, _)| *n)
        .filter(|n| !seen.contains(n))
        .collect();
    if !missing.is_empty() {
        return Err(invalid(PermutationDefect::Missing(missing)));
    }

    Ok(requested.iter().map(|n| index[n]).collect())
}

/// Rearrange `items` so that position `i` holds the old `items[order[i]]`.
pub(super) fn apply<T>(items: &mut Vec<T>, order: &[usize]) {
    let mut slots: Vec<Option<T>> = items.drain(..).map(Some).collect();
    for &idx in order {
        if let Some(item) = slots[idx].take() {
            items.push(item);
        }
    }
}
