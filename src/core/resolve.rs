#![forbid(unsafe_code)]

use crate::core::worktree::WorktreeRecord;
use crate::error::WtmuxError;

/// Resolves a user query to exactly one worktree.
///
/// Stages, each tried only when the previous one found nothing:
/// 1. exact match on the full name (`feature/auth`)
/// 2. exact match on the leaf (`auth`)
/// 3. case-sensitive substring of the full name (`au`)
///
/// More than one hit in stage 2 or 3 is an error rather than a guess.
pub fn resolve<'a>(
    query: &str,
    worktrees: &'a [WorktreeRecord],
) -> Result<&'a WorktreeRecord, WtmuxError> {
    if let Some(wt) = worktrees.iter().find(|wt| wt.name() == query) {
        return Ok(wt);
    }

    let leaf_matches: Vec<&WorktreeRecord> =
        worktrees.iter().filter(|wt| wt.leaf() == query).collect();
    if let Some(wt) = single(query, leaf_matches)? {
        return Ok(wt);
    }

    let sub_matches: Vec<&WorktreeRecord> = worktrees
        .iter()
        .filter(|wt| wt.name().contains(query))
        .collect();
    if let Some(wt) = single(query, sub_matches)? {
        return Ok(wt);
    }

    Err(WtmuxError::WorktreeNotFound {
        query: query.to_owned(),
        available: worktrees.to_vec(),
    })
}

fn single<'a>(
    query: &str,
    mut matches: Vec<&'a WorktreeRecord>,
) -> Result<Option<&'a WorktreeRecord>, WtmuxError> {
    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        _ => Err(WtmuxError::AmbiguousWorktree {
            query: query.to_owned(),
            matches: matches.into_iter().cloned().collect(),
        }),
    }
}

/// All worktrees sharing `target`'s leaf, `target` included. More than one
/// entry means tmux windows (keyed by leaf) cannot tell them apart.
#[must_use]
pub fn leaf_collisions<'a>(
    target: &WorktreeRecord,
    worktrees: &'a [WorktreeRecord],
) -> Vec<&'a WorktreeRecord> {
    let leaf = target.leaf();
    worktrees.iter().filter(|wt| wt.leaf() == leaf).collect()
}

/// Errors with [`WtmuxError::LeafCollision`] when `target`'s leaf is shared.
pub fn ensure_unique_leaf(
    target: &WorktreeRecord,
    worktrees: &[WorktreeRecord],
) -> Result<(), WtmuxError> {
    let collisions = leaf_collisions(target, worktrees);
    if collisions.len() > 1 {
        return Err(WtmuxError::LeafCollision {
            leaf: target.leaf(),
            worktrees: collisions.into_iter().cloned().collect(),
        });
    }
    Ok(())
}
