use std::collections::{HashMap, HashSet, VecDeque};
use std::ffi::OsStr;
use std::path::Path;

use tracing::debug;

use crate::reconcile::{Change, ChangeKind, Diff, Entity};

/// `(removed index, added index)` into the raw change list.
type Pairing = (usize, usize);

/// Collapses added/removed pairs of the same entity into moves.
///
/// A removal pairs with the first unclaimed addition sharing its basename, in
/// the order the changes were produced. With several candidates the first one
/// wins; no attempt is made to find the best overall assignment.
///
/// Directories get one more chance: when a parent is left with exactly one
/// removed and one added subdirectory, the two are a rename.
pub fn detect_moves(diff: Diff) -> Diff {
    let changes = diff.into_changes();
    let mut claimed = HashSet::new();

    let mut pairings = pair_by_basename(&changes, Entity::Directory, &mut claimed);
    pairings.extend(pair_sibling_renames(&changes, &mut claimed));
    pairings.extend(pair_by_basename(&changes, Entity::File, &mut claimed));

    let moved = pairings
        .iter()
        .map(|&(removed, added)| {
            let entity = changes[removed].kind.entity();
            debug!(
                "Paired {} {} -> {}",
                entity,
                changes[removed].path1.display(),
                changes[added].path1.display()
            );
            Change::moved(
                entity,
                changes[removed].path1.clone(),
                changes[added].path1.clone(),
            )
        })
        .collect::<Vec<_>>();

    changes
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !claimed.contains(index))
        .map(|(_, change)| change)
        .chain(moved)
        .collect::<Vec<_>>()
        .into()
}

fn pair_by_basename(
    changes: &[Change],
    entity: Entity,
    claimed: &mut HashSet<usize>,
) -> Vec<Pairing> {
    let mut additions: HashMap<&OsStr, VecDeque<usize>> = HashMap::new();
    for (index, change) in unclaimed(changes, ChangeKind::added(entity), claimed) {
        if let Some(name) = change.basename() {
            additions.entry(name).or_default().push_back(index);
        }
    }

    let removals = unclaimed(changes, ChangeKind::removed(entity), claimed).collect::<Vec<_>>();
    let mut pairings = Vec::new();
    for (removed, change) in removals {
        let partner = change
            .basename()
            .and_then(|name| additions.get_mut(name))
            .and_then(VecDeque::pop_front);
        if let Some(added) = partner {
            claimed.extend([removed, added]);
            pairings.push((removed, added));
        }
    }
    pairings
}

fn pair_sibling_renames(changes: &[Change], claimed: &mut HashSet<usize>) -> Vec<Pairing> {
    let mut by_parent: HashMap<&Path, (Vec<usize>, Vec<usize>)> = HashMap::new();
    for (index, change) in unclaimed(changes, ChangeKind::DirectoryRemoved, claimed) {
        if let Some(parent) = change.path1.parent() {
            by_parent.entry(parent).or_default().0.push(index);
        }
    }
    for (index, change) in unclaimed(changes, ChangeKind::DirectoryAdded, claimed) {
        if let Some(entry) = change.path1.parent().and_then(|parent| by_parent.get_mut(parent)) {
            entry.1.push(index);
        }
    }

    let mut pairings = by_parent
        .into_values()
        .filter_map(|(removed, added)| match (removed.as_slice(), added.as_slice()) {
            ([removed], [added]) => Some((*removed, *added)),
            _ => None,
        })
        .collect::<Vec<_>>();
    pairings.sort_unstable();
    for &(removed, added) in &pairings {
        claimed.extend([removed, added]);
    }
    pairings
}

/// Yielded changes borrow from `changes` only, so `claimed` is free to grow
/// once the iterator is dropped.
fn unclaimed<'a, 'c>(
    changes: &'a [Change],
    kind: ChangeKind,
    claimed: &'c HashSet<usize>,
) -> impl Iterator<Item = (usize, &'a Change)> + use<'a, 'c> {
    changes
        .iter()
        .enumerate()
        .filter(move |(index, change)| change.kind == kind && !claimed.contains(index))
}
