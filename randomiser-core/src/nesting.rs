use std::collections::HashMap;

use crate::catalog::{Catalog, Entrance, Exit};
use crate::{RandomiserError, Result};

/// Exits placed so far, mapped to the entrance leading into each of them.
pub type ExitsToEntrances<'c> = HashMap<&'c Exit, &'c Entrance>;

/// Outcome of walking a nesting chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainResolution<'c> {
    /// Entrances from the starting one out to its island entrance.
    Complete(Vec<&'c Entrance>),
    /// Some dungeon along the way has not been connected yet.
    Incomplete,
}

impl<'c> ChainResolution<'c> {
    pub fn outermost(&self) -> Option<&'c Entrance> {
        match self {
            ChainResolution::Complete(chain) => chain.last().copied(),
            ChainResolution::Incomplete => None,
        }
    }
}

/// Unrecurses nested dungeons to list every entrance on the way to
/// `entrance`, innermost first.
pub fn resolve_chain<'c>(
    entrance: &'c Entrance,
    done_exits_to_entrances: &ExitsToEntrances<'c>,
    catalog: &'c Catalog,
) -> Result<ChainResolution<'c>> {
    let mut seen: Vec<&'c Entrance> = Vec::new();
    let mut current = entrance;

    while current.is_nested() {
        if seen.contains(&current) {
            let names: Vec<&str> = seen.iter().map(|e| e.entrance_name).collect();
            return Err(RandomiserError::CatalogInvariantViolation(format!(
                "entrances are in an infinite loop: {}",
                names.join(", ")
            )));
        }
        seen.push(current);

        let dungeon_start_exit = catalog.dungeon_exit_for_nested(current).ok_or_else(|| {
            RandomiserError::CatalogInvariantViolation(format!(
                "no dungeon leads to nested entrance {}",
                current.entrance_name
            ))
        })?;

        match done_exits_to_entrances.get(dungeon_start_exit) {
            Some(outer) => current = *outer,
            None => return Ok(ChainResolution::Incomplete),
        }
    }

    seen.push(current);
    Ok(ChainResolution::Complete(seen))
}

/// The island entrance a given entrance is ultimately reached from, or
/// `None` if the chain is not wired up yet.
pub fn resolve_outermost<'c>(
    entrance: &'c Entrance,
    done_exits_to_entrances: &ExitsToEntrances<'c>,
    catalog: &'c Catalog,
) -> Result<Option<&'c Entrance>> {
    Ok(resolve_chain(entrance, done_exits_to_entrances, catalog)?.outermost())
}

pub fn resolve_outermost_for_exit<'c>(
    exit: &'c Exit,
    done_exits_to_entrances: &ExitsToEntrances<'c>,
    catalog: &'c Catalog,
) -> Result<Option<&'c Entrance>> {
    match done_exits_to_entrances.get(exit) {
        Some(entrance) => resolve_outermost(*entrance, done_exits_to_entrances, catalog),
        None => Ok(None),
    }
}
