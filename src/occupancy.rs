use std::collections::{BTreeMap, BTreeSet};

use crate::{agent::AgentId, grid::Loc};

static NO_OCCUPANTS: BTreeSet<AgentId> = BTreeSet::new();

/// Location -> set of agents currently on it. Each agent id is stored under
/// exactly one location, its current one. Locations whose set becomes empty
/// are dropped, so two indexes holding the same placements compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyIndex {
    cells: BTreeMap<Loc, BTreeSet<AgentId>>,
}

impl OccupancyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agents at `loc`; empty when nobody is there.
    pub fn occupants_at(&self, loc: Loc) -> &BTreeSet<AgentId> {
        self.cells.get(&loc).unwrap_or(&NO_OCCUPANTS)
    }

    pub fn count_at(&self, loc: Loc) -> usize {
        self.occupants_at(loc).len()
    }

    /// Returns the set stored for `loc`, creating an empty one first if
    /// the location has never been occupied.
    pub fn occupants_at_mut(&mut self, loc: Loc) -> &mut BTreeSet<AgentId> {
        self.cells.entry(loc).or_default()
    }

    pub fn insert(&mut self, agent: AgentId, loc: Loc) {
        self.occupants_at_mut(loc).insert(agent);
    }

    /// Discards `agent` from `loc`. Absent ids are ignored.
    pub fn discard(&mut self, agent: AgentId, loc: Loc) {
        if let Some(set) = self.cells.get_mut(&loc) {
            set.remove(&agent);
            if set.is_empty() {
                self.cells.remove(&loc);
            }
        }
    }

    /// Moves `agent` from `old` to `new`.
    pub fn move_agent(&mut self, agent: AgentId, old: Loc, new: Loc) {
        self.insert(agent, new);
        if old != new {
            self.discard(agent, old);
        }
    }

    /// Sum of set sizes across all locations.
    pub fn total_occupants(&self) -> usize {
        self.cells.values().map(BTreeSet::len).sum()
    }

    pub fn occupied_locations(&self) -> impl Iterator<Item = Loc> + '_ {
        self.cells.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Loc, &BTreeSet<AgentId>)> + '_ {
        self.cells.iter().map(|(loc, set)| (*loc, set))
    }

    /// Location currently holding `agent`, found by scanning the index.
    pub fn locate(&self, agent: AgentId) -> Option<Loc> {
        self.cells
            .iter()
            .find(|(_, set)| set.contains(&agent))
            .map(|(loc, _)| *loc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> AgentId {
        AgentId::new(raw)
    }

    #[test]
    fn unknown_location_has_no_occupants() {
        let index = OccupancyIndex::new();
        assert!(index.occupants_at(Loc::new(3, 4)).is_empty());
        assert_eq!(index.occupied_locations().count(), 0);
    }

    #[test]
    fn reading_does_not_create_entries() {
        let index = OccupancyIndex::new();
        let _ = index.occupants_at(Loc::new(0, 0));
        assert_eq!(index, OccupancyIndex::new());
    }

    #[test]
    fn move_transfers_membership() {
        let mut index = OccupancyIndex::new();
        let (a, b) = (Loc::new(0, 0), Loc::new(2, 1));
        index.insert(id(0), a);
        index.insert(id(1), a);

        index.move_agent(id(0), a, b);

        assert!(!index.occupants_at(a).contains(&id(0)));
        assert!(index.occupants_at(b).contains(&id(0)));
        assert!(index.occupants_at(a).contains(&id(1)));
        assert_eq!(index.total_occupants(), 2);
    }

    #[test]
    fn discarding_an_absent_id_is_a_no_op() {
        let mut index = OccupancyIndex::new();
        index.insert(id(4), Loc::new(1, 1));
        let before = index.clone();

        index.discard(id(9), Loc::new(1, 1));
        index.discard(id(4), Loc::new(5, 5));

        assert_eq!(index, before);
    }

    #[test]
    fn move_to_same_location_keeps_agent() {
        let mut index = OccupancyIndex::new();
        let loc = Loc::new(1, 2);
        index.insert(id(3), loc);
        index.move_agent(id(3), loc, loc);
        assert!(index.occupants_at(loc).contains(&id(3)));
        assert_eq!(index.total_occupants(), 1);
    }

    #[test]
    fn sequence_of_moves_conserves_agents() {
        let mut index = OccupancyIndex::new();
        let mut locs: Vec<Loc> = (0..20).map(|i| Loc::new(i % 4, i % 5)).collect();
        for (raw, loc) in locs.iter().enumerate() {
            index.insert(id(raw as u32), *loc);
        }
        for step in 0..200usize {
            let raw = step * 7 % locs.len();
            let new = Loc::new(step % 6, step % 3);
            index.move_agent(id(raw as u32), locs[raw], new);
            locs[raw] = new;
            assert_eq!(index.total_occupants(), 20);
        }
        for (raw, loc) in locs.iter().enumerate() {
            assert_eq!(index.locate(id(raw as u32)), Some(*loc));
        }
    }

    #[test]
    fn emptied_locations_are_pruned() {
        let mut index = OccupancyIndex::new();
        index.insert(id(0), Loc::new(0, 0));
        index.move_agent(id(0), Loc::new(0, 0), Loc::new(0, 1));
        assert_eq!(
            index.occupied_locations().collect::<Vec<_>>(),
            vec![Loc::new(0, 1)]
        );
    }
}
