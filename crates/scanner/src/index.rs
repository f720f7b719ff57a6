#![forbid(unsafe_code)]

use crate::domain::Pid;
use std::collections::HashSet;

/// Result of comparing a process table snapshot with the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub new: Vec<Pid>,
    pub exited: Vec<Pid>,
}

/// Process ids seen by the last completed scan.
///
/// Owned by a single scan loop. The set is only ever replaced as a whole, so
/// an abandoned scan leaves the previous snapshot intact.
#[derive(Debug, Default)]
pub struct ProcessIndex {
    known: HashSet<Pid>,
    seeded: bool,
}

impl ProcessIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether at least one snapshot has been committed.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.known.contains(&pid)
    }

    pub fn diff(&self, current: &HashSet<Pid>) -> Diff {
        let mut new: Vec<Pid> = current.difference(&self.known).copied().collect();
        let mut exited: Vec<Pid> = self.known.difference(current).copied().collect();
        new.sort_unstable();
        exited.sort_unstable();
        Diff { new, exited }
    }

    pub fn commit(&mut self, current: HashSet<Pid>) {
        self.known = current;
        self.seeded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(pids: &[Pid]) -> HashSet<Pid> {
        pids.iter().copied().collect()
    }

    #[test]
    fn first_snapshot_is_all_new() {
        let index = ProcessIndex::new();
        assert!(!index.is_seeded());
        let diff = index.diff(&set(&[3, 1, 2]));
        assert_eq!(diff.new, vec![1, 2, 3]);
        assert!(diff.exited.is_empty());
    }

    #[test]
    fn reused_pid_is_new_again() {
        let mut index = ProcessIndex::new();
        index.commit(set(&[1, 100]));
        assert!(index.is_seeded());

        let current = set(&[1]);
        assert_eq!(index.diff(&current).exited, vec![100]);
        index.commit(current);

        let diff = index.diff(&set(&[1, 100]));
        assert_eq!(diff.new, vec![100]);
    }

    proptest! {
        #[test]
        fn diff_is_set_difference(
            previous in prop::collection::hash_set(0u32..512, 0..128),
            current in prop::collection::hash_set(0u32..512, 0..128),
        ) {
            let mut index = ProcessIndex::new();
            index.commit(previous.clone());
            let diff = index.diff(&current);

            let new: HashSet<Pid> = diff.new.iter().copied().collect();
            let exited: HashSet<Pid> = diff.exited.iter().copied().collect();
            let expected_new: HashSet<Pid> = current.difference(&previous).copied().collect();
            let expected_exited: HashSet<Pid> = previous.difference(&current).copied().collect();
            prop_assert_eq!(new.len(), diff.new.len());
            prop_assert_eq!(new, expected_new);
            prop_assert_eq!(exited, expected_exited);

            index.commit(current.clone());
            let again = index.diff(&current);
            prop_assert!(again.new.is_empty());
            prop_assert!(again.exited.is_empty());
        }
    }
}
