//! Ordered entry collection.
//!
//! The last-ran marker is a flag on each entry. Every mutation that touches
//! it goes through [`EntryList::mark_last_ran`] or
//! [`EntryList::clear_last_ran`], so at most one entry carries it.

use platswap_model::Entry;
use tracing::warn;

use crate::EngineError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryList {
    entries: Vec<Entry>,
}

impl EntryList {
    /// Wraps entries loaded from disk.
    ///
    /// A hand-edited file may flag more than one entry; the first flagged
    /// entry keeps the marker.
    pub fn from_loaded(mut entries: Vec<Entry>) -> Self {
        let mut seen = false;
        for entry in &mut entries {
            if entry.was_last_ran {
                if seen {
                    warn!(entry = %entry, "more than one entry marked as last ran, clearing");
                    entry.was_last_ran = false;
                }
                seen = true;
            }
        }
        Self { entries }
    }

    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn last_ran_index(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.was_last_ran)
    }

    pub fn last_ran(&self) -> Option<&Entry> {
        self.entries.iter().find(|e| e.was_last_ran)
    }

    /// Returns true if the last-ran entry uses `platform`.
    pub fn platform_matches_last_ran(&self, platform: &str) -> bool {
        self.last_ran()
            .is_some_and(|e| e.platform.eq_ignore_ascii_case(platform))
    }

    /// Returns true if an entry other than `exclude` has this platform and
    /// label.
    pub fn contains(&self, platform: &str, label: Option<&str>, exclude: Option<usize>) -> bool {
        self.entries
            .iter()
            .enumerate()
            .any(|(i, e)| Some(i) != exclude && e.is(platform, label))
    }

    /// Appends a validated, unique entry. The new entry is never last-ran.
    pub fn push(&mut self, mut entry: Entry) -> Result<usize, EngineError> {
        if let Some(reason) = entry.invalid_reason() {
            return Err(EngineError::InvalidEntry(reason));
        }
        if self.contains(&entry.platform, entry.label.as_deref(), None) {
            return Err(EngineError::DuplicateEntry(entry.to_string()));
        }
        entry.was_last_ran = false;
        self.entries.push(entry);
        Ok(self.entries.len() - 1)
    }

    /// Appends a copy of the entry at `index` with its platform left empty,
    /// to be filled in by an edit.
    pub fn copy(&mut self, index: usize) -> Result<usize, EngineError> {
        let source = self.get(index).ok_or(EngineError::NoSuchEntry(index))?;
        let copy = Entry {
            platform: String::new(),
            label: source.label.clone(),
            launcher: source.launcher.clone(),
            flags: source.flags.clone(),
            was_last_ran: false,
        };
        self.entries.push(copy);
        Ok(self.entries.len() - 1)
    }

    pub fn remove(&mut self, index: usize) -> Result<Entry, EngineError> {
        if index >= self.entries.len() {
            return Err(EngineError::NoSuchEntry(index));
        }
        Ok(self.entries.remove(index))
    }

    /// Overwrites the entry at `index` as-is; flag consistency is the
    /// caller's job.
    pub(crate) fn replace(&mut self, index: usize, entry: Entry) -> Result<(), EngineError> {
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(EngineError::NoSuchEntry(index))?;
        *slot = entry;
        Ok(())
    }

    /// Swaps the entry with its predecessor. Returns false at the top.
    pub fn move_up(&mut self, index: usize) -> Result<bool, EngineError> {
        self.check(index)?;
        if index == 0 {
            return Ok(false);
        }
        self.entries.swap(index - 1, index);
        Ok(true)
    }

    /// Swaps the entry with its successor. Returns false at the bottom.
    pub fn move_down(&mut self, index: usize) -> Result<bool, EngineError> {
        self.check(index)?;
        if index + 1 == self.entries.len() {
            return Ok(false);
        }
        self.entries.swap(index, index + 1);
        Ok(true)
    }

    /// Moves the entry at `source` so that it lands before the entry that is
    /// currently at `target`. `target == len()` moves it to the end.
    ///
    /// Returns false when the entry would end up where it already is.
    pub fn move_entry(&mut self, source: usize, target: usize) -> Result<bool, EngineError> {
        self.check(source)?;
        if target > self.entries.len() {
            return Err(EngineError::NoSuchEntry(target));
        }
        if target == source || target == source + 1 {
            return Ok(false);
        }
        let entry = self.entries.remove(source);
        let insert_at = if source < target { target - 1 } else { target };
        self.entries.insert(insert_at, entry);
        Ok(true)
    }

    /// Makes `index` the only last-ran entry.
    pub fn mark_last_ran(&mut self, index: usize) -> Result<(), EngineError> {
        self.check(index)?;
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.was_last_ran = i == index;
        }
        Ok(())
    }

    /// Clears the last-ran marker everywhere.
    pub fn clear_last_ran(&mut self) {
        for entry in &mut self.entries {
            entry.was_last_ran = false;
        }
    }

    /// Renames `old` to `new` on every entry using platform `old`.
    pub fn rename_platform(&mut self, old: &str, new: &str) -> usize {
        let mut renamed = 0;
        for entry in &mut self.entries {
            if entry.platform.eq_ignore_ascii_case(old) {
                entry.platform = new.to_string();
                renamed += 1;
            }
        }
        renamed
    }

    /// Renames label `old` to `new` on every entry of `platform`.
    pub fn rename_label(&mut self, platform: &str, old: Option<&str>, new: Option<&str>) -> usize {
        let mut renamed = 0;
        for entry in &mut self.entries {
            if entry.is(platform, old) {
                entry.label = new.map(str::to_string);
                renamed += 1;
            }
        }
        renamed
    }

    fn check(&self, index: usize) -> Result<(), EngineError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(EngineError::NoSuchEntry(index))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(platform: &str, label: Option<&str>) -> Entry {
        Entry::new(platform, label, "Game.exe", "")
    }

    fn platforms(list: &EntryList) -> Vec<&str> {
        list.iter().map(|e| e.platform.as_str()).collect()
    }

    fn abcd() -> EntryList {
        EntryList::from_loaded(vec![
            entry("A", None),
            entry("B", None),
            entry("C", None),
            entry("D", None),
        ])
    }

    #[test]
    fn from_loaded_keeps_first_last_ran() {
        let mut a = entry("A", None);
        let mut b = entry("B", None);
        a.was_last_ran = true;
        b.was_last_ran = true;
        let list = EntryList::from_loaded(vec![a, b]);
        assert_eq!(list.last_ran_index(), Some(0));
        assert_eq!(list.iter().filter(|e| e.was_last_ran).count(), 1);
    }

    #[test]
    fn push_rejects_invalid_and_duplicates() {
        let mut list = EntryList::default();
        list.push(entry("LOD", Some("Hardcore"))).unwrap();

        assert!(matches!(
            list.push(entry("lod", Some("HARDCORE"))),
            Err(EngineError::DuplicateEntry(_))
        ));
        assert!(matches!(
            list.push(entry("", None)),
            Err(EngineError::InvalidEntry(_))
        ));
        assert!(matches!(
            list.push(entry("Bad:Name", None)),
            Err(EngineError::InvalidEntry(_))
        ));
        // Same platform, different label is fine.
        assert_eq!(list.push(entry("LOD", Some("Softcore"))).unwrap(), 1);
    }

    #[test]
    fn push_never_adds_a_second_last_ran() {
        let mut list = EntryList::default();
        let mut flagged = entry("A", None);
        flagged.was_last_ran = true;
        list.push(flagged).unwrap();
        assert_eq!(list.last_ran_index(), None);
    }

    #[test]
    fn copy_clears_platform_and_flag() {
        let mut list = EntryList::default();
        let mut source = Entry::new("LOD", Some("Hardcore"), "Game.exe", "-w");
        source.was_last_ran = true;
        list.entries.push(source);

        let index = list.copy(0).unwrap();
        let copy = list.get(index).unwrap();
        assert_eq!(copy.platform, "");
        assert_eq!(copy.label.as_deref(), Some("Hardcore"));
        assert_eq!(copy.flags, "-w");
        assert!(!copy.was_last_ran);
        assert_eq!(list.last_ran_index(), Some(0));
    }

    #[test]
    fn move_up_and_down_stop_at_edges() {
        let mut list = abcd();
        assert!(!list.move_up(0).unwrap());
        assert!(list.move_up(2).unwrap());
        assert_eq!(platforms(&list), ["A", "C", "B", "D"]);
        assert!(!list.move_down(3).unwrap());
        assert!(list.move_down(0).unwrap());
        assert_eq!(platforms(&list), ["C", "A", "B", "D"]);
        assert!(matches!(list.move_up(9), Err(EngineError::NoSuchEntry(9))));
    }

    #[test]
    fn move_entry_inserts_before_target() {
        let mut list = abcd();
        assert!(list.move_entry(0, 2).unwrap());
        assert_eq!(platforms(&list), ["B", "A", "C", "D"]);

        let mut list = abcd();
        assert!(list.move_entry(3, 1).unwrap());
        assert_eq!(platforms(&list), ["A", "D", "B", "C"]);

        let mut list = abcd();
        assert!(list.move_entry(1, 4).unwrap());
        assert_eq!(platforms(&list), ["A", "C", "D", "B"]);
    }

    #[test]
    fn move_entry_to_same_slot_is_noop() {
        let mut list = abcd();
        assert!(!list.move_entry(1, 1).unwrap());
        assert!(!list.move_entry(1, 2).unwrap());
        assert_eq!(platforms(&list), ["A", "B", "C", "D"]);
        assert!(list.move_entry(1, 5).is_err());
    }

    #[test]
    fn mark_last_ran_is_exclusive() {
        let mut list = abcd();
        list.mark_last_ran(1).unwrap();
        list.mark_last_ran(3).unwrap();
        assert_eq!(list.last_ran_index(), Some(3));
        assert_eq!(list.iter().filter(|e| e.was_last_ran).count(), 1);
        assert!(list.platform_matches_last_ran("d"));
        assert!(!list.platform_matches_last_ran("A"));

        list.clear_last_ran();
        assert_eq!(list.last_ran(), None);
    }

    #[test]
    fn rename_platform_cascades() {
        let mut list = EntryList::from_loaded(vec![
            entry("LOD", Some("Hardcore")),
            entry("lod", Some("Softcore")),
            entry("Classic", None),
        ]);
        assert_eq!(list.rename_platform("LOD", "LOD114"), 2);
        assert_eq!(platforms(&list), ["LOD114", "LOD114", "Classic"]);
    }

    #[test]
    fn rename_label_only_within_platform() {
        let mut list = EntryList::from_loaded(vec![
            Entry::new("LOD", Some("Hardcore"), "Game.exe", "-w"),
            Entry::new("LOD", Some("hardcore"), "Game.exe", "-3dfx"),
            entry("Classic", Some("Hardcore")),
        ]);
        assert_eq!(list.rename_label("LOD", Some("Hardcore"), Some("HC")), 2);
        assert_eq!(list.get(0).unwrap().label.as_deref(), Some("HC"));
        assert_eq!(list.get(1).unwrap().label.as_deref(), Some("HC"));
        assert_eq!(list.get(2).unwrap().label.as_deref(), Some("Hardcore"));
    }
}
