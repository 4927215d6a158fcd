// Author: Dustin Pilgrim
// License: MIT

use crate::error::{Result, WaybackError};
use crate::output::OutputRecord;

/// Which record wins when several match a preferred-output descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    First,
    /// Every match overwrites the previous one (historic xwayback behavior).
    #[default]
    Last,
}

/// Outputs in the order the compositor announced them.
#[derive(Debug, Clone, Default)]
pub struct OutputRegistry {
    outputs: Vec<OutputRecord>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record for `handle`. Returns `false` if it already exists.
    pub fn insert(&mut self, handle: u32) -> bool {
        if self.get(handle).is_some() {
            return false;
        }
        self.outputs.push(OutputRecord::new(handle));
        true
    }

    pub fn remove(&mut self, handle: u32) -> Option<OutputRecord> {
        let idx = self.outputs.iter().position(|o| o.handle == handle)?;
        Some(self.outputs.remove(idx))
    }

    pub fn get(&self, handle: u32) -> Option<&OutputRecord> {
        self.outputs.iter().find(|o| o.handle == handle)
    }

    pub fn get_mut(&mut self, handle: u32) -> Option<&mut OutputRecord> {
        self.outputs.iter_mut().find(|o| o.handle == handle)
    }

    pub fn first(&self) -> Option<&OutputRecord> {
        self.outputs.first()
    }

    pub fn by_name(&self, name: &str) -> Option<&OutputRecord> {
        self.outputs.iter().find(|o| o.name.as_deref() == Some(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputRecord> {
        self.outputs.iter()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Picks the output Xwayland should be sized after.
    ///
    /// Without a descriptor this is the first announced output. With one, the
    /// matching record chosen by `policy`; if nothing matches, the first.
    pub fn select(&self, descriptor: Option<&str>, policy: MatchPolicy) -> Result<&OutputRecord> {
        let first = self.first().ok_or(WaybackError::NoDisplaysFound)?;

        let Some(descriptor) = descriptor else {
            return Ok(first);
        };

        Ok(self.find(descriptor, policy).unwrap_or(first))
    }

    /// Matching record for `descriptor` under `policy`, if any.
    pub fn find(&self, descriptor: &str, policy: MatchPolicy) -> Option<&OutputRecord> {
        let mut matches = self.outputs.iter().filter(|o| o.matches(descriptor));
        match policy {
            MatchPolicy::First => matches.next(),
            MatchPolicy::Last => matches.last(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputEvent;

    fn add(reg: &mut OutputRegistry, handle: u32, make: &str, model: &str) {
        reg.insert(handle);
        reg.get_mut(handle).unwrap().apply(OutputEvent::Geometry {
            x: 0,
            y: 0,
            physical_width: 0,
            physical_height: 0,
            subpixel: 0,
            make: make.into(),
            model: model.into(),
            transform: 0,
        });
    }

    fn sample() -> OutputRegistry {
        let mut reg = OutputRegistry::new();
        add(&mut reg, 40, "Acme", "X1");
        add(&mut reg, 41, "Initech", "Z9");
        add(&mut reg, 42, "Acme", "X2");
        reg
    }

    #[test]
    fn empty_registry_has_no_displays() {
        let reg = OutputRegistry::new();
        assert!(matches!(
            reg.select(None, MatchPolicy::Last),
            Err(WaybackError::NoDisplaysFound)
        ));
        assert!(matches!(
            reg.select(Some("Acme"), MatchPolicy::First),
            Err(WaybackError::NoDisplaysFound)
        ));
    }

    #[test]
    fn default_is_first_inserted() {
        let reg = sample();
        assert_eq!(reg.select(None, MatchPolicy::Last).unwrap().handle, 40);
        assert_eq!(reg.select(None, MatchPolicy::First).unwrap().handle, 40);

        let mut single = OutputRegistry::new();
        single.insert(9);
        assert_eq!(single.select(None, MatchPolicy::Last).unwrap().handle, 9);
    }

    #[test]
    fn unique_make_or_make_model() {
        let reg = sample();
        assert_eq!(reg.select(Some("Initech"), MatchPolicy::Last).unwrap().handle, 41);
        assert_eq!(reg.select(Some("Acme X2"), MatchPolicy::Last).unwrap().handle, 42);
        assert_eq!(reg.select(Some("Acme X1"), MatchPolicy::First).unwrap().handle, 40);
    }

    #[test]
    fn several_matches_last_wins_by_default() {
        let reg = sample();
        assert_eq!(reg.select(Some("Acme"), MatchPolicy::default()).unwrap().handle, 42);
    }

    #[test]
    fn several_matches_first_policy() {
        let reg = sample();
        assert_eq!(reg.select(Some("Acme"), MatchPolicy::First).unwrap().handle, 40);
    }

    #[test]
    fn no_match_falls_back_to_first() {
        let reg = sample();
        assert_eq!(reg.select(Some("Globex"), MatchPolicy::Last).unwrap().handle, 40);
        assert!(reg.find("Globex", MatchPolicy::Last).is_none());
    }

    #[test]
    fn insert_is_idempotent_and_ordered() {
        let mut reg = sample();
        assert!(!reg.insert(41));
        assert_eq!(reg.len(), 3);

        let handles: Vec<u32> = reg.iter().map(|o| o.handle).collect();
        assert_eq!(handles, vec![40, 41, 42]);

        reg.remove(40);
        assert_eq!(reg.first().unwrap().handle, 41);
    }

    #[test]
    fn lookup_by_name() {
        let mut reg = sample();
        reg.get_mut(41).unwrap().apply(OutputEvent::Name("HDMI-A-1".into()));
        assert_eq!(reg.by_name("HDMI-A-1").unwrap().handle, 41);
        assert!(reg.by_name("DP-1").is_none());
    }

    #[test]
    fn connector_name_is_not_a_descriptor() {
        let mut reg = OutputRegistry::new();
        add(&mut reg, 1, "Acme", "X1");
        add(&mut reg, 2, "Initech", "Z9");
        reg.get_mut(1).unwrap().apply(OutputEvent::Name("DP-1".into()));
        reg.get_mut(2).unwrap().apply(OutputEvent::Name("eDP-1".into()));

        assert!(reg.find("eDP-1", MatchPolicy::Last).is_none());
        assert_eq!(reg.select(Some("eDP-1"), MatchPolicy::Last).unwrap().handle, 1);
        assert_eq!(reg.select(Some("eDP-1"), MatchPolicy::First).unwrap().handle, 1);
    }
}
