// Author: Dustin Pilgrim
// License: MIT
//
// Output discovery handshake, independent of the Wayland bindings.
//
// The client feeds registry announcements and per-output events in; this
// returns the bind requests the client has to issue. The extended-info object
// (zxdg_output_v1) can only be requested once both the output and the
// manager are known, and they may be announced in either order.

use crate::output::{OutputEvent, OutputRecord};
use crate::registry::OutputRegistry;

pub const OUTPUT_INTERFACE: &str = "wl_output";
pub const OUTPUT_MANAGER_INTERFACE: &str = "zxdg_output_manager_v1";

/// Highest versions we know how to speak.
pub const OUTPUT_VERSION: u32 = 4;
pub const OUTPUT_MANAGER_VERSION: u32 = 3;

/// Round-trips needed before output records can be read: one to receive the
/// globals and flush the binds, one for the events of the bound objects
/// (including the extended-info objects bound while handling globals).
pub const BARRIER_ROUNDTRIPS: usize = 2;

/// A bind the client must perform on the compositor's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bind {
    Output { name: u32, version: u32 },
    OutputManager { name: u32, version: u32 },
    /// `get_xdg_output` for the output with this global name.
    OutputInfo { output: u32 },
}

#[derive(Debug, Default)]
pub struct Discovery {
    outputs: OutputRegistry,
    manager: Option<u32>,
}

impl Discovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles `wl_registry.global`.
    pub fn on_global(&mut self, name: u32, interface: &str, version: u32) -> Vec<Bind> {
        let mut binds = Vec::new();

        match interface {
            OUTPUT_INTERFACE => {
                if !self.outputs.insert(name) {
                    return binds;
                }
                binds.push(Bind::Output {
                    name,
                    version: version.min(OUTPUT_VERSION),
                });
                if self.manager.is_some() {
                    binds.extend(self.bind_info(name));
                }
            }
            OUTPUT_MANAGER_INTERFACE => {
                if self.manager.is_some() {
                    return binds;
                }
                self.manager = Some(name);
                binds.push(Bind::OutputManager {
                    name,
                    version: version.min(OUTPUT_MANAGER_VERSION),
                });

                let pending: Vec<u32> = self
                    .outputs
                    .iter()
                    .filter(|o| !o.info_bound)
                    .map(|o| o.handle)
                    .collect();
                for handle in pending {
                    binds.extend(self.bind_info(handle));
                }
            }
            _ => {}
        }

        binds
    }

    /// Handles `wl_registry.global_remove`. Returns the retired output, if any.
    pub fn on_global_remove(&mut self, name: u32) -> Option<OutputRecord> {
        if self.manager == Some(name) {
            self.manager = None;
            return None;
        }
        self.outputs.remove(name)
    }

    /// Applies an event to the output it belongs to. Returns `false` when the
    /// output is unknown (e.g. already removed).
    pub fn on_event(&mut self, output: u32, event: OutputEvent) -> bool {
        match self.outputs.get_mut(output) {
            Some(record) => {
                record.apply(event);
                true
            }
            None => false,
        }
    }

    pub fn has_manager(&self) -> bool {
        self.manager.is_some()
    }

    /// Global name of the bound output manager.
    pub fn manager(&self) -> Option<u32> {
        self.manager
    }

    pub fn outputs(&self) -> &OutputRegistry {
        &self.outputs
    }

    fn bind_info(&mut self, handle: u32) -> Option<Bind> {
        let record = self.outputs.get_mut(handle)?;
        if record.info_bound {
            return None;
        }
        record.info_bound = true;
        Some(Bind::OutputInfo { output: handle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_before_manager() {
        let mut d = Discovery::new();

        assert_eq!(
            d.on_global(3, OUTPUT_INTERFACE, 4),
            vec![Bind::Output { name: 3, version: 4 }]
        );
        assert_eq!(
            d.on_global(4, OUTPUT_INTERFACE, 2),
            vec![Bind::Output { name: 4, version: 2 }]
        );
        assert_eq!(
            d.on_global(9, OUTPUT_MANAGER_INTERFACE, 3),
            vec![
                Bind::OutputManager { name: 9, version: 3 },
                Bind::OutputInfo { output: 3 },
                Bind::OutputInfo { output: 4 },
            ]
        );
        assert!(d.outputs().iter().all(|o| o.info_bound));
    }

    #[test]
    fn manager_before_outputs() {
        let mut d = Discovery::new();

        assert_eq!(
            d.on_global(1, OUTPUT_MANAGER_INTERFACE, 2),
            vec![Bind::OutputManager { name: 1, version: 2 }]
        );
        assert_eq!(
            d.on_global(5, OUTPUT_INTERFACE, 3),
            vec![
                Bind::Output { name: 5, version: 3 },
                Bind::OutputInfo { output: 5 },
            ]
        );
    }

    #[test]
    fn versions_are_capped() {
        let mut d = Discovery::new();
        assert_eq!(
            d.on_global(1, OUTPUT_MANAGER_INTERFACE, 99),
            vec![Bind::OutputManager { name: 1, version: OUTPUT_MANAGER_VERSION }]
        );
        assert_eq!(
            d.on_global(2, OUTPUT_INTERFACE, 99)[0],
            Bind::Output { name: 2, version: OUTPUT_VERSION }
        );
    }

    #[test]
    fn info_is_bound_once() {
        let mut d = Discovery::new();
        d.on_global(5, OUTPUT_INTERFACE, 4);
        d.on_global(1, OUTPUT_MANAGER_INTERFACE, 3);

        // Re-announcements bind nothing new.
        assert!(d.on_global(5, OUTPUT_INTERFACE, 4).is_empty());
        assert!(d.on_global(2, OUTPUT_MANAGER_INTERFACE, 3).is_empty());
        assert_eq!(d.outputs().len(), 1);
    }

    #[test]
    fn unrelated_globals_are_ignored() {
        let mut d = Discovery::new();
        assert!(d.on_global(1, "wl_compositor", 6).is_empty());
        assert!(d.on_global(2, "wl_seat", 9).is_empty());
        assert!(d.outputs().is_empty());
        assert!(!d.has_manager());
    }

    #[test]
    fn events_route_by_handle() {
        let mut d = Discovery::new();
        d.on_global(5, OUTPUT_INTERFACE, 4);
        d.on_global(6, OUTPUT_INTERFACE, 4);

        assert!(d.on_event(6, OutputEvent::Name("HDMI-A-1".into())));
        assert!(!d.on_event(7, OutputEvent::Name("DP-3".into())));

        assert_eq!(d.outputs().get(5).unwrap().name, None);
        assert_eq!(d.outputs().get(6).unwrap().name.as_deref(), Some("HDMI-A-1"));
    }

    #[test]
    fn global_remove_retires_output() {
        let mut d = Discovery::new();
        d.on_global(5, OUTPUT_INTERFACE, 4);
        d.on_global(6, OUTPUT_INTERFACE, 4);
        d.on_global(1, OUTPUT_MANAGER_INTERFACE, 3);

        assert_eq!(d.on_global_remove(5).map(|o| o.handle), Some(5));
        assert_eq!(d.outputs().first().unwrap().handle, 6);

        assert!(d.on_global_remove(1).is_none());
        assert!(!d.has_manager());

        // A new output after the manager went away gets no info object.
        assert_eq!(
            d.on_global(8, OUTPUT_INTERFACE, 4),
            vec![Bind::Output { name: 8, version: 4 }]
        );
    }
}
