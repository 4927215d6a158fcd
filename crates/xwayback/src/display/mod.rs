// Author: Dustin Pilgrim
// License: MIT

mod wayland;

pub use wayland::WaylandClient;

use eventline::{debug, info};
use wayback_core::discovery::BARRIER_ROUNDTRIPS;
use wayback_core::{OutputRegistry, Result, WaybackError};

/// The protocol operations output discovery needs from a client.
pub trait DisplayClient {
    /// Requests the registry; globals arrive on the next round-trip.
    fn enumerate_globals(&mut self) -> Result<()>;

    /// Flushes pending requests and dispatches everything up to the
    /// compositor's reply to a sync marker.
    fn roundtrip(&mut self) -> Result<()>;

    fn outputs(&self) -> &OutputRegistry;
}

/// Enumerates the compositor's outputs.
///
/// Output records are only read after [`BARRIER_ROUNDTRIPS`] round-trips:
/// the extended-info objects are requested while the globals are handled, so
/// their events need a round-trip of their own.
pub fn discover<C: DisplayClient>(client: &mut C) -> Result<OutputRegistry> {
    client.enumerate_globals()?;

    for n in 1..=BARRIER_ROUNDTRIPS {
        client.roundtrip()?;
        debug!("roundtrip {}/{}: {} outputs", n, BARRIER_ROUNDTRIPS, client.outputs().len());
    }

    let outputs = client.outputs().clone();
    if outputs.is_empty() {
        return Err(WaybackError::NoDisplaysFound);
    }

    for out in outputs.iter() {
        let size = out
            .resolution()
            .unwrap_or_else(|| "unknown size".to_string());
        let origin = out.origin();
        info!(
            "output {}: {} at {},{} scale {} ({})",
            out.handle,
            out.label(),
            origin.x,
            origin.y,
            out.scale,
            size
        );
        if let Some(hz) = out.refresh() {
            debug!("output {} refresh: {:.2} Hz", out.handle, hz);
        }
        if let Some(desc) = &out.description {
            debug!("output {} description: {}", out.handle, desc);
        }
    }

    Ok(outputs)
}

/// In-process stand-in for a compositor, for tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::os::unix::net::UnixStream;

    use wayback_core::discovery::{OUTPUT_INTERFACE, OUTPUT_MANAGER_INTERFACE};
    use wayback_core::{Bind, Discovery, OutputEvent, OutputRegistry, Result};

    use super::DisplayClient;

    #[derive(Debug, Clone)]
    pub struct FakeOutput {
        pub name: u32,
        /// Sent when the wl_output is bound.
        pub events: Vec<OutputEvent>,
        /// Sent when its zxdg_output_v1 is created.
        pub info_events: Vec<OutputEvent>,
    }

    impl FakeOutput {
        pub fn new(name: u32, make: &str, model: &str, width: i32, height: i32) -> Self {
            Self {
                name,
                events: vec![
                    OutputEvent::Geometry {
                        x: 0,
                        y: 0,
                        physical_width: 300,
                        physical_height: 190,
                        subpixel: 0,
                        make: make.into(),
                        model: model.into(),
                        transform: 0,
                    },
                    OutputEvent::Mode {
                        current: true,
                        width,
                        height,
                        refresh_mhz: 60000,
                    },
                    OutputEvent::Scale(1),
                    OutputEvent::Done,
                ],
                info_events: Vec::new(),
            }
        }

        pub fn with_info(mut self, connector: &str, description: &str) -> Self {
            self.info_events = vec![
                OutputEvent::LogicalPosition { x: 0, y: 0 },
                OutputEvent::Name(connector.into()),
                OutputEvent::Description(description.into()),
                OutputEvent::Done,
            ];
            self
        }
    }

    enum Message {
        Global(u32, &'static str, u32),
        Event(u32, OutputEvent),
    }

    /// Client whose "server" answers requests one round-trip later, like a
    /// real connection.
    pub struct ScriptedClient {
        globals: Vec<(u32, &'static str, u32)>,
        outputs: Vec<FakeOutput>,
        discovery: Discovery,
        registry_requested: bool,
        requests: Vec<Bind>,
        pub roundtrips: usize,
        _stream: Option<UnixStream>,
    }

    impl ScriptedClient {
        pub fn new() -> Self {
            Self {
                globals: Vec::new(),
                outputs: Vec::new(),
                discovery: Discovery::new(),
                registry_requested: false,
                requests: Vec::new(),
                roundtrips: 0,
                _stream: None,
            }
        }

        pub fn with_stream(mut self, stream: UnixStream) -> Self {
            self._stream = Some(stream);
            self
        }

        pub fn output(mut self, output: FakeOutput) -> Self {
            self.globals.push((output.name, OUTPUT_INTERFACE, 4));
            self.outputs.push(output);
            self
        }

        pub fn manager(mut self, name: u32) -> Self {
            self.globals.push((name, OUTPUT_MANAGER_INTERFACE, 3));
            self
        }

        pub fn global(mut self, name: u32, interface: &'static str) -> Self {
            self.globals.push((name, interface, 1));
            self
        }

        fn find(&self, name: u32) -> Option<&FakeOutput> {
            self.outputs.iter().find(|o| o.name == name)
        }
    }

    impl DisplayClient for ScriptedClient {
        fn enumerate_globals(&mut self) -> Result<()> {
            self.registry_requested = true;
            Ok(())
        }

        fn roundtrip(&mut self) -> Result<()> {
            self.roundtrips += 1;

            // Server side: answer requests in the order they were sent.
            let mut inbox = Vec::new();
            if std::mem::take(&mut self.registry_requested) {
                inbox.extend(
                    self.globals
                        .iter()
                        .map(|&(name, iface, version)| Message::Global(name, iface, version)),
                );
            }
            for bind in std::mem::take(&mut self.requests) {
                let (handle, events) = match bind {
                    Bind::Output { name, .. } => match self.find(name) {
                        Some(o) => (name, o.events.clone()),
                        None => continue,
                    },
                    Bind::OutputInfo { output } => match self.find(output) {
                        Some(o) => (output, o.info_events.clone()),
                        None => continue,
                    },
                    Bind::OutputManager { .. } => continue,
                };
                inbox.extend(events.into_iter().map(|e| Message::Event(handle, e)));
            }

            // Client side: dispatch up to the sync reply.
            for msg in inbox {
                match msg {
                    Message::Global(name, iface, version) => {
                        let binds = self.discovery.on_global(name, iface, version);
                        self.requests.extend(binds);
                    }
                    Message::Event(handle, event) => {
                        self.discovery.on_event(handle, event);
                    }
                }
            }

            Ok(())
        }

        fn outputs(&self) -> &OutputRegistry {
            self.discovery.outputs()
        }
    }
}
