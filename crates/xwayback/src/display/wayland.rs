// Author: Dustin Pilgrim
// License: MIT
//
// wl_output + xdg-output discovery over an already-connected socket.

use std::collections::HashMap;
use std::os::unix::net::UnixStream;

use eventline::{debug, warn};
use wayback_core::{Bind, Discovery, OutputEvent, OutputRegistry, Result, WaybackError};
use wayland_client::{
    protocol::{wl_output, wl_registry},
    Connection, Dispatch, EventQueue, Proxy, QueueHandle, WEnum,
};
use wayland_protocols::xdg::xdg_output::zv1::client::{
    zxdg_output_manager_v1::{self, ZxdgOutputManagerV1},
    zxdg_output_v1::{self, ZxdgOutputV1},
};

use super::DisplayClient;

struct ClientState {
    discovery: Discovery,
    manager: Option<ZxdgOutputManagerV1>,
    // Keyed by global name, which is also the user data on each proxy.
    outputs: HashMap<u32, wl_output::WlOutput>,
    infos: HashMap<u32, ZxdgOutputV1>,
}

pub struct WaylandClient {
    conn: Connection,
    queue: EventQueue<ClientState>,
    state: ClientState,
}

impl WaylandClient {
    /// Adopts `stream` as the Wayland transport.
    pub fn connect(stream: UnixStream) -> Result<Self> {
        let conn = Connection::from_socket(stream)
            .map_err(|e| WaybackError::Connection(e.to_string()))?;
        let queue = conn.new_event_queue();

        Ok(Self {
            conn,
            queue,
            state: ClientState {
                discovery: Discovery::new(),
                manager: None,
                outputs: HashMap::new(),
                infos: HashMap::new(),
            },
        })
    }
}

impl DisplayClient for WaylandClient {
    fn enumerate_globals(&mut self) -> Result<()> {
        let qh = self.queue.handle();
        self.conn.display().get_registry(&qh, ());
        Ok(())
    }

    fn roundtrip(&mut self) -> Result<()> {
        self.queue
            .roundtrip(&mut self.state)
            .map_err(|e| WaybackError::Protocol(e.to_string()))?;
        Ok(())
    }

    fn outputs(&self) -> &OutputRegistry {
        self.state.discovery.outputs()
    }
}

impl ClientState {
    fn perform(&mut self, registry: &wl_registry::WlRegistry, bind: Bind, qh: &QueueHandle<Self>) {
        match bind {
            Bind::Output { name, version } => {
                debug!("binding wl_output {name} (v{version})");
                let output = registry.bind::<wl_output::WlOutput, _, _>(name, version, qh, name);
                self.outputs.insert(name, output);
            }
            Bind::OutputManager { name, version } => {
                debug!("binding zxdg_output_manager_v1 {name} (v{version})");
                let manager = registry.bind::<ZxdgOutputManagerV1, _, _>(name, version, qh, ());
                self.manager = Some(manager);
            }
            Bind::OutputInfo { output } => {
                let (Some(manager), Some(wl_output)) = (&self.manager, self.outputs.get(&output))
                else {
                    warn!("cannot create xdg_output for output {output}");
                    return;
                };
                let info = manager.get_xdg_output(wl_output, qh, output);
                self.infos.insert(output, info);
            }
        }
    }

    fn apply(&mut self, output: u32, event: OutputEvent) {
        if !self.discovery.on_event(output, event) {
            debug!("event for unknown output {output}");
        }
    }

    fn retire(&mut self, name: u32) {
        let was_manager = self.discovery.manager() == Some(name);

        if let Some(record) = self.discovery.on_global_remove(name) {
            debug!("output {} removed", record.label());
        }

        if let Some(info) = self.infos.remove(&name) {
            info.destroy();
        }
        if let Some(output) = self.outputs.remove(&name) {
            if output.version() >= 3 {
                output.release();
            }
        }
        if was_manager {
            if let Some(manager) = self.manager.take() {
                manager.destroy();
            }
        }
    }
}

fn wire<T: Into<u32>>(value: WEnum<T>) -> u32 {
    match value {
        WEnum::Value(v) => v.into(),
        WEnum::Unknown(raw) => raw,
    }
}

impl Dispatch<wl_registry::WlRegistry, ()> for ClientState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _data: &(),
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version,
            } => {
                for bind in state.discovery.on_global(name, &interface, version) {
                    state.perform(registry, bind, qh);
                }
            }
            wl_registry::Event::GlobalRemove { name } => state.retire(name),
            _ => {}
        }
    }
}

impl Dispatch<wl_output::WlOutput, u32> for ClientState {
    fn event(
        state: &mut Self,
        _output: &wl_output::WlOutput,
        event: wl_output::Event,
        handle: &u32,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        let event = match event {
            wl_output::Event::Geometry {
                x,
                y,
                physical_width,
                physical_height,
                subpixel,
                make,
                model,
                transform,
            } => OutputEvent::Geometry {
                x,
                y,
                physical_width,
                physical_height,
                subpixel: wire(subpixel),
                make,
                model,
                transform: wire(transform),
            },
            wl_output::Event::Mode {
                flags,
                width,
                height,
                refresh,
            } => OutputEvent::Mode {
                current: flags
                    .into_result()
                    .map(|f| f.contains(wl_output::Mode::Current))
                    .unwrap_or(false),
                width,
                height,
                refresh_mhz: refresh,
            },
            wl_output::Event::Scale { factor } => OutputEvent::Scale(factor),
            wl_output::Event::Name { name } => OutputEvent::Name(name),
            wl_output::Event::Description { description } => OutputEvent::Description(description),
            wl_output::Event::Done => OutputEvent::Done,
            _ => return,
        };

        state.apply(*handle, event);
    }
}

impl Dispatch<ZxdgOutputManagerV1, ()> for ClientState {
    fn event(
        _state: &mut Self,
        _manager: &ZxdgOutputManagerV1,
        _event: zxdg_output_manager_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<ZxdgOutputV1, u32> for ClientState {
    fn event(
        state: &mut Self,
        _info: &ZxdgOutputV1,
        event: zxdg_output_v1::Event,
        handle: &u32,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        let event = match event {
            zxdg_output_v1::Event::LogicalPosition { x, y } => OutputEvent::LogicalPosition { x, y },
            zxdg_output_v1::Event::LogicalSize { width, height } => {
                OutputEvent::LogicalSize { width, height }
            }
            zxdg_output_v1::Event::Name { name } => OutputEvent::Name(name),
            zxdg_output_v1::Event::Description { description } => {
                OutputEvent::Description(description)
            }
            zxdg_output_v1::Event::Done => OutputEvent::Done,
            _ => return,
        };

        state.apply(*handle, event);
    }
}
