// Author: Dustin Pilgrim
// License: MIT

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// The mode the compositor reports as current for an output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModeInfo {
    pub size: Size,
    /// Hz (the protocol sends mHz).
    pub refresh: f32,
}

/// Events delivered for a `wl_output` or its `zxdg_output_v1`.
///
/// Raw protocol enums (subpixel, transform) are kept as their wire values so
/// this crate stays independent of the Wayland bindings.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    Geometry {
        x: i32,
        y: i32,
        physical_width: i32,
        physical_height: i32,
        subpixel: u32,
        make: String,
        model: String,
        transform: u32,
    },
    Mode {
        current: bool,
        width: i32,
        height: i32,
        refresh_mhz: i32,
    },
    Scale(i32),
    Name(String),
    Description(String),
    LogicalPosition { x: i32, y: i32 },
    LogicalSize { width: i32, height: i32 },
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    /// Global name assigned by the compositor's registry.
    pub handle: u32,

    pub name: Option<String>,
    pub description: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,

    /// Position from `wl_output.geometry`.
    pub position: Position,
    pub logical_position: Option<Position>,
    pub logical_size: Option<Size>,
    pub mode: Option<ModeInfo>,

    /// Millimeters.
    pub physical_size: Size,
    pub subpixel: u32,
    pub transform: u32,
    pub scale: i32,

    /// Set once the extended-info object has been requested.
    pub info_bound: bool,
}

impl OutputRecord {
    pub fn new(handle: u32) -> Self {
        Self {
            handle,
            name: None,
            description: None,
            make: None,
            model: None,
            position: Position::default(),
            logical_position: None,
            logical_size: None,
            mode: None,
            physical_size: Size::default(),
            subpixel: 0,
            transform: 0,
            scale: 1,
            info_bound: false,
        }
    }

    pub fn apply(&mut self, event: OutputEvent) {
        match event {
            OutputEvent::Geometry {
                x,
                y,
                physical_width,
                physical_height,
                subpixel,
                make,
                model,
                transform,
            } => {
                self.position = Position { x, y };
                self.physical_size = Size {
                    width: physical_width,
                    height: physical_height,
                };
                self.subpixel = subpixel;
                self.make = Some(make);
                self.model = Some(model);
                self.transform = transform;
            }
            OutputEvent::Mode {
                current,
                width,
                height,
                refresh_mhz,
            } => {
                // Non-current modes are advertised too; only the current one
                // describes the output.
                if current {
                    self.mode = Some(ModeInfo {
                        size: Size { width, height },
                        refresh: refresh_mhz as f32 / 1000.0,
                    });
                }
            }
            OutputEvent::Scale(factor) => self.scale = factor,
            OutputEvent::Name(name) => self.name = Some(name),
            OutputEvent::Description(desc) => self.description = Some(desc),
            OutputEvent::LogicalPosition { x, y } => {
                self.logical_position = Some(Position { x, y });
            }
            OutputEvent::LogicalSize { width, height } => {
                self.logical_size = Some(Size { width, height });
            }
            OutputEvent::Done => {}
        }
    }

    /// Logical size when known, otherwise the current mode size.
    pub fn size(&self) -> Option<Size> {
        self.logical_size.or(self.mode.map(|m| m.size))
    }

    /// Position in the global compositor space.
    pub fn origin(&self) -> Position {
        self.logical_position.unwrap_or(self.position)
    }

    /// `"{width}x{height}"`, as Xwayland expects for `-geometry`.
    pub fn resolution(&self) -> Option<String> {
        self.size().map(|s| format!("{}x{}", s.width, s.height))
    }

    pub fn refresh(&self) -> Option<f32> {
        self.mode.map(|m| m.refresh)
    }

    /// Does `descriptor` name this output?
    ///
    /// Accepts `"{make} {model}"` or the make alone. The connector name is
    /// not a descriptor.
    pub fn matches(&self, descriptor: &str) -> bool {
        if let (Some(make), Some(model)) = (&self.make, &self.model) {
            if format!("{make} {model}") == descriptor {
                return true;
            }
        }

        self.make.as_deref() == Some(descriptor)
    }

    /// Short human-readable label for logs.
    pub fn label(&self) -> String {
        match (&self.name, &self.make, &self.model) {
            (Some(name), _, _) => name.clone(),
            (None, Some(make), Some(model)) => format!("{make} {model}"),
            _ => format!("output {}", self.handle),
        }
    }
}
