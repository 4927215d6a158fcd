// Author: Dustin Pilgrim
// License: MIT
//
// Start wayback-compositor, learn its output layout, then start Xwayland on
// top of it.
//
// Socket pairs (remote end -> compositor):
//   xwayback  our Wayland connection to the compositor
//   xwayland  Xwayland's Wayland connection (WAYLAND_SOCKET)
//   wm        X11 window-manager link (Xwayland -wm)
//
// Nothing is cleaned up when a later step fails: an already started
// compositor keeps running.

use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::ExitStatus;

use eventline::{debug, info, warn};
use wayback_core::{MatchPolicy, Result, WaybackError};
use wayback_launch::{check_executable, create_channel, ChannelPair, Launch};

use crate::display::{self, DisplayClient, WaylandClient};

/// Variables that would make a Wayland client pick up an unrelated server.
const DISPLAY_ENV: &[&str] = &["WAYLAND_DISPLAY", "WAYLAND_SOCKET"];

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub compositor_path: PathBuf,
    pub xwayland_path: PathBuf,
    /// Preferred output (`"make model"` or make).
    pub output: Option<String>,
    pub output_match: MatchPolicy,
    pub verbosity: Option<u32>,
    pub forwarded: Vec<String>,
}

/// Runs a session against the real compositor. The display variables are
/// cleared just before connecting, after the compositor has been started.
pub fn run(cfg: &SessionConfig) -> Result<ExitStatus> {
    run_with(cfg, |stream| {
        clear_display_env();
        WaylandClient::connect(stream)
    })
}

pub fn run_with<C, F>(cfg: &SessionConfig, connect: F) -> Result<ExitStatus>
where
    C: DisplayClient,
    F: FnOnce(UnixStream) -> Result<C>,
{
    // Both binaries are checked before anything is created or started.
    check_executable(&cfg.compositor_path)?;
    check_executable(&cfg.xwayland_path)?;

    let xwayback = create_channel()?;
    let xwayland = create_channel()?;
    let wm = create_channel()?;
    debug!(
        "sockets: xwayback {}/{}, xwayland {}/{}, wm {}/{}",
        xwayback.local_fd(),
        xwayback.remote_fd(),
        xwayland.local_fd(),
        xwayland.remote_fd(),
        wm.local_fd(),
        wm.remote_fd()
    );

    let launch = compositor_launch(cfg, &xwayback, &xwayland, &wm);
    debug!("compositor arguments: {:?}", launch.get_args());
    let mut compositor = launch.spawn()?;
    info!(
        "started {} (pid {})",
        compositor.program().display(),
        compositor.pid()
    );

    // The remote ends now belong to the compositor.
    let (xwayback, xwayland, wm) = (xwayback.local, xwayland.local, wm.local);

    let conn_fd = xwayback.as_raw_fd();
    let mut client = connect(xwayback)?;
    let outputs = display::discover(&mut client)?;

    let selected = outputs.select(cfg.output.as_deref(), cfg.output_match)?;
    if let Some(wanted) = &cfg.output {
        if outputs.find(wanted, cfg.output_match).is_none() {
            warn!("no output matches \"{}\", using {}", wanted, selected.label());
        }
    }

    let resolution = selected.resolution().ok_or(WaybackError::NoGeometry {
        handle: selected.handle,
    })?;
    info!("using output {} ({})", selected.label(), resolution);

    let args = xwayland_args(&resolution, wm.as_raw_fd(), cfg.verbosity, &cfg.forwarded);
    debug!("Xwayland arguments: {:?}", args);

    let xwayland_proc = Launch::new(&cfg.xwayland_path)
        .args(&args)
        .env("WAYLAND_SOCKET", xwayland.as_raw_fd().to_string())
        .inherit_fd(&xwayland)
        .inherit_fd(&wm)
        .close_fd(conn_fd)
        .spawn()?;
    info!(
        "started {} (pid {})",
        xwayland_proc.program().display(),
        xwayland_proc.pid()
    );

    // Xwayland is not supervised; its ends are its own now.
    drop(xwayland);
    drop(wm);
    drop(xwayland_proc);

    let status = compositor.wait()?;
    info!("compositor exited: {}", status);

    drop(client);
    Ok(status)
}

fn compositor_launch(
    cfg: &SessionConfig,
    xwayback: &ChannelPair,
    xwayland: &ChannelPair,
    wm: &ChannelPair,
) -> Launch {
    Launch::new(&cfg.compositor_path)
        .arg(xwayback.remote_fd().to_string())
        .arg(xwayland.remote_fd().to_string())
        .arg(wm.remote_fd().to_string())
        .inherit_fd(&xwayback.remote)
        .inherit_fd(&xwayland.remote)
        .inherit_fd(&wm.remote)
        .close_fd(xwayback.local_fd())
        .close_fd(xwayland.local_fd())
        .close_fd(wm.local_fd())
}

fn clear_display_env() {
    for key in DISPLAY_ENV {
        // SAFETY: only reached from `run`, on the main thread of the xwayback
        // binary, which never starts another thread.
        unsafe { std::env::remove_var(key) };
    }
}

/// Xwayland command line (without argv[0]).
pub fn xwayland_args(
    resolution: &str,
    wm_fd: RawFd,
    verbosity: Option<u32>,
    forwarded: &[String],
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-geometry".into(),
        resolution.into(),
        "-rootless".into(),
        "-terminate".into(),
        "3".into(),
        "-wm".into(),
        wm_fd.to_string(),
    ];

    if let Some(level) = verbosity {
        args.push("-verbose".into());
        args.push(level.to_string());
    }

    args.extend(forwarded.iter().cloned());
    args
}
