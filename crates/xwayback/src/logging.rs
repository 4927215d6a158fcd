// Author: Dustin Pilgrim
// License: MIT

use std::future::Future;
use std::io::IsTerminal;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use eventline::runtime::{self, LogLevel};

use crate::paths::ensure_parent_dir;

/// Console output is always on: diagnostics are the only thing we print.
/// The log file is best effort; its error is returned after the console sink
/// is already usable.
pub fn init_logging(log_path: &Path, verbose: bool) -> Result<(), String> {
    block_on(runtime::init());

    runtime::enable_console_output(true);
    runtime::enable_console_color(use_color());
    runtime::set_log_level(if verbose { LogLevel::Debug } else { LogLevel::Info });

    ensure_parent_dir(log_path).map_err(|e| format!("create log dir: {e}"))?;
    runtime::enable_file_output(log_path).map_err(|e| format!("enable file output: {e}"))?;

    Ok(())
}

fn use_color() -> bool {
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    !no_color && std::io::stderr().is_terminal()
}

fn block_on<F: Future>(mut fut: F) -> F::Output {
    unsafe fn clone(_: *const ()) -> RawWaker {
        RawWaker::new(std::ptr::null(), &VTABLE)
    }
    unsafe fn wake(_: *const ()) {}
    unsafe fn wake_by_ref(_: *const ()) {}
    unsafe fn drop(_: *const ()) {}

    static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, wake, wake_by_ref, drop);

    let waker = unsafe { Waker::from_raw(RawWaker::new(std::ptr::null(), &VTABLE)) };
    let mut cx = Context::from_waker(&waker);

    // SAFETY: `fut` is never moved after pinning.
    let mut fut = unsafe { Pin::new_unchecked(&mut fut) };

    loop {
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(v) => return v,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}
