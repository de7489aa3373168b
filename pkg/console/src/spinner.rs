use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crossterm::style::Stylize;
use pkg_constants::wait::SPINNER_INTERVAL_MS;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::SharedWriter;

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Width of `"[WAIT] "` plus the frame character and its trailing space.
const PREFIX_WIDTH: usize = 9;

struct State {
    out: SharedWriter,
    message: String,
    color: bool,
    frame: AtomicUsize,
    shown: AtomicBool,
    stopped: AtomicBool,
}

impl State {
    fn render(&self) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        // Checked under the lock so nothing is drawn after `clear`.
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        if self.shown.swap(true, Ordering::SeqCst) {
            let _ = out.write_all(b"\r");
        }
        let frame = FRAMES[self.frame.fetch_add(1, Ordering::SeqCst) % FRAMES.len()];
        let tag = if self.color {
            "[WAIT] ".red().to_string()
        } else {
            "[WAIT] ".to_string()
        };
        let _ = write!(out, "{}{} {}", tag, frame, self.message);
        let _ = out.flush();
    }

    fn clear(&self) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let width = self.message.chars().count() + PREFIX_WIDTH;
        let _ = write!(out, "\r{}\r", " ".repeat(width));
        let _ = out.flush();
    }
}

/// A running `[WAIT]` indicator.
///
/// The first frame is drawn synchronously; later frames come from a background
/// task. Stopping (explicitly or by drop) always erases the line.
pub struct Spinner {
    state: Arc<State>,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    pub(crate) fn start(out: SharedWriter, message: &str, color: bool) -> Self {
        let state = Arc::new(State {
            out,
            message: message.to_string(),
            color,
            frame: AtomicUsize::new(0),
            shown: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        });
        state.render();

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let handle = tokio::runtime::Handle::try_current().ok().map(|rt| {
            let state = state.clone();
            rt.spawn(async move {
                let mut ticker = tokio::time::interval(Duration::from_millis(SPINNER_INTERVAL_MS));
                ticker.tick().await;
                loop {
                    tokio::select! {
                        _ = &mut stop_rx => return,
                        _ = ticker.tick() => state.render(),
                    }
                }
            })
        });

        Self {
            state,
            stop_tx: Some(stop_tx),
            handle,
        }
    }

    /// Stop rendering and erase the line.
    pub fn stop(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.state.clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.finish();
    }
}
