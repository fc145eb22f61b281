// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, OnceLock};
use std::thread;

use crate::{measure, Color, Layout};

/// Name of the background thread used by [`WorkerWarmer`]
pub const WARMER_THREAD_NAME: &str = "GlyphWarmer";

/// Warms glyph caches for a layout ahead of its first draw.
///
/// Implementations must return without waiting for the warming to happen.
pub trait GlyphWarmer: Send + Sync {
    fn warm_layout(&self, layout: Arc<dyn Layout>);
}

enum WarmTask {
    Layout(Arc<dyn Layout>),
    Flush(Sender<()>),
}

static WORKER: OnceLock<Option<Sender<WarmTask>>> = OnceLock::new();

fn worker() -> Option<&'static Sender<WarmTask>> {
    WORKER
        .get_or_init(|| {
            let (sender, receiver) = mpsc::channel();
            match thread::Builder::new()
                .name(WARMER_THREAD_NAME.to_string())
                .spawn(move || run(receiver))
            {
                Ok(_) => Some(sender),
                Err(err) => {
                    log::warn!("failed to start glyph warmer thread: {}", err);
                    None
                }
            }
        })
        .as_ref()
}

fn run(receiver: Receiver<WarmTask>) {
    let mut picture = Picture::default();
    for task in receiver {
        match task {
            WarmTask::Layout(layout) => {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    picture.begin_recording(
                        measure::width(Some(layout.as_ref())),
                        measure::height(Some(layout.as_ref())),
                    );
                    layout.draw(&mut |x, y, w, h, color| picture.record(x, y, w, h, color));
                    picture.end_recording()
                }));
                match result {
                    Ok(ops) => log::trace!("warmed layout with {} draw ops", ops),
                    Err(_) => log::debug!("glyph warming failed, ignoring"),
                }
            }
            WarmTask::Flush(done) => {
                // the requester may have given up waiting
                let _ = done.send(());
            }
        }
    }
}

/// Offscreen recording target for warm draws
#[derive(Debug, Default)]
struct Picture {
    width: i32,
    height: i32,
    recorded: usize,
}

impl Picture {
    fn begin_recording(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.recorded = 0;
    }

    fn record(&mut self, x: i32, y: i32, w: u32, h: u32, _color: Color) {
        let visible = x < self.width
            && y < self.height
            && x.saturating_add_unsigned(w) > 0
            && y.saturating_add_unsigned(h) > 0;
        if visible {
            self.recorded += 1;
        }
    }

    fn end_recording(&mut self) -> usize {
        self.recorded
    }
}

/// [`GlyphWarmer`] drawing layouts on a process-wide background thread.
///
/// The thread is started on first use and serves every `WorkerWarmer`, one layout at a
/// time in submission order. Failures while drawing are swallowed.
#[derive(Clone, Copy, Default)]
pub struct WorkerWarmer;

impl WorkerWarmer {
    pub fn new() -> Self {
        Self
    }

    /// Block until every layout submitted before this call has been drawn
    pub fn flush(&self) {
        let Some(sender) = worker() else {
            return;
        };
        let (done, wait) = mpsc::channel();
        if sender.send(WarmTask::Flush(done)).is_ok() {
            let _ = wait.recv();
        }
    }
}

impl GlyphWarmer for WorkerWarmer {
    fn warm_layout(&self, layout: Arc<dyn Layout>) {
        if let Some(sender) = worker() {
            if sender.send(WarmTask::Layout(layout)).is_err() {
                log::debug!("glyph warmer thread is gone, dropping layout");
            }
        }
    }
}

impl fmt::Debug for WorkerWarmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerWarmer").finish()
    }
}
