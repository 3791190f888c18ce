//! Headless mode: one scan per input line, one JSON view per transition.
//!
//! Used for kiosks whose scanner is wired to stdin, and for piping codes in
//! from other tools:
//!
//! ```bash
//! printf '7891234567890\n7890000000017\n' | tribute-scanner start --headless
//! ```
//!
//! Every line (or `\r`-terminated segment) is delivered to the capture as
//! a full value, so blank lines are dropped exactly like an empty scan. Lines starting with `/` are
//! operator commands: `/dismiss`, `/rescan`, `/quit`.
//!
//! # Event Loop
//!
//! ```text
//! stdin reader thread ──lines──► HeadlessRunner::step() ──► App ──► JsonLinesSink
//! ```
//!
//! On end of input the loop keeps ticking until the last lookup settles.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::app::{App, AppAction};
use crate::constants;

/// Spawns a thread forwarding each scan line of `reader` over a channel.
///
/// Lines end at `\n`; a bare `\r` inside a line also ends a scan, since
/// serial scanners commonly terminate codes with CR alone. Lines that are
/// not valid UTF-8 are logged and skipped. The channel disconnects at end
/// of input or on an I/O error.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned.
pub fn spawn_line_reader<R>(mut reader: R) -> Result<Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("headless-input".to_string())
        .spawn(move || {
            let mut raw = Vec::new();
            loop {
                raw.clear();
                match reader.read_until(b'\n', &mut raw) {
                    Ok(0) => break,
                    Ok(_) => {
                        for line in split_scans(&raw) {
                            if tx.send(line).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        log::error!("Failed to read input: {}", e);
                        break;
                    }
                }
            }
            log::debug!("Input reader reached end of input");
        })
        .context("Failed to spawn input reader thread")?;
    Ok(rx)
}

/// Splits one raw input line into scan values.
///
/// The `\n` terminator is stripped and the rest is split on `\r`. Empty
/// segments left by `\r\n` or a trailing `\r` are skipped; an empty line
/// still yields one empty value. Invalid UTF-8 yields nothing.
pub fn split_scans(raw: &[u8]) -> Vec<String> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let Ok(text) = std::str::from_utf8(raw) else {
        log::warn!("Skipping input line that is not valid UTF-8 ({} bytes)", raw.len());
        return Vec::new();
    };
    if !text.contains('\r') {
        return vec![text.to_string()];
    }
    text.split('\r')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Maps one input line to an action.
pub fn line_to_action(line: &str) -> Option<AppAction> {
    match line.trim() {
        "/dismiss" => Some(AppAction::Dismiss),
        "/rescan" => Some(AppAction::Rescan),
        "/quit" => Some(AppAction::Quit),
        command if command.starts_with('/') => {
            log::warn!("Unknown command: {}", command);
            None
        }
        _ => Some(AppAction::Submit(line.to_string())),
    }
}

/// Drives an [`App`] from a line channel.
#[derive(Debug)]
pub struct HeadlessRunner {
    app: App,
    lines: Receiver<String>,
    input_closed: bool,
}

impl HeadlessRunner {
    /// Creates a runner and starts the app.
    pub fn new(mut app: App, lines: Receiver<String>) -> Self {
        app.start();
        Self {
            app,
            lines,
            input_closed: false,
        }
    }

    /// The app being driven.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Whether the loop is done: quit requested, or input closed with no
    /// lookup outstanding.
    pub fn is_finished(&self) -> bool {
        self.app.should_quit() || (self.input_closed && !self.app.dispatcher().is_resolving())
    }

    /// Applies pending input lines, then ticks the app.
    pub fn step(&mut self, now: Instant) {
        loop {
            match self.lines.try_recv() {
                Ok(line) => {
                    if let Some(action) = line_to_action(&line) {
                        self.app.handle_action(action, now);
                    }
                    if self.app.should_quit() {
                        return;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.input_closed = true;
                    break;
                }
            }
        }
        self.app.tick(now);
    }

    /// Runs until [`HeadlessRunner::is_finished`] or shutdown.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        log::info!("Headless event loop starting");
        while !shutdown.load(Ordering::Relaxed) {
            self.step(Instant::now());
            if self.is_finished() {
                break;
            }
            std::thread::sleep(constants::HEADLESS_TICK);
        }
        log::info!("Headless event loop exiting");
    }
}
