//! Widget refresh signal.
//!
//! After a successful save the widget renderer is told to reload its
//! timelines. The signal is fire-and-forget: nothing is returned, and a
//! failure to deliver it is invisible to the caller.

use std::process::{Command, Stdio};
use std::thread;

pub trait TimelineRefresher {
    fn reload_all_timelines(&self);
}

/// Closures work as refreshers, which keeps test doubles trivial.
impl<F: Fn()> TimelineRefresher for F {
    fn reload_all_timelines(&self) {
        self()
    }
}

/// Spawns an external command without waiting for it.
///
/// The child is reaped on a detached thread so repeated saves never leave
/// zombie processes behind.
#[derive(Debug, Clone)]
pub struct CommandRefresher {
    program: String,
    args: Vec<String>,
}

impl CommandRefresher {
    /// `argv[0]` is the program. Returns `None` for an empty argv.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl TimelineRefresher for CommandRefresher {
    fn reload_all_timelines(&self) {
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => {
                tracing::debug!(program = %self.program, "Timeline refresh not delivered: {}", e);
            }
        }
    }
}
