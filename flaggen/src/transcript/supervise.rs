// SPDX-License-Identifier: GPL-3.0-or-later

//! Runs the build tool steps under a termination signal guard.
//!
//! While the steps run, a termination signal (Ctrl-C, SIGTERM) stops the build
//! tool and aborts the transcript production. Before and after that, the same
//! signals terminate the process as they normally would.

use signal_hook::SigId;
use signal_hook::consts::TERM_SIGNALS;
use std::fmt;
use std::io;
use std::process::{Command, ExitStatus};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A run of the build tool during the transcript production.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuildStep {
    Clean,
    DryRun,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStep::Clean => write!(f, "clean"),
            BuildStep::DryRun => write!(f, "dry run"),
        }
    }
}

/// Runs the build tool steps, and stops them on a termination signal.
///
/// The signals are caught as long as the supervisor is alive.
pub struct Supervisor {
    guard: SignalGuard,
}

impl Supervisor {
    pub fn new() -> Result<Self, SuperviseError> {
        let guard = SignalGuard::install().map_err(SuperviseError::Signals)?;
        Ok(Self { guard })
    }

    /// Runs the step to completion and returns the exit status of the build tool.
    ///
    /// When a termination signal arrives, the build tool is killed and the step
    /// is reported as interrupted.
    pub fn run(&self, step: BuildStep, command: &mut Command) -> Result<ExitStatus, SuperviseError> {
        let mut child = command.spawn().map_err(|source| SuperviseError::Spawn { step, source })?;

        let mut interrupted = None;
        loop {
            if let Some(signal) = self.guard.received() {
                log::debug!("Received signal {signal}, stopping the {step} step");
                if let Err(error) = child.kill() {
                    log::warn!("Failed to stop the build tool: {error}");
                }
                interrupted = Some(signal);
            }

            // The loop ends only after the build tool was reaped.
            match child.try_wait().map_err(|source| SuperviseError::Wait { step, source })? {
                Some(status) => {
                    log::debug!("Build tool {step} step exited: {status}");
                    return match interrupted {
                        Some(signal) => Err(SuperviseError::Interrupted { step, signal }),
                        None => Ok(status),
                    };
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        }
    }
}

/// Signals are caught while at least one guard is alive.
struct GuardRegistry {
    default_actions_installed: bool,
    active: usize,
}

static REGISTRY: Mutex<GuardRegistry> = Mutex::new(GuardRegistry { default_actions_installed: false, active: 0 });

/// True while no guard catches the signals.
static UNGUARDED: LazyLock<Arc<AtomicBool>> = LazyLock::new(|| Arc::new(AtomicBool::new(true)));

/// Catches the termination signals while alive.
///
/// Removing the last action of a signal leaves the process ignoring it, so a
/// default action is registered once per process. It runs whenever no guard
/// is alive.
struct SignalGuard {
    received: Arc<AtomicUsize>,
    catching: Vec<SigId>,
}

impl SignalGuard {
    fn install() -> io::Result<Self> {
        let mut registry = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
        if !registry.default_actions_installed {
            for signal in TERM_SIGNALS {
                signal_hook::flag::register_conditional_default(*signal, Arc::clone(&UNGUARDED))?;
            }
            registry.default_actions_installed = true;
        }
        registry.active += 1;
        UNGUARDED.store(false, Ordering::SeqCst);
        drop(registry);

        // From here on the drop releases whatever was registered.
        let mut guard = Self { received: Arc::new(AtomicUsize::new(0)), catching: Vec::new() };
        for signal in TERM_SIGNALS {
            let id = signal_hook::flag::register_usize(*signal, Arc::clone(&guard.received), *signal as usize)?;
            guard.catching.push(id);
        }
        Ok(guard)
    }

    /// Takes the last received signal.
    fn received(&self) -> Option<i32> {
        match self.received.swap(0, Ordering::SeqCst) {
            0 => None,
            signal => i32::try_from(signal).ok(),
        }
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        for id in self.catching.drain(..) {
            signal_hook::low_level::unregister(id);
        }

        let mut registry = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
        registry.active = registry.active.saturating_sub(1);
        if registry.active == 0 {
            UNGUARDED.store(true, Ordering::SeqCst);
        }
    }
}

#[derive(Debug, Error)]
pub enum SuperviseError {
    #[error("Failed to set up the termination signal handling: {0}")]
    Signals(#[source] io::Error),
    #[error("Failed to start the build tool for the {step} step: {source}")]
    Spawn {
        step: BuildStep,
        #[source]
        source: io::Error,
    },
    #[error("Failed to wait for the build tool in the {step} step: {source}")]
    Wait {
        step: BuildStep,
        #[source]
        source: io::Error,
    },
    #[error("The build tool {step} step was interrupted by {}", signal_name(.signal))]
    Interrupted { step: BuildStep, signal: i32 },
}

fn signal_name(signal: &i32) -> &'static str {
    signal_hook::low_level::signal_name(*signal).unwrap_or("a signal")
}
