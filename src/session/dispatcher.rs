use super::{
    CancelToken, DeviceHandle, DeviceRef, DeviceResult, DeviceSessionError, SessionStage,
    Transport, TransportError,
};
use crate::protocol::Command;
use log::{debug, error, info, warn};
use std::thread;
use std::time::Duration;

/// Blocking wait between settle-sensitive commands.
pub trait Sleeper: Sync {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Replaces the per-class settle delay for every device.
    pub settle_override: Option<Duration>,
    /// One thread per device instead of one device after another.
    pub parallel: bool,
}

impl SessionConfig {
    pub fn settle_for(&self, device: &DeviceRef) -> Duration {
        self.settle_override.unwrap_or_else(|| device.class().settle_delay())
    }
}

enum Outcome {
    Completed,
    Cancelled(usize),
    WriteFailed(usize, TransportError),
}

pub struct Dispatcher<'a> {
    transport: &'a dyn Transport,
    sleeper: &'a dyn Sleeper,
    config: SessionConfig,
    cancel: CancelToken,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        sleeper: &'a dyn Sleeper,
        config: SessionConfig,
        cancel: CancelToken,
    ) -> Self {
        Self {
            transport,
            sleeper,
            config,
            cancel,
        }
    }

    /// Apply `commands` to every device, one session each.
    ///
    /// A device that fails is reported and skipped; the others are still
    /// configured. Results come back in the order of `devices`.
    pub fn dispatch(&self, devices: Vec<DeviceRef>, commands: &[Command]) -> Vec<DeviceResult> {
        if self.config.parallel && devices.len() > 1 {
            thread::scope(|scope| {
                let sessions: Vec<_> = devices
                    .into_iter()
                    .map(|device| scope.spawn(move || self.run_session(device, commands)))
                    .collect();
                sessions
                    .into_iter()
                    .map(|session| {
                        session
                            .join()
                            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                    })
                    .collect()
            })
        } else {
            devices
                .into_iter()
                .map(|device| self.run_session(device, commands))
                .collect()
        }
    }

    fn run_session(&self, device: DeviceRef, commands: &[Command]) -> DeviceResult {
        if self.cancel.is_cancelled() {
            info!("{}: skipped, run was cancelled", device);
            return DeviceResult::Cancelled { device, written: 0 };
        }

        let mut handle = match self.transport.open(&device) {
            Ok(handle) => handle,
            Err(cause) => return failed(device, SessionStage::Open, cause),
        };
        debug!("{}: opened", device);

        let settle = self.config.settle_for(&device);
        let outcome = self.write_all(&device, handle.as_mut(), commands, settle);
        let closed = handle.close();

        match (outcome, closed) {
            (Outcome::WriteFailed(index, cause), closed) => {
                if let Err(e) = closed {
                    warn!("{}: close after failed write: {}", device, e);
                }
                failed(device, SessionStage::Write(index), cause)
            }
            (_, Err(cause)) => failed(device, SessionStage::Close, cause),
            (Outcome::Completed, Ok(())) => {
                info!("{}: applied {} command(s)", device, commands.len());
                DeviceResult::Applied {
                    device,
                    commands: commands.len(),
                }
            }
            (Outcome::Cancelled(written), Ok(())) => {
                warn!(
                    "{}: cancelled after {} of {} command(s)",
                    device,
                    written,
                    commands.len()
                );
                DeviceResult::Cancelled { device, written }
            }
        }
    }

    fn write_all(
        &self,
        device: &DeviceRef,
        handle: &mut dyn DeviceHandle,
        commands: &[Command],
        settle: Duration,
    ) -> Outcome {
        for (index, command) in commands.iter().enumerate() {
            if index > 0 && commands[index - 1].setting().needs_settle() && !settle.is_zero() {
                debug!("{}: settling for {:?}", device, settle);
                self.sleeper.sleep(settle);
            }
            if self.cancel.is_cancelled() {
                return Outcome::Cancelled(index);
            }

            debug!("{}: {}", device, command);
            if let Err(cause) = handle.write(command.as_bytes()) {
                return Outcome::WriteFailed(index, cause);
            }
        }
        Outcome::Completed
    }
}

fn failed(device: DeviceRef, stage: SessionStage, cause: TransportError) -> DeviceResult {
    let error = DeviceSessionError {
        device: device.clone(),
        stage,
        cause,
    };
    error!("{}", error);
    DeviceResult::Failed { device, error }
}
