use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;
use embedded_io::{Read, ReadReady, Write};

use crate::error::Error;
use crate::modem::{CommandStatus, Modem};
use crate::timer::OnDelay;

/// Drives a [`Modem`] from an async task.
///
/// The engine itself never waits on anything. The runner polls it every
/// `poll_interval` and puts the caller deadline of [`Runner::transact`] on
/// top, using an [`OnDelay`] armed with `command_timeout`.
pub struct Runner<'d, T, P, const N: usize> {
    modem: &'d mut Modem<T, P, N>,
}

impl<'d, T, P, const N: usize> Runner<'d, T, P, N>
where
    T: Read + Write + ReadReady,
    P: Read + Write + ReadReady,
{
    pub fn new(modem: &'d mut Modem<T, P, N>) -> Self {
        Self { modem }
    }

    pub fn modem(&mut self) -> &mut Modem<T, P, N> {
        &mut *self.modem
    }

    /// Issue a command through `issue` and wait for its final status.
    ///
    /// If the modem does not resolve the transaction within the configured
    /// `command_timeout`, it is abandoned and `Error::Timeout` returned.
    pub async fn transact<F>(&mut self, issue: F) -> Result<CommandStatus, Error>
    where
        F: FnOnce(&mut Modem<T, P, N>) -> Result<u32, Error>,
    {
        let id = issue(&mut *self.modem)?;
        let timeout = self.modem.config.command_timeout;
        let poll_interval = self.modem.config.poll_interval;

        let mut deadline = OnDelay::new();
        deadline.update(true, timeout);

        loop {
            self.step(false)?;

            if let Some(status) = self.modem.status().filter(|s| !s.is_pending()) {
                return Ok(status);
            }

            if deadline.update(true, timeout) {
                warn!("Transaction #{} timed out after {} ms", id, timeout.as_millis());
                self.modem.abandon();
                return Err(Error::Timeout);
            }

            Timer::after(poll_interval).await;
        }
    }

    /// Relay between modem and terminal until `quit` is signalled, then
    /// switch the module off.
    ///
    /// A transaction still pending at that point is abandoned. Power-off is
    /// only written once the listener is idle, so a terminal line being
    /// forwarded is finished first.
    pub async fn run<M: RawMutex>(&mut self, quit: &Signal<M, ()>) -> Result<(), Error> {
        let poll_interval = self.modem.config.poll_interval;

        loop {
            match select(quit.wait(), Timer::after(poll_interval)).await {
                Either::First(()) => break,
                Either::Second(()) => self.step(false)?,
            }
        }

        self.modem.abandon();
        loop {
            self.step(true)?;
            if self.modem.is_switched_off() {
                return Ok(());
            }
            Timer::after(poll_interval).await;
        }
    }

    /// Poll until the listener stops making progress on the bytes at hand.
    fn step(&mut self, quit: bool) -> Result<(), Error> {
        loop {
            let before = self.modem.listener_state();
            self.modem.poll(quit)?;
            if self.modem.listener_state() == before {
                return Ok(());
            }
        }
    }
}
