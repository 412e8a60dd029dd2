use std::collections::VecDeque;
use std::sync::Once;
use std::vec::Vec;

use core::convert::Infallible;
use embedded_io::{ErrorType, Read, ReadReady, Write};

use crate::config::Config;
use crate::modem::{CommandStatus, Modem};

static INIT: Once = Once::new();

fn init_logger() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"))
            .is_test(true)
            .init();
    });
}

/// In-memory serial port. Bytes fed with [`MockSerial::feed`] are what the
/// device under test reads, and everything it writes is recorded.
#[derive(Debug, Default)]
pub struct MockSerial {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Bytes fed but not read yet.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    pub fn take_written(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }
}

impl ErrorType for MockSerial {
    type Error = Infallible;
}

impl Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl ReadReady for MockSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.rx.is_empty())
    }
}

impl Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub type Harness = Modem<MockSerial, MockSerial>;

pub fn harness() -> Harness {
    harness_with(Config::default())
}

pub fn harness_with(config: Config) -> Harness {
    init_logger();
    Modem::new(MockSerial::new(), MockSerial::new(), config)
}

impl<const N: usize> Modem<MockSerial, MockSerial, N> {
    /// Poll until the transaction resolves, at most `max_polls` times.
    /// Returns `None` if it is still pending by then.
    pub fn poll_until_resolved(&mut self, max_polls: usize) -> Option<CommandStatus> {
        for _ in 0..max_polls {
            if !self.is_pending() {
                break;
            }
            self.poll(false).unwrap();
        }
        self.status().filter(|s| !s.is_pending())
    }
}
