//! The AT protocol engine.
//!
//! [`Modem`] owns the serial transport to the module, the local terminal
//! channel, and every buffer and counter of the exchange. Commands are issued
//! through the builder methods (`set`, `read`, `publish`, ...), and the
//! response listener is driven by calling [`Modem::poll`] from the control
//! loop until the transaction resolves:
//!
//! ```ignore
//! modem.read("+CSQ?")?;
//! while modem.is_pending() {
//!     modem.poll(false)?;
//! }
//! let rssi = modem.response_int(1);
//! ```
//!
//! Only one transaction exists at a time. Issuing while one is pending is
//! rejected with [`Error::Busy`](crate::error::Error::Busy).

mod builder;
mod listener;

use embedded_io::{Read, ReadReady, Write};
use heapless::Vec;

pub use builder::expected_prefix;
pub use listener::ListenerState;

use crate::config::Config;
use crate::csv;
use crate::error::TransactionError;

/// Capacity of the raw line and response content buffers.
pub const RESPONSE_BUFFER_SIZE: usize = 500;

/// Capacity of the expected response prefix, `+` included.
pub const PREFIX_CAPACITY: usize = 32;

pub type Prefix = Vec<u8, PREFIX_CAPACITY>;

/// How a transaction was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    /// Only a final `OK` is of interest.
    Set,
    /// An information response is expected ahead of the final `OK`.
    Read,
    /// Hex encoded socket write of a cloud envelope.
    Payload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandStatus {
    Pending,
    Success,
    ProtocolError,
    OverflowError,
    /// Given up by the caller, see [`Modem::abandon`].
    Abandoned,
}

impl CommandStatus {
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }

    /// `None` while pending, the final outcome otherwise.
    pub fn into_result(self) -> Option<Result<(), TransactionError>> {
        match self {
            Self::Pending => None,
            Self::Success => Some(Ok(())),
            Self::ProtocolError => Some(Err(TransactionError::Protocol)),
            Self::OverflowError => Some(Err(TransactionError::Overflow)),
            Self::Abandoned => Some(Err(TransactionError::Abandoned)),
        }
    }
}

/// One outstanding AT exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: u32,
    pub kind: CommandKind,
    /// Prefix a `+` line must carry to be captured as the response. Empty
    /// captures any `+` line.
    pub expected: Prefix,
    pub status: CommandStatus,
}

/// Observability counters. They wrap instead of saturating.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// Bytes <= 32 skipped ahead of the current line.
    pub leading_whitespace: u32,
    pub overflows: u32,
    pub echoes: u32,
}

pub struct Modem<T, P, const N: usize = RESPONSE_BUFFER_SIZE> {
    pub(crate) serial: T,
    pub(crate) terminal: P,
    pub(crate) config: Config,
    state: ListenerState,
    line: Vec<u8, N>,
    response: Vec<u8, N>,
    transaction: Option<Transaction>,
    next_id: u32,
    diagnostics: Diagnostics,
    switched_off: bool,
}

impl<T, P, const N: usize> Modem<T, P, N>
where
    T: Read + Write + ReadReady,
    P: Read + Write + ReadReady,
{
    pub fn new(serial: T, terminal: P, config: Config) -> Self {
        Self {
            serial,
            terminal,
            config,
            state: ListenerState::Idle,
            line: Vec::new(),
            response: Vec::new(),
            transaction: None,
            next_id: 0,
            diagnostics: Diagnostics::default(),
            switched_off: false,
        }
    }

    /// Give back the transport and the terminal.
    pub fn release(self) -> (T, P) {
        (self.serial, self.terminal)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn listener_state(&self) -> ListenerState {
        self.state
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    /// Status of the latest transaction, `None` before the first command.
    pub fn status(&self) -> Option<CommandStatus> {
        self.transaction.as_ref().map(|t| t.status)
    }

    pub fn is_pending(&self) -> bool {
        self.status().is_some_and(CommandStatus::is_pending)
    }

    /// The `+` line captured for the latest transaction, empty if none
    /// matched.
    pub fn response(&self) -> &[u8] {
        &self.response
    }

    /// Integer in `column` of the captured response, after its `+CMD:`
    /// prefix.
    pub fn response_int(&self, column: usize) -> i32 {
        csv::extract_int(column, csv::parameters(&self.response))
    }

    /// Quoted string in `column` of the captured response, after its
    /// `+CMD:` prefix.
    pub fn response_str(&self, column: usize) -> Option<&[u8]> {
        csv::quoted_field(column, csv::parameters(&self.response))
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// Whether the power-off command went out since the last transaction.
    pub fn is_switched_off(&self) -> bool {
        self.switched_off
    }

    /// Give up on the pending transaction, e.g. after a caller deadline.
    ///
    /// The transaction ends as [`CommandStatus::Abandoned`] and the listener
    /// returns to idle. Bytes of the late reply, if any, are later relayed to
    /// the terminal as unsolicited output.
    pub fn abandon(&mut self) {
        if let Some(transaction) = self.transaction.as_mut().filter(|t| t.status.is_pending()) {
            warn!("Abandoning transaction #{}", transaction.id);
            transaction.status = CommandStatus::Abandoned;
            self.state = ListenerState::Idle;
        }
    }

    fn begin(&mut self, kind: CommandKind, expected: Prefix) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        self.response.clear();
        self.switched_off = false;
        self.transaction = Some(Transaction {
            id: self.next_id,
            kind,
            expected,
            status: CommandStatus::Pending,
        });
        self.next_id
    }

    fn resolve(&mut self, status: CommandStatus) {
        if let Some(transaction) = self.transaction.as_mut() {
            debug!("Transaction #{} resolved: {:?}", transaction.id, status);
            transaction.status = status;
        }
    }
}
