use embedded_io::ErrorKind;

/// Failures of the board bring-up sequence. Any of these leaves the modem
/// unusable and should halt the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupError {
    /// The board did not report a successful power on.
    PowerOn,
    /// Reading the operator profile returned a negative code.
    ProfileRead(i32),
    /// Writing the desired operator profile was refused.
    ProfileWrite(i32),
}

#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A command was issued while another one is still pending.
    Busy,
    /// The serial transport or the terminal channel failed.
    Io(ErrorKind),
    /// Serialized command does not fit the outgoing command buffer.
    CommandTooLong,
    /// Payload envelope does not fit its buffer.
    PayloadTooLarge,
    /// A caller deadline expired before the transaction resolved.
    Timeout,
    Setup(SetupError),
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            Self::Busy => defmt::write!(f, "Busy"),
            Self::Io(e) => defmt::write!(f, "Io({:?})", e),
            Self::CommandTooLong => defmt::write!(f, "CommandTooLong"),
            Self::PayloadTooLarge => defmt::write!(f, "PayloadTooLarge"),
            Self::Timeout => defmt::write!(f, "Timeout"),
            Self::Setup(e) => defmt::write!(f, "Setup({:?})", e),
        }
    }
}

impl From<SetupError> for Error {
    fn from(e: SetupError) -> Self {
        Self::Setup(e)
    }
}

impl Error {
    pub(crate) fn io<E: embedded_io::Error>(e: E) -> Self {
        Self::Io(e.kind())
    }
}

/// Final outcome of a transaction that did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionError {
    /// The modem answered with a line containing `ERROR`.
    Protocol,
    /// A response line did not fit the receive buffer.
    Overflow,
    /// The caller gave up on the transaction.
    Abandoned,
}
