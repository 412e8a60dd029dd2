//! Outgoing side of the engine: writes a command to the module and arms the
//! listener for its reply.

use atat::AtatCmd;
use embedded_io::{Read, ReadReady, Write};
use serde::Serialize;

use super::{CommandKind, ListenerState, Modem, Prefix};
use crate::command::ip_transport_layer::WriteSocketDataHex;
use crate::error::Error;
use crate::hex;

/// Scratch space for a serialized typed command.
pub const COMMAND_BUFFER_SIZE: usize = 1024;

/// Capacity of the JSON text of a cloud envelope.
pub const PAYLOAD_BUFFER_SIZE: usize = 300;

/// Acknowledgement tag of a socket write.
const SOCKET_WRITE_PREFIX: &[u8] = b"+USOWR";

/// Envelope the cloud expects on its TCP ingest: device key, data, topics.
#[derive(Serialize)]
struct Envelope<'a> {
    k: &'a str,
    d: &'a str,
    t: &'a str,
}

/// Response prefix a read command is answered with: `+` followed by the
/// leading run of alphabetic characters, e.g. `+CSQ?` answers with `+CSQ`.
///
/// Commands not starting with `+` (`I`, `&V`, ...) have no prefix, so any `+`
/// line is captured for them.
pub fn expected_prefix(command: &[u8]) -> Prefix {
    let mut prefix = Prefix::new();
    if let Some((&b'+', rest)) = command.split_first() {
        let _ = prefix.push(b'+');
        for &c in rest.iter().take_while(|c| c.is_ascii_alphabetic()) {
            if prefix.push(c).is_err() {
                break;
            }
        }
    }
    prefix
}

impl<T, P, const N: usize> Modem<T, P, N>
where
    T: Read + Write + ReadReady,
    P: Read + Write + ReadReady,
{
    /// Issue `AT<command>\r` where only the final result code matters.
    ///
    /// Returns the id of the new transaction.
    pub fn set(&mut self, command: &str) -> Result<u32, Error> {
        self.issue_text(CommandKind::Set, command.as_bytes(), Prefix::new())
    }

    /// Issue `AT<command>\r` and capture its `+` information response.
    pub fn read(&mut self, command: &str) -> Result<u32, Error> {
        let expected = expected_prefix(command.as_bytes());
        self.issue_text(CommandKind::Read, command.as_bytes(), expected)
    }

    /// Typed variant of [`Modem::set`].
    pub fn set_cmd<C: AtatCmd>(&mut self, cmd: &C) -> Result<u32, Error> {
        self.issue_cmd(CommandKind::Set, cmd, None)
    }

    /// Typed variant of [`Modem::read`]. The expected prefix is derived from
    /// the serialized command.
    pub fn read_cmd<C: AtatCmd>(&mut self, cmd: &C) -> Result<u32, Error> {
        self.issue_cmd(CommandKind::Read, cmd, None)
    }

    /// Deliver `message` on `topics` to the cloud over the already connected
    /// TCP `socket`.
    ///
    /// The JSON envelope is hex encoded and written with `+USOWR`, and the
    /// transaction expects its `+USOWR` acknowledgement.
    pub fn publish(&mut self, socket: u8, message: &str, topics: &str) -> Result<u32, Error> {
        self.ensure_idle()?;

        let envelope = Envelope {
            k: self.config.device_key(),
            d: message,
            t: topics,
        };

        let mut json = [0u8; PAYLOAD_BUFFER_SIZE];
        let json_len =
            serde_json_core::to_slice(&envelope, &mut json).map_err(|_| Error::PayloadTooLarge)?;

        let mut digits = [0u8; PAYLOAD_BUFFER_SIZE * 2 + 1];
        let length = hex::hex_encode(&json[..json_len], &mut digits);
        let data =
            core::str::from_utf8(&digits[..length * 2]).map_err(|_| Error::PayloadTooLarge)?;

        let cmd = WriteSocketDataHex {
            socket,
            length,
            data,
        };

        let mut expected = Prefix::new();
        let _ = expected.extend_from_slice(SOCKET_WRITE_PREFIX);
        self.issue_cmd(CommandKind::Payload, &cmd, Some(expected))
    }

    fn ensure_idle(&self) -> Result<(), Error> {
        if let Some(transaction) = self.transaction.as_ref().filter(|t| t.status.is_pending()) {
            warn!(
                "Rejecting command, transaction #{} still pending",
                transaction.id
            );
            return Err(Error::Busy);
        }
        if self.state == ListenerState::TerminalPassthrough {
            warn!("Rejecting command, terminal line half forwarded");
            return Err(Error::Busy);
        }
        Ok(())
    }

    fn issue_text(
        &mut self,
        kind: CommandKind,
        command: &[u8],
        expected: Prefix,
    ) -> Result<u32, Error> {
        self.ensure_idle()?;

        self.serial.write_all(b"AT").map_err(Error::io)?;
        self.serial.write_all(command).map_err(Error::io)?;
        self.serial.write_all(b"\r").map_err(Error::io)?;
        self.serial.flush().map_err(Error::io)?;

        let id = self.begin(kind, expected);
        debug!(
            "Issued #{} {:?}: AT{:?}",
            id,
            kind,
            crate::fmt::Line(command)
        );
        Ok(id)
    }

    fn issue_cmd<C: AtatCmd>(
        &mut self,
        kind: CommandKind,
        cmd: &C,
        expected: Option<Prefix>,
    ) -> Result<u32, Error> {
        self.ensure_idle()?;

        let mut buf = [0u8; COMMAND_BUFFER_SIZE];
        let len = write_cmd(cmd, &mut buf)?;
        let bytes = &buf[..len];

        let expected = expected.unwrap_or_else(|| match kind {
            CommandKind::Read => expected_prefix(bytes.strip_prefix(b"AT").unwrap_or(bytes)),
            _ => Prefix::new(),
        });

        self.serial.write_all(bytes).map_err(Error::io)?;
        self.serial.flush().map_err(Error::io)?;

        let id = self.begin(kind, expected);
        debug!("Issued #{} {:?}: {:?}", id, kind, crate::fmt::Line(bytes));
        Ok(id)
    }
}

/// Serialize `cmd` into `buf`, refusing commands that might not fit.
pub(crate) fn write_cmd<C: AtatCmd>(cmd: &C, buf: &mut [u8]) -> Result<usize, Error> {
    if C::MAX_LEN > buf.len() {
        return Err(Error::CommandTooLong);
    }
    Ok(cmd.write(buf))
}
