//! Incoming side of the engine: the response listener state machine.
//!
//! Every call to [`Modem::poll`] performs at most one state step and only
//! ever consumes bytes that are already available, so it never blocks.

use embedded_io::{Read, ReadReady, Write};

use super::{CommandStatus, Modem};
use crate::command::mobile_control::ModuleSwitchOff;
use crate::csv;
use crate::error::Error;
use crate::fmt::Line;

/// Bytes moved per read when relaying unsolicited modem output.
const RELAY_CHUNK: usize = 64;

const CR: u8 = 13;
const LF: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ListenerState {
    /// No transaction in flight. Relays between modem and terminal.
    Idle,
    /// Reset the raw line buffer for a new line.
    ArmLineBuffer,
    /// Discard bytes <= 32 until the first visible byte of a line.
    SkipLeadingWhitespace,
    /// Collect bytes up to the line feed.
    AccumulateLine,
    /// A complete line awaits classification.
    ClassifyLine,
    /// The line did not fit the raw line buffer.
    Overflowed,
    /// Forwarding terminal input to the modem until a carriage return.
    TerminalPassthrough,
}

/// Take one byte if one is available right now.
fn next_byte<R: Read + ReadReady>(reader: &mut R) -> Result<Option<u8>, Error> {
    if !reader.read_ready().map_err(Error::io)? {
        return Ok(None);
    }

    let mut byte = [0u8; 1];
    match reader.read(&mut byte).map_err(Error::io)? {
        0 => Ok(None),
        _ => Ok(Some(byte[0])),
    }
}

/// Print `parts` as one line on the terminal.
fn surface<W: Write>(terminal: &mut W, parts: &[&[u8]]) -> Result<(), Error> {
    for part in parts {
        terminal.write_all(part).map_err(Error::io)?;
    }
    terminal.write_all(b"\r\n").map_err(Error::io)?;
    terminal.flush().map_err(Error::io)
}

impl<T, P, const N: usize> Modem<T, P, N>
where
    T: Read + Write + ReadReady,
    P: Read + Write + ReadReady,
{
    /// Advance the listener by one step.
    ///
    /// `quit` requests the module to be switched off, which happens once the
    /// listener is idle with nothing left to relay.
    pub fn poll(&mut self, quit: bool) -> Result<(), Error> {
        match self.state {
            ListenerState::Idle => self.idle(quit),
            ListenerState::ArmLineBuffer => {
                self.arm_line_buffer();
                self.skip_leading_whitespace()
            }
            ListenerState::SkipLeadingWhitespace => self.skip_leading_whitespace(),
            ListenerState::AccumulateLine => self.accumulate_line(),
            ListenerState::ClassifyLine => self.classify_line(),
            ListenerState::Overflowed => self.overflowed(),
            ListenerState::TerminalPassthrough => self.terminal_passthrough(),
        }
    }

    fn idle(&mut self, quit: bool) -> Result<(), Error> {
        if self.is_pending() {
            self.state = ListenerState::ArmLineBuffer;
        } else if self.serial.read_ready().map_err(Error::io)? {
            self.relay_unsolicited()?;
        } else if self.terminal.read_ready().map_err(Error::io)? {
            self.state = ListenerState::TerminalPassthrough;
        } else if quit {
            self.switch_off()?;
        }
        Ok(())
    }

    /// Nobody asked, so whatever the modem says goes to the terminal.
    fn relay_unsolicited(&mut self) -> Result<(), Error> {
        let mut chunk = [0u8; RELAY_CHUNK];
        while self.serial.read_ready().map_err(Error::io)? {
            let n = self.serial.read(&mut chunk).map_err(Error::io)?;
            if n == 0 {
                break;
            }
            trace!("Unsolicited: {:?}", Line(&chunk[..n]));
            self.terminal.write_all(&chunk[..n]).map_err(Error::io)?;
        }
        self.terminal.flush().map_err(Error::io)
    }

    pub(crate) fn switch_off(&mut self) -> Result<(), Error> {
        info!("Quit requested, switching the module off");
        surface(&mut self.terminal, &[b"Quitting, switching the modem off"])?;

        let mut buf = [0u8; 32];
        let len = super::builder::write_cmd(&ModuleSwitchOff, &mut buf)?;
        self.serial.write_all(&buf[..len]).map_err(Error::io)?;
        self.serial.flush().map_err(Error::io)?;
        self.switched_off = true;
        Ok(())
    }

    fn arm_line_buffer(&mut self) {
        self.diagnostics.leading_whitespace = 0;
        self.line.clear();
        self.state = ListenerState::SkipLeadingWhitespace;
    }

    fn skip_leading_whitespace(&mut self) -> Result<(), Error> {
        while let Some(byte) = next_byte(&mut self.serial)? {
            if byte > b' ' {
                // The buffer was just cleared, so the first byte always fits
                // unless the capacity is zero.
                let _ = self.line.push(byte);
                self.state = ListenerState::AccumulateLine;
                break;
            }
            self.diagnostics.leading_whitespace =
                self.diagnostics.leading_whitespace.wrapping_add(1);
        }
        Ok(())
    }

    fn accumulate_line(&mut self) -> Result<(), Error> {
        while let Some(byte) = next_byte(&mut self.serial)? {
            match byte {
                CR => {}
                LF => {
                    self.state = ListenerState::ClassifyLine;
                    break;
                }
                _ if self.line.len() + 1 >= N => {
                    // The byte would take the slot of the terminator.
                    self.state = ListenerState::Overflowed;
                    break;
                }
                _ => {
                    let _ = self.line.push(byte);
                }
            }
        }
        Ok(())
    }

    fn classify_line(&mut self) -> Result<(), Error> {
        // A NUL ends the line like the terminator does.
        let line = csv::until_nul(&self.line);
        trace!("Classifying {:?}", Line(line));

        if csv::starts_with(b"OK", line) {
            self.resolve(CommandStatus::Success);
            self.state = ListenerState::Idle;
        } else if line.windows(5).any(|w| w == b"ERROR") {
            warn!("Modem error: {:?}", Line(line));
            surface(&mut self.terminal, &[line])?;
            self.resolve(CommandStatus::ProtocolError);
            self.state = ListenerState::Idle;
        } else if line.first() == Some(&b'+') {
            let expected = self.transaction.as_ref().map(|t| &t.expected[..]);
            if csv::starts_with(expected.unwrap_or_default(), line) {
                self.response.clear();
                let _ = self.response.extend_from_slice(line);
            } else {
                warn!("Unexpected response: {:?}", Line(line));
                surface(
                    &mut self.terminal,
                    &[b"Unexpected Response to AT Read Command: ", line],
                )?;
            }
            self.state = ListenerState::ArmLineBuffer;
        } else if csv::starts_with(b"AT", line) {
            self.diagnostics.echoes = self.diagnostics.echoes.wrapping_add(1);
            self.state = ListenerState::ArmLineBuffer;
        } else {
            // Information text ahead of the final result code, e.g. `ATI`.
            self.state = ListenerState::ArmLineBuffer;
        }
        Ok(())
    }

    fn overflowed(&mut self) -> Result<(), Error> {
        self.diagnostics.overflows = self.diagnostics.overflows.wrapping_add(1);
        warn!("Response overflowed {} bytes", N);
        surface(&mut self.terminal, &[&self.line[..]])?;
        self.resolve(CommandStatus::OverflowError);
        self.state = ListenerState::Idle;
        Ok(())
    }

    fn terminal_passthrough(&mut self) -> Result<(), Error> {
        while let Some(byte) = next_byte(&mut self.terminal)? {
            self.serial.write_all(&[byte]).map_err(Error::io)?;
            if byte == CR {
                self.state = ListenerState::Idle;
                break;
            }
        }
        self.serial.flush().map_err(Error::io)
    }
}
