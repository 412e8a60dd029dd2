//! ### 25 - Internet protocol transport layer Commands
//!

pub mod responses;

use atat::atat_derive::AtatCmd;
use responses::*;

/// Longest hex payload a single `+USOWR` can carry in this crate.
pub const MAX_HEX_PAYLOAD: usize = 600;

/// 25.10 Write socket data +USOWR
///
/// Writes `length` bytes of data to the socket. With hex mode enabled
/// (`+UDCONF=1,1`) the data is given as a quoted string of hex digits, two
/// per data byte, and `length` counts data bytes, not digits.
#[derive(Clone, AtatCmd)]
#[at_cmd("+USOWR", WriteSocketDataResponse, timeout_ms = 10000, termination = "\r")]
pub struct WriteSocketDataHex<'a> {
    #[at_arg(position = 0)]
    pub socket: u8,
    #[at_arg(position = 1)]
    pub length: usize,
    #[at_arg(position = 2, len = 600)]
    pub data: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use atat::AtatCmd;

    #[test]
    fn hex_write() {
        let mut buf = [0u8; 64];
        let len = WriteSocketDataHex {
            socket: 0,
            length: 3,
            data: "414243",
        }
        .write(&mut buf);
        assert_eq!(&buf[..len], b"AT+USOWR=0,3,\"414243\"\r");
    }
}
