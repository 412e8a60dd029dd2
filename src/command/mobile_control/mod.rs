//! ### 5 - Mobile equipment control and status Commands
//!

pub mod responses;

use atat::atat_derive::AtatCmd;
use responses::*;

use super::NoResponse;

/// 5.2 Module switch off +CPWROFF
///
/// Switches off the MT. During shut-down current settings are saved in module's
/// non-volatile memory
///
/// **Notes:**
/// - Using this command can result in the following command line being ignored.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPWROFF", NoResponse, timeout_ms = 40000, termination = "\r")]
pub struct ModuleSwitchOff;

/// Mobile Network Operator profile +UMNOPROF
///
/// Reads the MNO profile the module is currently configured with.
#[derive(Clone, AtatCmd)]
#[at_cmd("+UMNOPROF?", MnoProfile, termination = "\r")]
pub struct GetMnoProfile;

/// Mobile Network Operator profile +UMNOPROF
///
/// Selects the MNO profile. Takes effect after the next module reboot, and
/// requires the radio to be switched off (`+CFUN=0`) beforehand.
#[derive(Clone, AtatCmd)]
#[at_cmd("+UMNOPROF", NoResponse, timeout_ms = 10000, termination = "\r")]
pub struct SetMnoProfile {
    #[at_arg(position = 0)]
    pub profile: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use atat::AtatCmd;

    #[test]
    fn switch_off() {
        let mut buf = [0u8; 32];
        let len = ModuleSwitchOff.write(&mut buf);
        assert_eq!(&buf[..len], b"AT+CPWROFF\r");
    }

    #[test]
    fn mno_profile() {
        let mut buf = [0u8; 32];
        let len = GetMnoProfile.write(&mut buf);
        assert_eq!(&buf[..len], b"AT+UMNOPROF?\r");

        let len = SetMnoProfile { profile: 100 }.write(&mut buf);
        assert_eq!(&buf[..len], b"AT+UMNOPROF=100\r");
    }
}
