//! ### 7 - Network service
//!

pub mod responses;

use atat::atat_derive::AtatCmd;
use responses::*;

/// 7.2 Signal quality +CSQ
///
/// Returns the radio signal strength `<rssi>` and the channel bit error rate
/// `<qual>`. 99 in either field means "not known or not detectable".
#[derive(Clone, AtatCmd)]
#[at_cmd("+CSQ", SignalQuality, termination = "\r")]
pub struct GetSignalQuality;
