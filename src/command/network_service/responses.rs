//! Responses for Network service Commands
use atat::atat_derive::AtatResp;

/// 7.2 Signal quality +CSQ
#[derive(Debug, Clone, AtatResp)]
pub struct SignalQuality {
    #[at_arg(position = 0)]
    pub rssi: u8,
    #[at_arg(position = 1)]
    pub qual: u8,
}
