//! Responses for Internet protocol transport layer Commands
use atat::atat_derive::AtatResp;

/// 25.10 Write socket data +USOWR
#[derive(Debug, Clone, AtatResp)]
pub struct WriteSocketDataResponse {
    #[at_arg(position = 0)]
    pub socket: u8,
    #[at_arg(position = 1)]
    pub length: usize,
}
