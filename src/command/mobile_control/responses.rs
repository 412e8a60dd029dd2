//! Responses for Mobile equipment control and status Commands
use atat::atat_derive::AtatResp;

/// Mobile Network Operator profile +UMNOPROF
#[derive(Debug, Clone, AtatResp)]
pub struct MnoProfile {
    #[at_arg(position = 0)]
    pub profile: i32,
}
