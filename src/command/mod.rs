//! Typed AT commands for the SARA-R4, following the u-blox cellular modules
//! AT commands manual (UBX-13002752).
//!
//! Every command is terminated with a bare carriage return, which is what
//! the response listener expects to be echoed back.

pub mod ip_transport_layer;
pub mod mobile_control;
pub mod network_service;

use atat::atat_derive::{AtatCmd, AtatResp};

#[derive(Clone, AtatResp)]
pub struct NoResponse;

#[derive(Clone, AtatCmd)]
#[at_cmd("", NoResponse, termination = "\r")]
pub struct AT;
