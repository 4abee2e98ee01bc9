//! Wheel listing and capability commands

use anyhow::Result;
use hidapi::HidApi;
use hidhaptic_hid_common::HidCommonError;

use crate::commands::Session;
use crate::output;
use crate::wheels::{self, Selector};

/// List connected wheels
pub fn list(json: bool) -> Result<()> {
    let api = HidApi::new().map_err(HidCommonError::from)?;
    let wheels = wheels::list_wheels(&api);
    output::print_wheel_list(&wheels, json);
    Ok(())
}

/// Show what the wheel supports
pub fn info(selector: Option<Selector>, json: bool) -> Result<()> {
    let session = Session::open(selector)?;
    output::print_haptic_info(&session.haptic, json);
    session.close();
    Ok(())
}
