//! End-to-end scenarios for the readiness coordinator and the address codec,
//! run against the scriptable collaborators in `netready_core::testing`.

#[cfg(test)]
mod codec;
#[cfg(test)]
mod readiness;
