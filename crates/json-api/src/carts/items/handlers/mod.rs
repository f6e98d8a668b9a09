//! Cart Item Handlers

pub(crate) mod update;
