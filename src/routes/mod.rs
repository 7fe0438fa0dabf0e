pub mod charge_mode;
pub mod events;
