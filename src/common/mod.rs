pub mod frame;
pub mod landmark;
