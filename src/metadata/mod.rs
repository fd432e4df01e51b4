// src/metadata/mod.rs
mod eflr;
mod frame_array;
mod log_pass;

pub use eflr::{set_type, Attribute, ComponentRole, Eflr, Object};
pub use frame_array::{FrameArray, FrameChannel};
pub use log_pass::LogPass;
