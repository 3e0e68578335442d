pub mod args;
pub mod config_loader;
pub mod demo_settings;
pub mod frame_dump;
pub mod obj_loader;
