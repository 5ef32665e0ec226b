pub mod desktop;
pub mod platform;
