pub mod icon_resolver;
pub mod scheduler;
