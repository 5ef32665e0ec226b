pub mod schedule_registry;
