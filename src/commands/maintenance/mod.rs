pub mod schedule_maintenance_command;

pub use schedule_maintenance_command::ScheduleMaintenanceCommand;
