pub mod actuators;
pub mod apa102;
pub mod column_clock;
pub mod time_source;
pub mod watchdog;
