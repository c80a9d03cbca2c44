pub mod clock;
pub mod config;
pub mod coordinator;
pub mod db;
pub mod record;
pub mod sensor;
pub mod telemetry;
