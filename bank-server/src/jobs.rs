mod sweep_sessions;

pub use sweep_sessions::SweepSessions;
