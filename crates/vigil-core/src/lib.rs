// vigil-core: Monitoring loop and alert-state engine between vigil-api
// and host environments (notification sinks, UI shells).

pub mod classify;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod model;
pub mod monitor;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use classify::classify;
pub use config::MonitorConfig;
pub use engine::{AlertEngine, ArmState};
pub use error::CoreError;
pub use model::{Alert, Category, Event};
pub use monitor::{Monitor, MonitorState};
pub use session::{Session, SessionStore};
