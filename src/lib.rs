pub mod backend;
pub mod config;
pub mod debounce;
pub mod notify;
pub mod output;
pub mod session;

pub use config::ControllerConfig;
pub use session::{SessionController, SessionState, UiEvent};
