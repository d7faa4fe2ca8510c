pub mod controller;
pub mod events;
pub mod poller;
pub mod state;

pub use controller::SessionController;
pub use events::UiEvent;
pub use state::{ControllerState, SessionState};
