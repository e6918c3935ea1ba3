pub mod cli;
pub mod core;
pub mod refresher;
pub mod scheduler;
pub mod server;

pub use crate::core::models::{RefreshOutcome, TicketRecord};
pub use crate::core::settings::Settings;
pub use crate::core::store::TicketStore;
pub use crate::refresher::Refresher;
