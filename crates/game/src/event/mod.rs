mod queue;
mod types;

pub use queue::{DispatchSender, Dispatcher};
pub use types::NetworkEvent;
