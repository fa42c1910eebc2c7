pub mod bus;
pub mod context;

pub use bus::{ChangeBus, ChangeEvent, Channel, HandlerGuard, Payload, Subscription};
pub use context::Context;
