pub mod fanout;
pub mod inbox;

pub use fanout::{FanoutService, NotificationCommand, Recipient};
pub use inbox::InboxService;
