pub mod event;
pub mod notification;

pub use event::{Channel, InboundEvent, LegacyPress, REQUIRED_FIELDS};
pub use notification::{
    Color, MessageFormat, NotificationRequest, MAX_MESSAGE_CHARS, MIN_MESSAGE_CHARS,
};
