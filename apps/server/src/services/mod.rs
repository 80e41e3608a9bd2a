pub mod notification;

pub use notification::{
    create_dispatcher, ChannelDispatcher, DispatchOutcome, HipChatClient, HipChatDispatcher,
    HipChatResponse, SmsDispatcher,
};
