//! HTTP Handlers

mod chapter;
mod merge_request;
mod novel;
mod ping;
mod user;
mod websocket;

pub use chapter::*;
pub use merge_request::*;
pub use novel::*;
pub use ping::*;
pub use user::*;
pub use websocket::*;
