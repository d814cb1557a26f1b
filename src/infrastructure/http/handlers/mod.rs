//! HTTP Handlers

mod export;
mod generation;
mod ping;
mod project;
mod section;
mod websocket;
mod workspace;

pub use export::*;
pub use generation::*;
pub use ping::*;
pub use project::*;
pub use section::*;
pub use websocket::*;
pub use workspace::*;
