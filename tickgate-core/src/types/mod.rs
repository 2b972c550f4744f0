mod message;
mod primitives;
mod request;

pub use message::*;
pub use primitives::*;
pub use request::*;
