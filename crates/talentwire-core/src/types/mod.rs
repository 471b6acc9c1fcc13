//! Common type definitions.

pub mod channel;
pub mod contact;
pub mod delivery;
pub mod identifiers;
pub mod message;

pub use channel::*;
pub use contact::*;
pub use delivery::*;
pub use identifiers::*;
pub use message::*;
