//! Pure data structures. [`Order`] implements the [`ActorEntity`](crate::framework::ActorEntity) trait.

pub mod menu;
pub mod order;

pub use menu::*;
pub use order::*;
