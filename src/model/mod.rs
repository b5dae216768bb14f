//! Board entities, each implementing [`Entity`](crud_framework::persistence::Entity)
//! so it can live in a store actor.

pub mod consumer;
pub mod shout;

pub use consumer::*;
pub use shout::*;
