pub mod actor;

pub use actor::{ActorContext, ACTOR_PHONE_HEADER};
