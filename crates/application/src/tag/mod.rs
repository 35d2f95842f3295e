mod actor;
mod manager;

pub use actor::{LightMode, TagActor, TagCommand, TagHandle};
pub use manager::TagManager;
