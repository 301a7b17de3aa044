pub mod guard;
pub mod queue;
