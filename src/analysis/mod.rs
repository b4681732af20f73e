//! The extraction pipeline: filter, classifier, builder, propagator.

pub mod builder;
pub mod classify;
pub mod filter;
pub mod propagate;

pub use builder::build_graph;
pub use classify::classify_return_value;
pub use filter::is_step_function;
pub use propagate::propagate;
