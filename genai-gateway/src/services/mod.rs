pub mod dispatcher;
pub mod metrics;
pub mod normalizer;
pub mod providers;

pub use dispatcher::{DispatchError, Dispatcher};
pub use normalizer::normalize;
