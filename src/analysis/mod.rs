pub mod metrics;
pub mod validator;

pub use metrics::compute_metrics;
pub use validator::{validate, Validation};
