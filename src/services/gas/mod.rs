pub mod estimator;
pub mod types;

pub use estimator::GasEstimator;
pub use types::{FeeEstimate, TxType};
