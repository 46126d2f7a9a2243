//! Feature preprocessing

pub mod scaler;

pub use scaler::StandardScaler;
