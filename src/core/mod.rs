pub mod aggregation;
pub mod baseline;
pub mod normalisation;
pub mod regression;
pub mod units;
pub mod validation;
