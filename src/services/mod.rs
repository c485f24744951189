pub mod analysis;
pub mod insights;
pub mod remote;
pub mod session;
pub mod stats;
pub mod tabular;
pub mod visualization;
