pub mod issue;
pub mod journey;
pub mod ops;
pub mod session;
pub mod vehicle;
