pub mod extraction;
pub mod observability;
pub mod runtime;
pub mod storage;
