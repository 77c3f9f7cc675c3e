pub mod fetcher;
pub mod matcher;
pub mod recency;
pub mod scheduler;
pub mod scout;
pub mod sources;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
