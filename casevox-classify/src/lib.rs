pub mod client;
pub mod types;

// Re-export public APIs
pub use client::{ClassifierClient, ClassifierConfig, Classify};
pub use types::{Classification, ClassifierExplanation};
