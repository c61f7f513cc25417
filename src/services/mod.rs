pub mod audit;
pub mod credential;
pub mod directory;
pub mod metrics;
pub mod provisioner;
pub mod reconciler;
