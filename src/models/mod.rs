pub mod credential;
pub mod provision;
pub mod tenant;
