pub mod plan;
pub mod request;
pub mod tone;
