pub mod recognition;
pub mod request;
pub mod response;
