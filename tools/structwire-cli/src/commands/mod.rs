pub mod encode;
pub mod schema;
pub mod show;
pub mod transcode;
