pub mod account;
pub mod entries;
pub mod init;
pub mod journals;
pub mod maintenance;
pub mod misc;
