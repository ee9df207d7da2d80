pub mod init;
pub mod scheduling;
pub mod zoom;
