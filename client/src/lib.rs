pub mod fog;
pub mod init;
pub mod world;
