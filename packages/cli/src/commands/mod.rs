pub mod export;
pub mod init;

pub use export::{export, ExportArgs};
pub use init::{init, InitArgs};
