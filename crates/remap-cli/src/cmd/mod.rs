pub mod confirm;
pub mod entry;
pub mod init;
pub mod inventory;
pub mod matching;
pub mod plan;
pub mod signals;
pub mod status;
pub mod topics;
pub mod waves;
