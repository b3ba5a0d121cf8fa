pub mod error;
pub mod multipart;
pub mod slug;
pub mod storage;
