pub mod cloudconvert;
pub mod storage;
