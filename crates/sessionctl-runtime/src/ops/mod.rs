pub mod continuation;
pub mod delete;
pub mod export;
pub mod find;
pub mod index;
pub mod smart_trim;
