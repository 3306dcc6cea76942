pub mod contact;
pub mod page_cache;
pub mod social;
