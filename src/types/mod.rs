pub mod imaging;
pub mod payload;
