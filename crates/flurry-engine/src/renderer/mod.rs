pub mod color;
pub mod manager;
pub mod traits;
pub mod vector;
