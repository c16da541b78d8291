pub mod capabilities;
pub mod collections;
pub mod identity;
pub mod options;
pub mod types;
