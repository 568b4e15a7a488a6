pub mod crash;
pub mod index;
pub mod info;
pub mod uid;
