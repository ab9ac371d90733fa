pub mod pages;
pub mod plot;
