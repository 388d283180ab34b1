pub mod fetch;
pub mod navigation;
