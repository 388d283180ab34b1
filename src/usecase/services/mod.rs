pub mod cache;
pub mod column_annotator;
pub mod list_service;
pub mod navigation_sync;
pub mod pagination;
pub mod query_codec;
