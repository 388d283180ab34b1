use crate::domain::entities::query_params::QueryParams;

/// Reads and rewrites the current location without a full reload.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn current_params(&self) -> QueryParams;
    fn replace_location(&self, path_with_query: &str);
}
