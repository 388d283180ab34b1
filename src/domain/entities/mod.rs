pub mod column;
pub mod list_query;
pub mod query_params;
pub mod row;
