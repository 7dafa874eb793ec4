pub mod activity_query;
