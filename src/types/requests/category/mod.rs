pub mod category_request;
