pub mod access_type;
