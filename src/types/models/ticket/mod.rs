pub mod reply_author;
pub mod ticket_category;
pub mod ticket_priority;
pub mod ticket_status;
