pub mod category;
pub mod lenient;
pub mod report;
pub mod session;
pub mod transaction;
pub mod user;
