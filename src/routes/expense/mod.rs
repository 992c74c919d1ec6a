mod handler;

pub use handler::create_expense;
