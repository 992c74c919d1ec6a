mod common;
mod transaction;
mod user;

pub use common::RecordId;
pub use transaction::{Category, NewExpense, Transaction};
pub use user::User;
