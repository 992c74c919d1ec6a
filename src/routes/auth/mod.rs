mod handler;
mod model;

pub use handler::{authenticate, login, logout, register};
pub use model::{LoginResponse, MessageResponse};
