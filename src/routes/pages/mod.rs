mod handler;

pub use handler::{
    dashboard, expense_submit, login_page, login_submit, logout_submit, manifest, register_page,
    register_submit,
};
