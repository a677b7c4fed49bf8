pub(crate) mod admin_panel;
pub(crate) mod auth_panel;
pub(crate) mod problem_board;
pub(crate) mod problem_form;
