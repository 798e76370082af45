pub mod appointments_view;
pub mod create_view;
pub mod export;
