pub mod admins;
pub mod genres;
pub mod songs;
pub mod users;
