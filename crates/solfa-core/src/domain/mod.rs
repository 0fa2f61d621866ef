pub mod genre;
pub mod ids;
pub mod patch;
pub mod song;
pub mod user;

pub use ids::{AdminId, GenreId, SongId, UserId};
pub use patch::Field;
