pub mod complaint;
pub mod evaluation;
pub mod hackathon;
pub mod team;
pub mod theme;
pub mod timeline_slot;
pub mod user;
