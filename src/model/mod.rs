pub mod board;
pub mod issue;
pub mod progress;
pub mod team;
