pub mod audio;
pub mod config;
pub mod constants;
pub mod entities;
pub mod game;
pub mod highscores;
pub mod input;
pub mod rendering;
pub mod rules;
pub mod types;
pub mod world;
