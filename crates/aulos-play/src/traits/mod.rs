pub mod engine;
pub mod now_playing;
pub mod session;
