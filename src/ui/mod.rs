/// UI module exports
pub mod board;
pub mod components;
pub mod editor;
