//! UI components for Stickynote

pub mod editor;
pub mod note_manager;
pub mod settings;
