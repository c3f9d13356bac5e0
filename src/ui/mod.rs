pub mod hit_map;
pub mod modal_stack;
pub mod render;
pub mod text_input;
pub mod theme;
