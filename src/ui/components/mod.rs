pub mod chapter_list;
pub mod drill_area;
pub mod listening_panel;
pub mod menu;
pub mod progress_bar;
pub mod summary;
pub mod toast;
