pub mod audit;
pub mod ban_list;
pub mod controls;
pub mod dialogs;
pub mod form;
pub mod selection;
