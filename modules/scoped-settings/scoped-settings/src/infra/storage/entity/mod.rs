pub mod path_type;
pub mod setting;
