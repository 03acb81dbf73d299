pub mod available_slots;
pub mod beacon_position;
pub mod objective_list;
pub mod observation;
pub mod response_common;
pub mod shoot_image;
