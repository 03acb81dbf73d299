use super::http_response::{
    available_slots, beacon_position, objective_list, observation, response_common, shoot_image,
};

pub mod announcements_get;
pub mod available_slots_get;
pub mod beacon_position_put;
pub mod control_put;
pub mod modify_slot_put;
pub mod objective_image_post;
pub mod objective_list_get;
pub mod observation_get;
pub mod request_common;
pub mod shoot_image_get;
