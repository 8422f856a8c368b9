pub mod agent_move;
pub mod arrive_at_dropoff;
pub mod arrive_at_resource;
pub mod dispatch_epoch;
pub mod resource_announce;
pub mod resource_expire;
