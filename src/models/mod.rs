pub mod menu;
pub mod notification;
pub mod order;
pub mod staff;
pub mod table;
pub mod tenant;
