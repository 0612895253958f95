pub mod api;
pub mod customer;
pub mod invoice;
pub mod kanban;
pub mod main;
pub mod portal;
pub mod settings;
pub mod team;
pub mod vehicle;
pub mod vendors;
