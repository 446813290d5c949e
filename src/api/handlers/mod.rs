pub mod activities;
pub mod members;
pub mod registrations;
pub mod root;
pub mod settings;
pub mod statistics;
