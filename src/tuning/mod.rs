pub mod fragments;
pub mod player;
pub mod weapons;
