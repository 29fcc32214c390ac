mod helpers;

mod admin;
mod orders;
