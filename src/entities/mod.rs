pub mod country;
pub mod externals;
pub mod genre;
pub mod network;
pub mod rating;
pub mod show;
pub mod show_genre;
