pub mod cafe;
pub mod place;
