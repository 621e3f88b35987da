pub mod google_maps_repo;
pub mod maps_repo;
