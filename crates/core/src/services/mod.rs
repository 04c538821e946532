pub mod export_service;
pub mod filter_service;
pub mod goal_service;
pub mod summary_service;
pub mod taxonomy_service;
pub mod trend_service;
