pub mod user_repo;
pub use user_repo::UserRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
