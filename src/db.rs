// src/db.rs

pub mod scope;

pub mod business_repo;
pub use business_repo::BusinessRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod category_repo;
pub use category_repo::CategoryRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod order_status_repo;
pub use order_status_repo::OrderStatusRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod appointment_repo;
pub use appointment_repo::AppointmentRepository;
