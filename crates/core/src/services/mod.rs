pub mod analytics_service;
pub mod api_service;
pub mod transaction_service;
