mod service;

pub use service::RefreshTimer;
