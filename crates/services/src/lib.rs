pub mod subscription;
pub mod types;

pub use types::TenantId;
