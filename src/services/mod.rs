pub mod database;
pub mod memory;
pub mod reconciler;
pub mod store;

// 重新导出常用类型
pub use database::Database;
pub use memory::InMemoryStore;
pub use reconciler::{Reconciler, ReconcilerOptions, RunReport};
pub use store::RecordStore;
