pub mod attendance;
pub mod customer;
pub mod notification;

pub use attendance::AttendanceRecord;
pub use customer::Customer;
pub use notification::Notification;
