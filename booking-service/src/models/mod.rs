pub mod booking;
pub mod user;
pub mod wallet;

pub use booking::{commission_for, default_price, Booking, BookingStatus, ServiceCategory};
pub use user::{Role, User};
pub use wallet::{Direction, WalletEntry, WALLET_LOG_CAP};
