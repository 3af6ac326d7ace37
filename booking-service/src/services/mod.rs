pub mod booking;
pub mod repository;
pub mod store;
pub mod wallet;

pub use booking::{BookingService, NewBooking};
pub use repository::MarketplaceRepository;
pub use store::{InMemoryStore, JsonFileStore, Snapshot, SnapshotStore};
pub use wallet::WalletService;
