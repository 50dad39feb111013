pub mod poller;
pub mod storage;

pub use poller::Poller;
