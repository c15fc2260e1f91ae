pub mod bidding;
pub mod dispatch;
pub mod ingest;
pub mod queue;
pub mod tracking;
