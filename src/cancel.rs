//! Cancellation signal shared by every worker and the aggregator.
//!
//! The signal is a broadcast channel carrying a unit value: the run
//! controller sends exactly once, workers observe it non-blockingly at the
//! top of each iteration.
use tokio::sync::broadcast;

pub type CancelSender = broadcast::Sender<()>;
pub type CancelReceiver = broadcast::Receiver<()>;
