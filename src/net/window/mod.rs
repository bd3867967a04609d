//! Fixed-capacity ring windows: arena+index rather than pointer-chasing
//! queues. The sequence number itself is the handle into a flat slot array.

mod sender;
mod receiver;

pub use sender::SenderWindow;
pub use receiver::ReceiverWindow;
