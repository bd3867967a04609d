//! An in-memory carrier pair for tests, standing in for a bound UDP socket
//! without touching the network (binding addresses and blocking semantics are
//! out of scope for this crate; see [`crate::net::carrier::Carrier`]).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::net::carrier::Carrier;
use crate::net::error::CarrierError;

type Queue = Rc<RefCell<VecDeque<Vec<u8>>>>;

/// One end of an in-memory datagram pipe. Create a connected pair with [`LoopbackCarrier::pair`].
pub struct LoopbackCarrier {
    outbox: Queue,
    inbox: Queue,
}

impl LoopbackCarrier {
    /// Build two carriers, each other's peer: datagrams sent on one side show
    /// up, unmodified and in order, on the other's [`Carrier::recv`].
    pub fn pair() -> (LoopbackCarrier, LoopbackCarrier) {
        let a_to_b = Rc::new(RefCell::new(VecDeque::new()));
        let b_to_a = Rc::new(RefCell::new(VecDeque::new()));
        let a = LoopbackCarrier { outbox: a_to_b.clone(), inbox: b_to_a.clone() };
        let b = LoopbackCarrier { outbox: b_to_a, inbox: a_to_b };
        (a, b)
    }
}

impl Carrier for LoopbackCarrier {
    fn send(&mut self, data: &[u8]) -> Result<(), CarrierError> {
        self.outbox.borrow_mut().push_back(data.to_vec());
        Ok(())
    }

    fn recv(&mut self) -> Result<Option<Vec<u8>>, CarrierError> {
        Ok(self.inbox.borrow_mut().pop_front())
    }
}
