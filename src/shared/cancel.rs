/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::errors::Cancelled;

/**
 * Owner side of a cooperative shutdown signal.
 *
 * Nothing is ever sent on the channel. Cancelling drops the only sender, which wakes every
 * receiver at once with a disconnect, so a single source can stop any number of loops.
 */
pub struct CancelSource {
    tx: Option<cbc::Sender<()>>,
    rx: cbc::Receiver<()>,
}

/// Observer side of a [`CancelSource`]. Cheap to clone, one per loop.
#[derive(Clone, Debug)]
pub struct CancelToken {
    rx: cbc::Receiver<()>,
}

impl CancelSource {
    pub fn new() -> CancelSource {
        let (tx, rx) = cbc::bounded::<()>(0);
        CancelSource { tx: Some(tx), rx }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken { rx: self.rx.clone() }
    }

    pub fn cancel(&mut self) {
        self.tx.take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.tx.is_none()
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        CancelSource::new()
    }
}

impl CancelToken {
    /// A token with no source; it never fires.
    pub fn never() -> CancelToken {
        CancelToken { rx: cbc::never() }
    }

    pub fn is_cancelled(&self) -> bool {
        !matches!(self.rx.try_recv(), Err(cbc::TryRecvError::Empty))
    }

    /// Suspends for `duration`, returning early with `Cancelled` if the source fires.
    pub fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        match self.rx.recv_timeout(duration) {
            Err(cbc::RecvTimeoutError::Timeout) => Ok(()),
            _ => Err(Cancelled),
        }
    }

    /// For use in `select!`: becomes ready once the source is cancelled.
    pub fn receiver(&self) -> &cbc::Receiver<()> {
        &self.rx
    }
}

/***************************************/
/*             Unit tests              */
/***************************************/
