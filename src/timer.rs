//! Real-time sleep used by [`Scheduler::run_realtime`](crate::Scheduler::run_realtime).
//!
//! A pending [`Sleep`] parks one helper thread until its deadline, so it works on any executor.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    task::{Context, Poll},
    thread::{self, Thread},
    time::{Duration, Instant},
};

use futures::task::AtomicWaker;


#[derive(Default)]
struct Signal {
    fired: AtomicBool,
    canceled: AtomicBool,
    waker: AtomicWaker,
}

struct Alarm {
    signal: Arc<Signal>,
    thread: Thread,
}

impl Alarm {
    fn start(deadline: Instant) -> Self {
        let signal = Arc::new(Signal::default());
        let s = signal.clone();
        let handle = thread::spawn(move || {
            loop {
                if s.canceled.load(Ordering::Acquire) {
                    return;
                }
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                thread::park_timeout(deadline - now);
            }
            s.fired.store(true, Ordering::Release);
            s.waker.wake();
        });
        Self {
            signal,
            thread: handle.thread().clone(),
        }
    }
}
impl Drop for Alarm {
    fn drop(&mut self) {
        self.signal.canceled.store(true, Ordering::Release);
        self.thread.unpark();
    }
}

/// Future returned by [`sleep`] and [`sleep_until`].
#[must_use = "futures do nothing unless polled"]
pub struct Sleep {
    deadline: Instant,
    alarm: Option<Alarm>,
}

impl Future for Sleep {
    type Output = ();
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if Instant::now() >= this.deadline {
            this.alarm = None;
            return Poll::Ready(());
        }
        let deadline = this.deadline;
        let alarm = this.alarm.get_or_insert_with(|| Alarm::start(deadline));
        alarm.signal.waker.register(cx.waker());
        if alarm.signal.fired.load(Ordering::Acquire) {
            this.alarm = None;
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

pub fn sleep(duration: Duration) -> Sleep {
    sleep_until(Instant::now() + duration)
}

/// Completes once `deadline` has passed. A deadline in the past completes on the first poll.
pub fn sleep_until(deadline: Instant) -> Sleep {
    Sleep {
        deadline,
        alarm: None,
    }
}
