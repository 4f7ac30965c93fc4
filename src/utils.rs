use std::{
    cell::Cell,
    time::{SystemTime, UNIX_EPOCH},
};

/// Sets a flag for the lifetime of the guard.
///
/// The flag is cleared on drop, including while unwinding from a panicking callback.
pub(crate) struct FlagGuard<'a>(&'a Cell<bool>);

impl<'a> FlagGuard<'a> {
    /// Returns `None` if the flag is already set.
    pub fn try_set(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}
impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
