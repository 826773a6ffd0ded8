use crate::error::Result;
use crate::vcs::{Context, Vcs};

/// Holds the caller's original checkout while a transfer runs on the
/// destination branch, and puts it back when dropped.
///
/// If the original context already is the destination, no checkout happens
/// on entry or on exit. Restoration is skipped, with a warning, while a
/// cherry-pick or rebase is stopped mid-way.
pub struct ContextGuard<'a, V: Vcs + ?Sized> {
    vcs: &'a V,
    original: Context,
    switched: bool,
}

impl<'a, V: Vcs + ?Sized> ContextGuard<'a, V> {
    /// Switches to `dest` unless `original` already is that branch.
    pub fn enter(vcs: &'a V, original: Context, dest: &str) -> Result<Self> {
        let switched = if original.is_branch(dest) {
            false
        } else {
            log::info!("switching from {} to {}", original, dest);
            vcs.checkout(dest)?;
            true
        };

        Ok(ContextGuard {
            vcs,
            original,
            switched,
        })
    }

    pub fn original(&self) -> &Context {
        &self.original
    }

    /// Whether entering required a checkout.
    #[cfg(test)]
    pub fn switched(&self) -> bool {
        self.switched
    }

    /// Restores the original context now, reporting failure to the caller.
    pub fn restore(mut self) -> Result<()> {
        self.switch_back()
    }

    fn switch_back(&mut self) -> Result<()> {
        if !self.switched {
            return Ok(());
        }
        self.switched = false;

        if self.vcs.operation_in_progress() {
            log::warn!(
                "an operation is in progress; staying here instead of returning to {}",
                self.original
            );
            return Ok(());
        }

        log::info!("returning to {}", self.original);
        self.vcs.checkout(self.original.checkout_target())
    }
}

impl<V: Vcs + ?Sized> Drop for ContextGuard<'_, V> {
    fn drop(&mut self) {
        if let Err(e) = self.switch_back() {
            log::warn!("could not return to {}: {}", self.original, e);
        }
    }
}
