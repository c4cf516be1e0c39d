use crate::error::{Result, TerminalError};
use crate::surface::{Surface, ViewportSize};
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Attached,
    Disposed,
}

enum Lifecycle<S> {
    Uninitialized,
    Attached {
        surface: S,
        /// Live container dimensions. Holding the receiver is what keeps the
        /// resize observation active.
        container: watch::Receiver<ViewportSize>,
    },
    Disposed,
}

/// Owns one rendering surface for the lifetime of a session.
pub struct ViewportController<S: Surface> {
    state: Lifecycle<S>,
}

impl<S: Surface> Default for ViewportController<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Surface> ViewportController<S> {
    pub fn new() -> Self {
        Self {
            state: Lifecycle::Uninitialized,
        }
    }

    pub fn state(&self) -> LifecycleState {
        match self.state {
            Lifecycle::Uninitialized => LifecycleState::Uninitialized,
            Lifecycle::Attached { .. } => LifecycleState::Attached,
            Lifecycle::Disposed => LifecycleState::Disposed,
        }
    }

    /// Whether container size changes are being observed. True iff attached.
    pub fn is_observing_resize(&self) -> bool {
        matches!(self.state, Lifecycle::Attached { .. })
    }

    /// Bind `surface` and start observing `container`, fitting the surface to
    /// the container's current size.
    pub fn attach(&mut self, mut surface: S, container: watch::Receiver<ViewportSize>) -> Result<()> {
        match self.state {
            Lifecycle::Uninitialized => {}
            Lifecycle::Attached { .. } => return Err(TerminalError::AlreadyAttached),
            Lifecycle::Disposed => return Err(TerminalError::Disposed),
        }

        let size = *container.borrow();
        surface.fit(size)?;
        debug!("Viewport attached at {}x{}", size.cols, size.rows);
        self.state = Lifecycle::Attached { surface, container };
        Ok(())
    }

    /// Fail unless a surface is attached.
    pub fn ensure_attached(&self) -> Result<()> {
        match self.state {
            Lifecycle::Attached { .. } => Ok(()),
            Lifecycle::Uninitialized => Err(TerminalError::NotAttached),
            Lifecycle::Disposed => Err(TerminalError::Disposed),
        }
    }

    fn attached(&mut self) -> Result<(&mut S, &mut watch::Receiver<ViewportSize>)> {
        match &mut self.state {
            Lifecycle::Attached { surface, container } => Ok((surface, container)),
            Lifecycle::Uninitialized => Err(TerminalError::NotAttached),
            Lifecycle::Disposed => Err(TerminalError::Disposed),
        }
    }

    /// Append `text` followed by a line break and keep the end in view.
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        let (surface, _) = self.attached()?;
        surface.write(text)?;
        surface.write("\r\n")?;
        surface.scroll_to_bottom()
    }

    /// Append `text` as-is: keystroke echo, erase sequences, prompts. Also
    /// keeps the end in view.
    pub fn echo(&mut self, text: &str) -> Result<()> {
        let (surface, _) = self.attached()?;
        surface.write(text)?;
        surface.scroll_to_bottom()
    }

    /// Refit to the container's latest size and scroll to the end.
    pub fn on_resize(&mut self) -> Result<()> {
        let (surface, container) = self.attached()?;
        let size = *container.borrow_and_update();
        surface.fit(size)?;
        surface.scroll_to_bottom()
    }

    /// Release the surface and stop observing the container. Safe to call in
    /// any state; only the first call from `Attached` does any work.
    pub fn dispose(&mut self) {
        let previous = std::mem::replace(&mut self.state, Lifecycle::Disposed);
        if let Lifecycle::Attached { mut surface, container } = previous {
            if let Err(e) = surface.release() {
                warn!("Releasing viewport surface failed: {}", e);
            }
            drop(container);
            debug!("Viewport disposed");
        }
    }
}
