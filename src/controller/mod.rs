//! Toast sequencer.
//!
//! [`Toastify`] owns the queue, the injected styles, the container and one
//! [`Session`]. Reveals run on tokio tasks that hold a weak reference to the
//! controller and the id of the session that spawned them, so a task outliving
//! its session does nothing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::Result;
use crate::animation::{AnimationList, keyframes};
use crate::error::Error;
use crate::host::{ElementId, HostSurface, StyleId};
use crate::markup::{ContainerMarkup, ToastMarkup};
use crate::types::{ControllerState, Delays, Message, ToastifyOptions};

mod reveal;
mod session;

use session::Session;

/// Viewports at or below this width use the mobile reveal.
pub const MOBILE_BREAKPOINT_PX: u32 = 640;
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
struct Toast {
    element: ElementId,
    animation: AnimationList,
}

#[derive(Debug)]
struct Inner {
    messages: Vec<Message>,
    delays: Delays,
    toasts: Vec<Toast>,
    container: Option<ElementId>,
    styles: Vec<StyleId>,
    session: Session,
    initialized: bool,
    busy: bool,
    /// Bumped by `destroy`; an `init` whose generation moved on is discarded.
    generation: u64,
}

impl Inner {
    fn state(&self) -> ControllerState {
        if self.session.is_running() {
            if self.session.current_index() >= self.messages.len() {
                ControllerState::Draining
            } else {
                ControllerState::Running
            }
        } else if self.initialized {
            ControllerState::Initialized
        } else {
            ControllerState::Idle
        }
    }
}

struct Shared<H> {
    host: Arc<H>,
    inner: Mutex<Inner>,
    state: watch::Sender<ControllerState>,
    image_timeout: Duration,
}

impl<H> Drop for Shared<H> {
    fn drop(&mut self) {
        self.inner
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .session
            .abort_timers();
    }
}

/// Handle to a toast sequencer. Clones share the same controller.
pub struct Toastify<H> {
    shared: Arc<Shared<H>>,
}

impl<H> Clone for Toastify<H> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Clears the busy flag when an `init` or `update` ends, even if it is dropped.
struct BusyGuard<'a, H> {
    shared: &'a Shared<H>,
}

impl<H> Drop for BusyGuard<'_, H> {
    fn drop(&mut self) {
        self.shared.lock().busy = false;
    }
}

impl<H> Shared<H> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        let next = inner.state();
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    fn acquire(&self) -> Result<BusyGuard<'_, H>> {
        let mut inner = self.lock();
        if inner.busy {
            return Err(Error::Busy);
        }
        inner.busy = true;
        Ok(BusyGuard { shared: self })
    }
}

impl<H: HostSurface> Toastify<H> {
    #[must_use]
    pub fn new(host: Arc<H>) -> Self {
        Self::with_image_timeout(host, DEFAULT_IMAGE_TIMEOUT)
    }

    /// Like [`Toastify::new`], bounding each image load by `image_timeout`.
    #[must_use]
    pub fn with_image_timeout(host: Arc<H>, image_timeout: Duration) -> Self {
        let (state, _) = watch::channel(ControllerState::Idle);
        Self {
            shared: Arc::new(Shared {
                host,
                inner: Mutex::new(Inner {
                    messages: Vec::new(),
                    delays: Delays::default(),
                    toasts: Vec::new(),
                    container: None,
                    styles: Vec::new(),
                    session: Session::default(),
                    initialized: false,
                    busy: false,
                    generation: 0,
                }),
                state,
                image_timeout,
            }),
        }
    }

    #[must_use]
    pub fn host(&self) -> &Arc<H> {
        &self.shared.host
    }

    /// Stores the queue, injects styles and keyframes, creates the container
    /// and builds one element per message once its image has loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] while another `init`/`update` is in flight,
    /// a host error if the keyframes are rejected or an image fails,
    /// [`Error::ImageTimeout`] if an image does not load in time, and
    /// [`Error::Cancelled`] if `destroy` runs before the toasts are built. On
    /// error, everything created so far is torn down.
    pub async fn init(&self, options: ToastifyOptions) -> Result<()> {
        let _busy = self.shared.acquire()?;
        self.init_locked(options).await
    }

    async fn init_locked(&self, options: ToastifyOptions) -> Result<()> {
        let (generation, markups) = match self.prepare(options) {
            Ok(prepared) => prepared,
            Err(err) => {
                self.destroy();
                return Err(err);
            }
        };

        let mut built = Vec::with_capacity(markups.len());
        for (index, markup) in markups.iter().enumerate() {
            match self.build_toast(index, markup).await {
                Ok(element) => built.push(Toast {
                    element,
                    animation: AnimationList::default(),
                }),
                Err(err) => {
                    warn!(index, error = %err, "toast construction failed; rolling back init");
                    self.destroy();
                    return Err(err);
                }
            }
            if self.shared.lock().generation != generation {
                return Err(self.discard(&built));
            }
        }

        let mut inner = self.shared.lock();
        if inner.generation != generation {
            drop(inner);
            return Err(self.discard(&built));
        }
        inner.toasts = built;
        info!(messages = inner.messages.len(), "toastify initialized");
        self.shared.publish(&inner);
        Ok(())
    }

    /// Drops elements built by an `init` that `destroy` overtook.
    fn discard(&self, built: &[Toast]) -> Error {
        for toast in built {
            self.shared.host.remove(toast.element);
        }
        debug!(built = built.len(), "init overtaken by destroy; discarding toasts");
        Error::Cancelled
    }

    fn prepare(&self, options: ToastifyOptions) -> Result<(u64, Vec<ToastMarkup>)> {
        let host = &self.shared.host;
        let mut inner = self.shared.lock();
        if inner.session.is_running() {
            debug!("init called while running; stopping current session");
            Self::stop_locked(host.as_ref(), &mut inner);
        }

        inner.messages = options.messages;
        inner.delays.apply(&options.delays);
        inner.toasts.clear();
        inner.initialized = true;

        if let Some(styles) = options.styles.as_deref().filter(|css| !css.trim().is_empty()) {
            let style = host.append_style(styles);
            inner.styles.push(style);
        }

        let sheet = host.append_style("");
        inner.styles.push(sheet);
        host.insert_rules(sheet, &keyframes(inner.messages.len()))?;

        let attached = inner
            .container
            .is_some_and(|container| host.is_attached(container));
        if !attached {
            inner.container = Some(host.create_container(&ContainerMarkup::default()));
        }

        self.shared.publish(&inner);
        let markups = inner
            .messages
            .iter()
            .enumerate()
            .map(|(index, message)| ToastMarkup::new(index, message))
            .collect();
        Ok((inner.generation, markups))
    }

    async fn build_toast(&self, index: usize, markup: &ToastMarkup) -> Result<ElementId> {
        let host = Arc::clone(&self.shared.host);
        let after = self.shared.image_timeout;
        match timeout(after, host.load_image(&markup.image)).await {
            Ok(Ok(())) => Ok(host.create_toast(markup)),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(Error::ImageTimeout {
                index,
                src: markup.image.clone(),
                after,
            }),
        }
    }

    /// Starts revealing the queue. No-op while running, with an empty queue,
    /// or before `init` has built every toast.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(&self) {
        let mut inner = self.shared.lock();
        if inner.session.is_running() {
            debug!("run ignored: session already running");
            return;
        }
        if inner.messages.is_empty() {
            debug!("run ignored: no messages");
            return;
        }
        if inner.toasts.len() != inner.messages.len() {
            debug!(
                built = inner.toasts.len(),
                messages = inner.messages.len(),
                "run ignored: init still in progress"
            );
            return;
        }

        let session = inner.session.start();
        let delays = inner.delays;
        let handle = tokio::spawn(reveal::reveal_chain(
            Arc::downgrade(&self.shared),
            session,
            delays.start_after(),
            delays.display_interval(),
        ));
        inner.session.track(handle);
        info!(
            %session,
            messages = inner.messages.len(),
            start_after_ms = delays.start_after().as_millis(),
            interval_ms = delays.display_interval().as_millis(),
            "session started"
        );
        self.shared.publish(&inner);
    }

    /// Cancels pending reveals and removes every mounted toast. Keeps the
    /// container and styles.
    pub fn stop(&self) {
        let mut inner = self.shared.lock();
        if Self::stop_locked(self.shared.host.as_ref(), &mut inner) {
            self.shared.publish(&inner);
        }
    }

    fn stop_locked(host: &H, inner: &mut Inner) -> bool {
        let Some(session) = inner.session.id() else {
            return false;
        };
        inner.session.abort_timers();
        for index in inner.session.take_mounted() {
            if let Some(toast) = inner.toasts.get(index) {
                host.remove(toast.element);
            }
        }
        inner.session.reset();
        info!(%session, "session stopped");
        true
    }

    /// Stops, then removes the container, the injected styles and the queue.
    pub fn destroy(&self) {
        let host = self.shared.host.as_ref();
        let mut inner = self.shared.lock();
        Self::stop_locked(host, &mut inner);

        if let Some(container) = inner.container.take() {
            host.remove(container);
        }
        for style in inner.styles.drain(..) {
            host.remove_style(style);
        }
        inner.messages.clear();
        inner.toasts.clear();
        inner.initialized = false;
        inner.generation += 1;
        debug!("toastify destroyed");
        self.shared.publish(&inner);
    }

    /// `destroy`, `init` and `run` as one step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if another `init`/`update` is in flight, and any
    /// error of [`Toastify::init`]; `run` is skipped on error.
    pub async fn update(&self, options: ToastifyOptions) -> Result<()> {
        let _busy = self.shared.acquire()?;
        self.destroy();
        self.init_locked(options).await?;
        self.run();
        Ok(())
    }

    #[must_use]
    pub fn running(&self) -> bool {
        self.shared.lock().session.is_running()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.shared.lock().messages.clone()
    }

    #[must_use]
    pub fn messages_count(&self) -> usize {
        self.shared.lock().messages.len()
    }

    #[must_use]
    pub fn delays(&self) -> Delays {
        self.shared.lock().delays
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.shared.lock().state()
    }

    /// Reveal and fade tasks still scheduled for the current session.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.shared.lock().session.pending_timers()
    }

    /// Elements built by the last `init`, by message index.
    #[must_use]
    pub fn elements(&self) -> Vec<ElementId> {
        self.shared
            .lock()
            .toasts
            .iter()
            .map(|toast| toast.element)
            .collect()
    }

    #[must_use]
    pub fn container(&self) -> Option<ElementId> {
        self.shared.lock().container
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.shared.state.subscribe()
    }
}
