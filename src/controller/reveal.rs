use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Inner, MOBILE_BREAKPOINT_PX, Shared};
use crate::animation::{Animation, AnimationList, FADE_OUT};
use crate::host::{ElementId, HostSurface};

/// Gap between sliding the stack down and fading the new toast in.
const STACK_SETTLE: Duration = Duration::from_millis(300);

/// What happens once a toast's fade-out ends.
#[derive(Clone, Copy, Debug)]
enum FadeEnd {
    /// Remove this toast; optionally end the session.
    Detach { resets: bool },
    /// Remove every mounted toast and end the session.
    ClearAll,
}

/// Outcome of one reveal step.
#[derive(Clone, Copy, Debug)]
struct Revealed {
    index: usize,
    /// The toast mounts after [`STACK_SETTLE`].
    settles: bool,
    remaining: bool,
}

/// Reveals toast 0 after `start_after`, then each next one `interval` after
/// the previous reveal.
///
/// Desktop mounts that wait for the stack to settle are queued here rather
/// than on their own tasks, so mounts always happen in queue order. A mount
/// due at the same instant as a reveal runs first.
pub(super) async fn reveal_chain<H: HostSurface>(
    shared: Weak<Shared<H>>,
    session: Uuid,
    start_after: Duration,
    interval: Duration,
) {
    let mut next_reveal = Some(Instant::now() + start_after);
    let mut settling: VecDeque<(Instant, usize)> = VecDeque::new();

    loop {
        let mount_due = settling
            .front()
            .map(|(at, _)| *at)
            .filter(|at| next_reveal.is_none_or(|reveal_at| *at <= reveal_at));

        if let Some(at) = mount_due {
            sleep_until(at).await;
            let Some((_, index)) = settling.pop_front() else {
                return;
            };
            let Some(shared) = shared.upgrade() else {
                return;
            };
            if !shared.mount_settled(session, index) {
                return;
            }
            continue;
        }

        let Some(at) = next_reveal else {
            return;
        };
        sleep_until(at).await;
        let Some(shared) = shared.upgrade() else {
            return;
        };
        let Some(revealed) = shared.reveal_next(session) else {
            return;
        };
        if revealed.settles {
            settling.push_back((at + STACK_SETTLE, revealed.index));
        }
        next_reveal = revealed.remaining.then(|| at + interval);
    }
}

async fn await_fade_out<H: HostSurface>(
    shared: Weak<Shared<H>>,
    session: Uuid,
    index: usize,
    element: ElementId,
    then: FadeEnd,
) {
    let Some(host) = shared.upgrade().map(|shared| Arc::clone(&shared.host)) else {
        return;
    };
    host.animation_end(element, FADE_OUT).await;
    if let Some(shared) = shared.upgrade() {
        shared.finish_fade(session, index, then);
    }
}

impl<H: HostSurface> Shared<H> {
    /// Shows the toast at the session cursor and advances it. `None` once the
    /// session is no longer current.
    fn reveal_next(self: &Arc<Self>, session: Uuid) -> Option<Revealed> {
        let mut inner = self.lock();
        if !inner.session.is_current(session) {
            return None;
        }
        let index = inner.session.current_index();
        let settles = self.show_toast(&mut inner, session, index);
        let next = inner.session.advance();
        self.publish(&inner);
        Some(Revealed {
            index,
            settles,
            remaining: next < inner.messages.len(),
        })
    }

    /// Returns whether the toast still has to be mounted after the settle delay.
    fn show_toast(self: &Arc<Self>, inner: &mut Inner, session: Uuid, index: usize) -> bool {
        if index >= inner.messages.len() {
            return false;
        }
        if inner.toasts.get(index).is_none() {
            warn!(index, "toast element not built yet; skipping reveal");
            return false;
        }

        let width = self.host.viewport_width();
        debug!(%session, index, width, "revealing toast");
        if width <= MOBILE_BREAKPOINT_PX {
            self.show_mobile(inner, session, index);
            false
        } else {
            self.show_desktop(inner, session, index)
        }
    }

    fn show_desktop(self: &Arc<Self>, inner: &mut Inner, session: Uuid, index: usize) -> bool {
        if index == 0 {
            self.fade_in_and_mount(inner, 0);
            if inner.messages.len() == 1 {
                self.fade_out_and_remove(inner, session);
            }
            return false;
        }

        for previous in (0..index).rev() {
            if inner.session.is_mounted(previous) {
                self.set_animation(
                    inner,
                    previous,
                    AnimationList::single(Animation::SlideBottom(index - previous)),
                );
            }
        }

        true
    }

    /// Second half of a desktop reveal, once the stack has slid down.
    fn mount_settled(self: &Arc<Self>, session: Uuid, index: usize) -> bool {
        let mut inner = self.lock();
        if !inner.session.is_current(session) {
            return false;
        }
        self.fade_in_and_mount(&mut inner, index);
        if index + 1 == inner.messages.len() {
            self.fade_out_and_remove(&mut inner, session);
        }
        self.publish(&inner);
        true
    }

    fn show_mobile(self: &Arc<Self>, inner: &mut Inner, session: Uuid, index: usize) {
        let delays = inner.delays;
        let is_last = index + 1 == inner.messages.len();

        let mut animation = AnimationList::single(Animation::FadeInRight);
        if !delays.persists_last() || !is_last {
            let delay = if is_last {
                delays.fade_out()
            } else {
                delays.mobile_fade_out()
            };
            animation.push(Animation::FadeOut { delay });
        }
        self.set_animation(inner, index, animation);

        if !delays.persists_last() && is_last {
            self.listen_fade_out(inner, session, index, FadeEnd::ClearAll);
        }
        self.mount(inner, index);
    }

    /// Desktop cascade: every mounted toast fades out one `fade_out` after the
    /// previous one and is removed when its fade ends.
    fn fade_out_and_remove(self: &Arc<Self>, inner: &mut Inner, session: Uuid) {
        let fade_out = inner.delays.fade_out();
        if fade_out.is_zero() {
            return;
        }

        let mounted = inner.session.mounted().to_vec();
        let count = mounted.len();
        info!(%session, toasts = mounted.len(), fade_out_ms = fade_out.as_millis(), "starting fade-out cascade");

        let mut delay = fade_out;
        for (position, index) in mounted.into_iter().enumerate() {
            let Some(toast) = inner.toasts.get_mut(index) else {
                continue;
            };
            toast.animation.push(Animation::FadeOut { delay });
            self.host.set_animation(toast.element, &toast.animation);
            debug!(index, delay_ms = delay.as_millis(), "fade-out scheduled");

            let resets = position + 1 == count;
            self.listen_fade_out(inner, session, index, FadeEnd::Detach { resets });
            delay += fade_out;
        }
    }

    fn listen_fade_out(self: &Arc<Self>, inner: &mut Inner, session: Uuid, index: usize, then: FadeEnd) {
        let Some(element) = inner.toasts.get(index).map(|toast| toast.element) else {
            return;
        };
        let handle = tokio::spawn(await_fade_out(
            Arc::downgrade(self),
            session,
            index,
            element,
            then,
        ));
        inner.session.track(handle);
    }

    fn finish_fade(&self, session: Uuid, index: usize, then: FadeEnd) {
        let mut inner = self.lock();
        if !inner.session.is_current(session) {
            return;
        }
        match then {
            FadeEnd::Detach { resets } => {
                self.unmount(&mut inner, index);
                if resets {
                    self.end_session(&mut inner, session);
                }
            }
            FadeEnd::ClearAll => {
                for mounted in inner.session.take_mounted() {
                    if let Some(toast) = inner.toasts.get(mounted) {
                        self.host.remove(toast.element);
                    }
                }
                self.end_session(&mut inner, session);
            }
        }
        self.publish(&inner);
    }

    fn end_session(&self, inner: &mut Inner, session: Uuid) {
        if inner.session.reset() {
            info!(%session, "session finished");
        }
    }

    fn fade_in_and_mount(&self, inner: &mut Inner, index: usize) {
        self.set_animation(inner, index, AnimationList::single(Animation::FadeInRight));
        self.mount(inner, index);
    }

    fn set_animation(&self, inner: &mut Inner, index: usize, animation: AnimationList) {
        if let Some(toast) = inner.toasts.get_mut(index) {
            self.host.set_animation(toast.element, &animation);
            toast.animation = animation;
        }
    }

    fn mount(&self, inner: &mut Inner, index: usize) {
        let (Some(container), Some(toast)) = (inner.container, inner.toasts.get(index)) else {
            return;
        };
        self.host.append_child(container, toast.element);
        inner.session.mark_mounted(index);
    }

    fn unmount(&self, inner: &mut Inner, index: usize) {
        if let Some(toast) = inner.toasts.get(index) {
            self.host.remove(toast.element);
        }
        inner.session.mark_unmounted(index);
    }
}
