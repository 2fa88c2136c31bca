use tokio::task::JoinHandle;
use uuid::Uuid;

/// One run cycle, from `run` to the following reset.
#[derive(Debug, Default)]
pub(super) struct Session {
    id: Option<Uuid>,
    current_index: usize,
    timers: Vec<JoinHandle<()>>,
    /// Message indices whose toast is in the container, in mount order.
    mounted: Vec<usize>,
}

impl Session {
    pub(super) fn start(&mut self) -> Uuid {
        let id = Uuid::now_v7();
        self.id = Some(id);
        self.current_index = 0;
        id
    }

    pub(super) const fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub(super) const fn is_running(&self) -> bool {
        self.id.is_some()
    }

    /// Whether a task spawned for `session` may still act.
    pub(super) fn is_current(&self, session: Uuid) -> bool {
        self.id == Some(session)
    }

    pub(super) const fn current_index(&self) -> usize {
        self.current_index
    }

    pub(super) const fn advance(&mut self) -> usize {
        self.current_index += 1;
        self.current_index
    }

    pub(super) fn track(&mut self, handle: JoinHandle<()>) {
        self.timers.retain(|timer| !timer.is_finished());
        self.timers.push(handle);
    }

    pub(super) fn pending_timers(&self) -> usize {
        self.timers.iter().filter(|timer| !timer.is_finished()).count()
    }

    pub(super) fn abort_timers(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }

    pub(super) fn mounted(&self) -> &[usize] {
        &self.mounted
    }

    pub(super) fn is_mounted(&self, index: usize) -> bool {
        self.mounted.contains(&index)
    }

    pub(super) fn mark_mounted(&mut self, index: usize) {
        if !self.is_mounted(index) {
            self.mounted.push(index);
        }
    }

    pub(super) fn mark_unmounted(&mut self, index: usize) {
        self.mounted.retain(|mounted| *mounted != index);
    }

    pub(super) fn take_mounted(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.mounted)
    }

    /// Ends the run. Returns false when nothing was running.
    pub(super) fn reset(&mut self) -> bool {
        if self.id.take().is_none() {
            return false;
        }
        self.current_index = 0;
        self.abort_timers();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Session;

    #[test]
    fn reset_rewinds_only_active_sessions() {
        let mut session = Session::default();
        assert!(!session.reset());

        let id = session.start();
        assert!(session.is_current(id));
        session.advance();
        session.advance();
        assert_eq!(session.current_index(), 2);

        assert!(session.reset());
        assert_eq!(session.current_index(), 0);
        assert!(!session.is_running());
        assert!(!session.is_current(id));
    }

    #[test]
    fn mount_order_is_preserved_without_duplicates() {
        let mut session = Session::default();
        session.mark_mounted(2);
        session.mark_mounted(0);
        session.mark_mounted(2);
        assert_eq!(session.mounted(), &[2, 0]);

        session.mark_unmounted(2);
        assert_eq!(session.take_mounted(), vec![0]);
        assert!(session.mounted().is_empty());
    }
}
