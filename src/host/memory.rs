use std::collections::{BTreeMap, HashMap};
use std::future::{Future, pending};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_channel::{Receiver, Sender, TrySendError, bounded};
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{trace, warn};
use url::Url;

use super::{ElementId, HostSurface, StyleId};
use crate::animation::AnimationList;
use crate::error::HostError;
use crate::markup::{ContainerMarkup, ToastMarkup};

/// Desktop width used when none is configured.
const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// One mutation (or resource completion) observed by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    StyleAppended { style: StyleId, bytes: usize },
    RulesInserted { style: StyleId, count: usize },
    StyleRemoved { style: StyleId },
    ContainerCreated { element: ElementId, id: String },
    ToastCreated { element: ElementId, id: String },
    Mounted { parent: ElementId, element: ElementId },
    AnimationSet { element: ElementId, animation: AnimationList },
    Removed { element: ElementId },
    ImageLoaded { src: Url },
    ImageFailed { src: Url },
}

impl HostEvent {
    /// Whether the event changes what is on the page.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !matches!(self, Self::ImageLoaded { .. } | Self::ImageFailed { .. })
    }
}

/// How `load_image` resolves for a given source.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ImageBehavior {
    #[default]
    Immediate,
    After(Duration),
    Fail,
    Never,
}

#[derive(Debug)]
enum Parent {
    Body,
    Element(ElementId),
}

#[derive(Debug)]
struct Node {
    label: String,
    parent: Option<Parent>,
    children: Vec<ElementId>,
    animation: Option<(AnimationList, Instant)>,
}

#[derive(Debug)]
struct StyleNode {
    rules: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    viewport_width: u32,
    styles: BTreeMap<StyleId, StyleNode>,
    nodes: HashMap<ElementId, Node>,
    journal: Vec<(Instant, HostEvent)>,
    images: HashMap<Url, ImageBehavior>,
    default_image: ImageBehavior,
}

/// In-memory page driven by tokio time.
#[derive(Debug)]
pub struct MemoryHost {
    state: Mutex<State>,
    feed: Option<Sender<HostEvent>>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_WIDTH)
    }
}

impl MemoryHost {
    #[must_use]
    pub fn new(viewport_width: u32) -> Self {
        Self {
            state: Mutex::new(State {
                viewport_width,
                ..State::default()
            }),
            feed: None,
        }
    }

    /// Same as [`MemoryHost::new`], also publishing every event on a bounded channel.
    #[must_use]
    pub fn with_feed(viewport_width: u32, capacity: usize) -> (Self, Receiver<HostEvent>) {
        let (tx, rx) = bounded(capacity.max(1));
        let mut host = Self::new(viewport_width);
        host.feed = Some(tx);
        (host, rx)
    }

    pub fn set_viewport_width(&self, width: u32) {
        self.lock().viewport_width = width;
    }

    pub fn set_image_behavior(&self, src: &Url, behavior: ImageBehavior) {
        self.lock().images.insert(src.clone(), behavior);
    }

    pub fn set_default_image_behavior(&self, behavior: ImageBehavior) {
        self.lock().default_image = behavior;
    }

    #[must_use]
    pub fn journal(&self) -> Vec<(Instant, HostEvent)> {
        self.lock().journal.clone()
    }

    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.lock()
            .journal
            .iter()
            .filter(|(_, event)| event.is_mutation())
            .count()
    }

    /// Number of injected style nodes still on the page.
    #[must_use]
    pub fn style_count(&self) -> usize {
        self.lock().styles.len()
    }

    #[must_use]
    pub fn rules(&self, style: StyleId) -> Vec<String> {
        self.lock()
            .styles
            .get(&style)
            .map(|node| node.rules.clone())
            .unwrap_or_default()
    }

    /// Elements appended directly to the body and still there.
    #[must_use]
    pub fn body_children(&self) -> Vec<ElementId> {
        let state = self.lock();
        let mut ids: Vec<_> = state
            .nodes
            .iter()
            .filter(|(_, node)| matches!(node.parent, Some(Parent::Body)))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Attached children of `parent`, in insertion order.
    #[must_use]
    pub fn children(&self, parent: ElementId) -> Vec<ElementId> {
        self.lock()
            .nodes
            .get(&parent)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// The markup id the element was created with.
    #[must_use]
    pub fn label(&self, element: ElementId) -> Option<String> {
        self.lock().nodes.get(&element).map(|node| node.label.clone())
    }

    #[must_use]
    pub fn animation(&self, element: ElementId) -> Option<AnimationList> {
        self.lock()
            .nodes
            .get(&element)
            .and_then(|node| node.animation.as_ref())
            .map(|(list, _)| list.clone())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(state: &mut State) -> u64 {
        state.next_id += 1;
        state.next_id
    }

    fn record(&self, state: &mut State, event: HostEvent) {
        trace!(?event, "host event");
        if let Some(feed) = &self.feed {
            match feed.try_send(event.clone()) {
                Ok(()) | Err(TrySendError::Closed(_)) => {}
                Err(TrySendError::Full(event)) => {
                    warn!(?event, "host event feed full; dropping event");
                }
            }
        }
        state.journal.push((Instant::now(), event));
    }

    fn detach(state: &mut State, element: ElementId) -> bool {
        let Some(parent) = state.nodes.get_mut(&element).and_then(|node| node.parent.take())
        else {
            return false;
        };
        if let Parent::Element(parent) = parent {
            if let Some(node) = state.nodes.get_mut(&parent) {
                node.children.retain(|child| *child != element);
            }
        }
        true
    }
}

fn is_well_formed(rule: &str) -> bool {
    !rule.trim().is_empty() && rule.matches('{').count() == rule.matches('}').count()
}

fn is_attached(state: &State, element: ElementId) -> bool {
    let mut current = element;
    // Depth is bounded by the node count; guards against a malformed cycle.
    for _ in 0..=state.nodes.len() {
        match state.nodes.get(&current).and_then(|node| node.parent.as_ref()) {
            Some(Parent::Body) => return true,
            Some(Parent::Element(parent)) => current = *parent,
            None => return false,
        }
    }
    false
}

impl HostSurface for MemoryHost {
    fn viewport_width(&self) -> u32 {
        self.lock().viewport_width
    }

    fn append_style(&self, css: &str) -> StyleId {
        let mut state = self.lock();
        let style = StyleId(Self::next_id(&mut state));
        state.styles.insert(style, StyleNode { rules: Vec::new() });
        self.record(
            &mut state,
            HostEvent::StyleAppended {
                style,
                bytes: css.len(),
            },
        );
        style
    }

    fn insert_rules(&self, sheet: StyleId, rules: &[String]) -> Result<(), HostError> {
        let mut state = self.lock();
        if let Some(rule) = rules.iter().find(|rule| !is_well_formed(rule)) {
            return Err(HostError::RuleRejected { rule: rule.clone() });
        }
        let node = state.styles.get_mut(&sheet).ok_or(HostError::UnknownStyle)?;
        node.rules.extend(rules.iter().cloned());
        self.record(
            &mut state,
            HostEvent::RulesInserted {
                style: sheet,
                count: rules.len(),
            },
        );
        Ok(())
    }

    fn remove_style(&self, sheet: StyleId) {
        let mut state = self.lock();
        if state.styles.remove(&sheet).is_some() {
            self.record(&mut state, HostEvent::StyleRemoved { style: sheet });
        }
    }

    fn create_container(&self, markup: &ContainerMarkup) -> ElementId {
        let mut state = self.lock();
        let element = ElementId(Self::next_id(&mut state));
        state.nodes.insert(
            element,
            Node {
                label: markup.id.to_string(),
                parent: Some(Parent::Body),
                children: Vec::new(),
                animation: None,
            },
        );
        self.record(
            &mut state,
            HostEvent::ContainerCreated {
                element,
                id: markup.id.to_string(),
            },
        );
        element
    }

    fn is_attached(&self, element: ElementId) -> bool {
        is_attached(&self.lock(), element)
    }

    fn create_toast(&self, markup: &ToastMarkup) -> ElementId {
        let mut state = self.lock();
        let element = ElementId(Self::next_id(&mut state));
        state.nodes.insert(
            element,
            Node {
                label: markup.id.clone(),
                parent: None,
                children: Vec::new(),
                animation: None,
            },
        );
        self.record(
            &mut state,
            HostEvent::ToastCreated {
                element,
                id: markup.id.clone(),
            },
        );
        element
    }

    fn append_child(&self, parent: ElementId, child: ElementId) {
        let mut state = self.lock();
        if !state.nodes.contains_key(&parent) || !state.nodes.contains_key(&child) {
            return;
        }
        Self::detach(&mut state, child);
        if let Some(node) = state.nodes.get_mut(&child) {
            node.parent = Some(Parent::Element(parent));
        }
        if let Some(node) = state.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        self.record(&mut state, HostEvent::Mounted { parent, element: child });
    }

    fn set_animation(&self, element: ElementId, animation: &AnimationList) {
        let mut state = self.lock();
        let Some(node) = state.nodes.get_mut(&element) else {
            return;
        };
        node.animation = Some((animation.clone(), Instant::now()));
        self.record(
            &mut state,
            HostEvent::AnimationSet {
                element,
                animation: animation.clone(),
            },
        );
    }

    fn remove(&self, element: ElementId) {
        let mut state = self.lock();
        if Self::detach(&mut state, element) {
            self.record(&mut state, HostEvent::Removed { element });
        }
    }

    fn load_image(&self, src: &Url) -> impl Future<Output = Result<(), HostError>> + Send {
        let behavior = {
            let state = self.lock();
            state.images.get(src).copied().unwrap_or(state.default_image)
        };
        let src = src.clone();
        async move {
            match behavior {
                ImageBehavior::Immediate => {}
                ImageBehavior::After(delay) => sleep(delay).await,
                ImageBehavior::Never => pending::<()>().await,
                ImageBehavior::Fail => {
                    let mut state = self.lock();
                    self.record(&mut state, HostEvent::ImageFailed { src: src.clone() });
                    return Err(HostError::ImageLoad { src });
                }
            }
            let mut state = self.lock();
            self.record(&mut state, HostEvent::ImageLoaded { src });
            Ok(())
        }
    }

    fn animation_end(&self, element: ElementId, name: &str) -> impl Future<Output = ()> + Send {
        let deadline = self
            .lock()
            .nodes
            .get(&element)
            .and_then(|node| node.animation.as_ref())
            .and_then(|(list, set_at)| list.find(name).map(|anim| *set_at + anim.ends_after()));
        async move {
            match deadline {
                Some(at) => sleep_until(at).await,
                None => pending::<()>().await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HostEvent, ImageBehavior, MemoryHost};
    use crate::animation::{Animation, AnimationList, FADE_OUT};
    use crate::error::HostError;
    use crate::host::HostSurface;
    use crate::markup::{ContainerMarkup, ToastMarkup};
    use crate::types::Message;
    use std::time::Duration;
    use tokio::time::Instant;
    use url::Url;

    fn url(raw: &str) -> Url {
        match Url::parse(raw) {
            Ok(url) => url,
            Err(err) => panic!("invalid test url {raw}: {err}"),
        }
    }

    fn markup(index: usize) -> ToastMarkup {
        ToastMarkup::new(
            index,
            &Message {
                image: url("https://example.com/a.png"),
                title: "t".into(),
                timestamp: "now".into(),
                body: "b".into(),
            },
        )
    }

    #[test]
    fn removing_container_detaches_descendants() {
        let host = MemoryHost::default();
        let container = host.create_container(&ContainerMarkup::default());
        let toast = host.create_toast(&markup(0));
        assert!(!host.is_attached(toast));

        host.append_child(container, toast);
        assert!(host.is_attached(toast));
        assert_eq!(host.children(container), vec![toast]);

        host.remove(container);
        assert!(!host.is_attached(toast));
    }

    #[test]
    fn unbalanced_rules_are_rejected() {
        let host = MemoryHost::default();
        let style = host.append_style("");
        let result = host.insert_rules(style, &["@keyframes broken {".to_string()]);
        assert!(matches!(result, Err(HostError::RuleRejected { .. })));
        assert!(host.rules(style).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn animation_end_waits_for_delay_and_duration() {
        let host = MemoryHost::default();
        let toast = host.create_toast(&markup(0));
        let start = Instant::now();
        host.set_animation(
            toast,
            &AnimationList::single(Animation::FadeOut {
                delay: Duration::from_millis(1000),
            }),
        );

        host.animation_end(toast, FADE_OUT).await;
        assert_eq!(start.elapsed(), Duration::from_millis(1800));
    }

    #[tokio::test(start_paused = true)]
    async fn image_behavior_is_per_source() {
        let host = MemoryHost::default();
        let slow = url("https://example.com/slow.png");
        let broken = url("https://example.com/broken.png");
        host.set_image_behavior(&slow, ImageBehavior::After(Duration::from_millis(250)));
        host.set_image_behavior(&broken, ImageBehavior::Fail);

        let start = Instant::now();
        assert_eq!(host.load_image(&slow).await, Ok(()));
        assert_eq!(start.elapsed(), Duration::from_millis(250));
        assert_eq!(
            host.load_image(&broken).await,
            Err(HostError::ImageLoad { src: broken.clone() })
        );
        assert_eq!(host.mutation_count(), 0);
    }

    #[tokio::test]
    async fn feed_publishes_events() {
        let (host, rx) = MemoryHost::with_feed(400, 8);
        let style = host.append_style("body {}");
        match rx.try_recv() {
            Ok(HostEvent::StyleAppended { style: got, bytes }) => {
                assert_eq!(got, style);
                assert_eq!(bytes, 7);
            }
            other => panic!("unexpected feed item: {other:?}"),
        }
    }
}
