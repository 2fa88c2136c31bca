//! Rendering surface the controller mutates.
//!
//! A browser binding maps these calls onto `document.head`, `document.body`,
//! `CSSStyleSheet::insertRule` and `animationend` listeners. [`MemoryHost`]
//! implements the same surface in memory for tests and the CLI.

use std::fmt;
use std::future::Future;

use url::Url;

use crate::animation::AnimationList;
use crate::error::HostError;
use crate::markup::{ContainerMarkup, ToastMarkup};

mod memory;

pub use memory::{HostEvent, ImageBehavior, MemoryHost};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ElementId(pub u64);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StyleId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el#{}", self.0)
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "style#{}", self.0)
    }
}

pub trait HostSurface: Send + Sync + 'static {
    /// Current viewport width in CSS pixels.
    fn viewport_width(&self) -> u32;

    /// Injects a `<style>` node with `css` as its text.
    fn append_style(&self, css: &str) -> StyleId;

    /// Appends rules to the sheet of an injected style node.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is unknown or a rule is rejected.
    fn insert_rules(&self, sheet: StyleId, rules: &[String]) -> Result<(), HostError>;

    fn remove_style(&self, sheet: StyleId);

    /// Creates the container and appends it to the page body.
    fn create_container(&self, markup: &ContainerMarkup) -> ElementId;

    fn is_attached(&self, element: ElementId) -> bool;

    /// Builds a detached toast element.
    fn create_toast(&self, markup: &ToastMarkup) -> ElementId;

    fn append_child(&self, parent: ElementId, child: ElementId);

    /// Replaces the element's `animation` property.
    fn set_animation(&self, element: ElementId, animation: &AnimationList);

    /// Detaches the element from its parent.
    fn remove(&self, element: ElementId);

    /// Resolves once the image resource has loaded.
    fn load_image(&self, src: &Url) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Resolves when the animation called `name` ends on `element`.
    ///
    /// May never resolve if the element is removed first.
    fn animation_end(&self, element: ElementId, name: &str) -> impl Future<Output = ()> + Send;
}
