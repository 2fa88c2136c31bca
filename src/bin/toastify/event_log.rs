use async_channel::Receiver;
use tokio::time::Instant;
use toastify::host::HostEvent;
use tracing::{debug, info, warn};

/// Logs every host event until the feed is closed.
pub async fn run_event_log(rx: Receiver<HostEvent>, started: Instant) {
    while let Ok(event) = rx.recv().await {
        let at_ms = started.elapsed().as_millis();
        match event {
            HostEvent::StyleAppended { style, bytes } => {
                debug!(at_ms, %style, bytes, "style injected");
            }
            HostEvent::RulesInserted { style, count } => {
                debug!(at_ms, %style, count, "keyframes inserted");
            }
            HostEvent::StyleRemoved { style } => debug!(at_ms, %style, "style removed"),
            HostEvent::ContainerCreated { element, id } => {
                debug!(at_ms, %element, %id, "container created");
            }
            HostEvent::ToastCreated { element, id } => {
                debug!(at_ms, %element, %id, "toast built");
            }
            HostEvent::Mounted { element, .. } => info!(at_ms, %element, "toast shown"),
            HostEvent::AnimationSet { element, animation } => {
                info!(at_ms, %element, %animation, "animation set");
            }
            HostEvent::Removed { element } => info!(at_ms, %element, "element removed"),
            HostEvent::ImageLoaded { src } => debug!(at_ms, %src, "image loaded"),
            HostEvent::ImageFailed { src } => warn!(at_ms, %src, "image failed to load"),
        }
    }
}
