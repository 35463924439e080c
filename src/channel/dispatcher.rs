//! Inbound event processing for the channel client
//!
//! Routes parsed inbound frames to handlers. Most handlers only record the
//! event; the exceptions are `addElem`/`delElem` (element counter),
//! `updateBound` (settings write-through), the two confirmation-style
//! requests (boolean acknowledgment reply), and `disconnect` (ends the run
//! loop).

use tokio::sync::mpsc;
use tracing::{info, trace, warn};

use super::gate::ElementCounter;
use super::protocol::{Frame, InboundEvent};
use crate::settings::SettingsStore;

/// Answers for the host's confirmation-style requests
///
/// The host treats a `false` reply as "do not proceed with the destructive
/// action". Declining both is the observed plugin behavior; confirmation is
/// an explicit opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckPolicy {
    pub confirm_remove: bool,
    pub confirm_refresh: bool,
}

impl AckPolicy {
    /// Decline element-remove and element-refresh requests
    pub fn decline() -> Self {
        Self {
            confirm_remove: false,
            confirm_refresh: false,
        }
    }

    /// Confirm both requests
    pub fn confirm() -> Self {
        Self {
            confirm_remove: true,
            confirm_refresh: true,
        }
    }
}

impl Default for AckPolicy {
    fn default() -> Self {
        Self::decline()
    }
}

/// What the run loop should do after a frame is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    /// Host closed the session; terminal for the process
    Disconnected,
}

/// Holds everything inbound handlers touch: the settings store, the element
/// counter, and the outbound sender for acknowledgment replies
#[derive(Debug)]
pub struct EventDispatcher {
    settings: SettingsStore,
    elements: ElementCounter,
    outbound: mpsc::UnboundedSender<Frame>,
    ack_policy: AckPolicy,
}

impl EventDispatcher {
    pub fn new(
        settings: SettingsStore,
        elements: ElementCounter,
        outbound: mpsc::UnboundedSender<Frame>,
        ack_policy: AckPolicy,
    ) -> Self {
        Self {
            settings,
            elements,
            outbound,
            ack_policy,
        }
    }

    /// Current live-element count (inbound adds minus removes)
    pub fn element_count(&self) -> u32 {
        self.elements.get()
    }

    /// Handle one inbound frame
    pub fn handle_frame(&mut self, frame: Frame) -> Dispatch {
        let Some(event) = InboundEvent::parse(&frame) else {
            trace!(event = %frame.event, "Ignoring unrecognized inbound event");
            return Dispatch::Continue;
        };

        match event {
            InboundEvent::Connect => info!("Connected"),
            InboundEvent::Disconnect => {
                info!("Disconnected by host");
                return Dispatch::Disconnected;
            }
            InboundEvent::Echo(data) => info!(%data, "Echo"),
            InboundEvent::RegisterTopic(data) => info!(%data, "Register topic"),
            InboundEvent::AddInputHook(data) => info!(%data, "Input hook added"),
            InboundEvent::DelInputHook(data) => info!(%data, "Input hook removed"),
            InboundEvent::InsertCss(data) => info!(%data, "CSS inserted"),
            InboundEvent::RemoveCss(data) => info!(%data, "CSS removed"),
            InboundEvent::AddElem(data) => {
                self.elements.increment();
                info!(%data, count = self.elements.get(), "Element added");
            }
            InboundEvent::DelElem(data) => {
                self.elements.decrement();
                info!(%data, count = self.elements.get(), "Element removed");
            }
            InboundEvent::ShowElem(data) => info!(%data, "Element shown"),
            InboundEvent::HideElem(data) => info!(%data, "Element hidden"),
            InboundEvent::SetBound(data) => info!(%data, "Bound set"),
            InboundEvent::SetContent(data) => info!(%data, "Content set"),
            InboundEvent::SetOpacity(data) => info!(%data, "Opacity set"),
            InboundEvent::ExecJsInElem(data) => info!(%data, "Script executed in element"),
            InboundEvent::Notify(data) => info!(%data, "Notification"),
            InboundEvent::UpdateBound { key, bound } => {
                info!(%key, ?bound, "Bound update");
                self.settings.on_bound_update(&key, bound);
            }
            InboundEvent::UpdateOpacity { key, opacity } => {
                info!(%key, opacity, "Opacity update");
            }
            InboundEvent::ProcessContent { content } => {
                info!(len = content.len(), "Process content");
            }
            InboundEvent::ModeFlag { flags } => info!(%flags, "Mode flags"),
            InboundEvent::ElemRemove { key } => {
                self.acknowledge(&frame, &key, "remove", self.ack_policy.confirm_remove);
            }
            InboundEvent::ElemRefresh { key } => {
                self.acknowledge(&frame, &key, "refresh", self.ack_policy.confirm_refresh);
            }
        }

        Dispatch::Continue
    }

    /// Answer a confirmation-style request truthfully: the reply states
    /// whether the plugin performed (or permits) the requested action
    fn acknowledge(&self, frame: &Frame, key: &str, action: &str, granted: bool) {
        info!(%key, action, granted, "Answering host request");
        let Some(id) = frame.ack else {
            warn!(%key, action, "Host request carries no ack id, nothing to answer");
            return;
        };
        if self.outbound.send(Frame::ack_reply(id, granted)).is_err() {
            warn!(%key, action, "Outbound channel closed, acknowledgment dropped");
        }
    }
}
