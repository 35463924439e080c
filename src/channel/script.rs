//! The scripted demo sequence
//!
//! A strictly ordered list of outbound emissions with fixed wall-clock
//! delays, gated once on the live-element counter. The relative order of
//! emissions never depends on inbound timing; only the gate can delay the
//! visibility-toggle segment.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::info;

use super::gate::ElementGate;
use super::protocol::{outbound, ElementDescriptor, ElementKind, Frame};
use crate::constants::{demo, elements, timing};
use crate::settings::PluginSettings;

/// Delays between script steps, injectable so tests can zero them
#[derive(Debug, Clone, Copy)]
pub struct ScriptTiming {
    pub before_hide: Duration,
    pub before_show: Duration,
    pub before_unhook: Duration,
    pub before_done: Duration,
}

impl Default for ScriptTiming {
    fn default() -> Self {
        Self {
            before_hide: Duration::from_secs(timing::BEFORE_HIDE_SECS),
            before_show: Duration::from_secs(timing::BEFORE_SHOW_SECS),
            before_unhook: Duration::from_secs(timing::BEFORE_UNHOOK_SECS),
            before_done: Duration::from_secs(timing::BEFORE_DONE_SECS),
        }
    }
}

impl ScriptTiming {
    /// All delays zeroed (tests)
    pub fn immediate() -> Self {
        Self {
            before_hide: Duration::ZERO,
            before_show: Duration::ZERO,
            before_unhook: Duration::ZERO,
            before_done: Duration::ZERO,
        }
    }
}

/// Runs the demo sequence against the outbound channel
///
/// Works from a settings snapshot taken at connection time: bound updates
/// arriving mid-script apply to the store, not to emissions already planned.
#[derive(Debug)]
pub struct DemoScript {
    outbound: mpsc::UnboundedSender<Frame>,
    gate: ElementGate,
    timing: ScriptTiming,
    settings: PluginSettings,
}

impl DemoScript {
    pub fn new(
        outbound: mpsc::UnboundedSender<Frame>,
        gate: ElementGate,
        timing: ScriptTiming,
        settings: PluginSettings,
    ) -> Self {
        Self {
            outbound,
            gate,
            timing,
            settings,
        }
    }

    fn emit(&self, frame: Frame) -> Result<()> {
        self.outbound
            .send(frame)
            .context("Outbound channel closed while the script was running")
    }

    /// Run the full sequence, then return; the caller keeps the connection
    /// open afterwards
    pub async fn run(mut self) -> Result<()> {
        let s = &self.settings;
        info!("Starting demo script");

        self.emit(outbound::add_input_hook(&s.hook_key))?;

        self.emit(outbound::add_elem(
            elements::BASIC_KEY,
            &ElementDescriptor {
                key: elements::BASIC_KEY.to_string(),
                kind: ElementKind::InlineContent,
                bound: s.basic_bound,
                content: s.basic_content.clone(),
            },
        ))?;
        self.emit(outbound::add_elem(
            elements::VIEW_KEY,
            &ElementDescriptor {
                key: elements::VIEW_KEY.to_string(),
                kind: ElementKind::EmbeddedView,
                bound: s.view_bound,
                content: s.view_url.clone(),
            },
        ))?;
        self.emit(outbound::insert_css(elements::BASIC_KEY, &s.css))?;

        info!(required = elements::REQUIRED_COUNT, "Waiting for elements to come up");
        self.gate.wait_for(elements::REQUIRED_COUNT).await?;

        sleep(self.timing.before_hide).await;
        self.emit(outbound::hide_elem(elements::VIEW_KEY, elements::VIEW_KEY))?;

        sleep(self.timing.before_show).await;
        self.emit(outbound::show_elem(elements::VIEW_KEY, elements::VIEW_KEY))?;
        self.emit(outbound::exec_js_in_elem(elements::VIEW_KEY, demo::SNIPPET))?;

        sleep(self.timing.before_unhook).await;
        self.emit(outbound::del_input_hook(&self.settings.hook_key))?;
        self.emit(outbound::notify(demo::NOTIFY_TEXT, demo::NOTIFY_TITLE))?;

        sleep(self.timing.before_done).await;
        info!("Demo script complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::gate::element_gate;
    use std::time::Duration;
    use tokio::time::timeout;

    fn collect_events(rx: &mut mpsc::UnboundedReceiver<Frame>) -> Vec<String> {
        let mut names = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            names.push(frame.event);
        }
        names
    }

    #[tokio::test]
    async fn test_script_emission_order() {
        let (counter, gate) = element_gate();
        counter.increment();
        counter.increment();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let script = DemoScript::new(
            tx,
            gate,
            ScriptTiming::immediate(),
            PluginSettings::default(),
        );
        script.run().await.unwrap();

        assert_eq!(
            collect_events(&mut rx),
            vec![
                "addInputHook",
                "addElem",
                "addElem",
                "insertCSS",
                "hideElem",
                "showElem",
                "execJSInElem",
                "delInputHook",
                "notify",
            ]
        );
    }

    #[tokio::test]
    async fn test_script_blocks_on_the_gate() {
        let (counter, gate) = element_gate();
        counter.increment(); // only one element: gate must hold

        let (tx, mut rx) = mpsc::unbounded_channel();
        let script = DemoScript::new(
            tx,
            gate,
            ScriptTiming::immediate(),
            PluginSettings::default(),
        );

        let result = timeout(Duration::from_millis(50), script.run()).await;
        assert!(result.is_err(), "script ran past the gate with one element");

        // Everything before the gate was emitted, nothing after
        assert_eq!(
            collect_events(&mut rx),
            vec!["addInputHook", "addElem", "addElem", "insertCSS"]
        );
    }

    #[tokio::test]
    async fn test_script_resumes_when_gate_releases() {
        let (counter, gate) = element_gate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let script = DemoScript::new(
            tx,
            gate,
            ScriptTiming::immediate(),
            PluginSettings::default(),
        );

        let handle = tokio::spawn(script.run());
        counter.increment();
        counter.increment();

        timeout(Duration::from_secs(1), handle)
            .await
            .expect("script never finished")
            .unwrap()
            .unwrap();

        let names = collect_events(&mut rx);
        assert_eq!(names.len(), 9);
        assert_eq!(names.last().map(String::as_str), Some("notify"));
    }

    #[tokio::test]
    async fn test_script_payloads_come_from_settings() {
        let (counter, gate) = element_gate();
        counter.increment();
        counter.increment();

        let mut settings = PluginSettings::default();
        settings.hook_key = "alt+z".to_string();

        let (tx, mut rx) = mpsc::unbounded_channel();
        DemoScript::new(tx, gate, ScriptTiming::immediate(), settings)
            .run()
            .await
            .unwrap();

        let first = rx.try_recv().unwrap();
        assert_eq!(first, outbound::add_input_hook("alt+z"));
    }
}
