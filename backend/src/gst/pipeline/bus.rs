use super::{PipelineContext, PipelineError};
use castrig_types::BusEvent;
use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// What the main loop should do after a bus event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Observer of bus events.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, event: &BusEvent) -> LoopControl;
}

/// Something that can stop a running loop.
pub trait LoopHandle: Send + Sync {
    fn quit(&self);
}

impl LoopHandle for glib::MainLoop {
    fn quit(&self) {
        glib::MainLoop::quit(self);
    }
}

/// Logs pipeline status and stops the loop on end-of-stream or error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusLogger;

impl MessageHandler for StatusLogger {
    fn handle(&self, event: &BusEvent) -> LoopControl {
        match event {
            BusEvent::Eos | BusEvent::NewClock { .. } => info!("{}", event.description()),
            BusEvent::Error { source, .. } => error!(source = ?source, "{}", event.description()),
            BusEvent::Warning { source, .. } => warn!(source = ?source, "{}", event.description()),
            BusEvent::ClockLost { .. } => warn!("{}", event.description()),
            BusEvent::Other { .. } => {}
        }

        if event.is_terminal() {
            LoopControl::Quit
        } else {
            LoopControl::Continue
        }
    }
}

/// Fans bus events out to the handlers and quits the loop when any of them
/// asks for it.
#[derive(Clone)]
pub struct EventBridge {
    handlers: Vec<Arc<dyn MessageHandler>>,
    main_loop: Arc<dyn LoopHandle>,
}

impl EventBridge {
    /// Bridge with only the [`StatusLogger`].
    pub fn new(main_loop: impl LoopHandle + 'static) -> Self {
        Self::with_handlers(main_loop, &[])
    }

    /// Bridge with the [`StatusLogger`] followed by `extra`.
    pub fn with_handlers(
        main_loop: impl LoopHandle + 'static,
        extra: &[Arc<dyn MessageHandler>],
    ) -> Self {
        let mut handlers: Vec<Arc<dyn MessageHandler>> = vec![Arc::new(StatusLogger)];
        handlers.extend(extra.iter().cloned());
        Self {
            handlers,
            main_loop: Arc::new(main_loop),
        }
    }

    /// Deliver one event. Every handler sees it; the loop is quit at most
    /// once.
    pub fn dispatch(&self, event: &BusEvent) -> LoopControl {
        trace!("Bus event: {:?}", event);

        let mut control = LoopControl::Continue;
        for handler in &self.handlers {
            if handler.handle(event) == LoopControl::Quit {
                control = LoopControl::Quit;
            }
        }

        if control == LoopControl::Quit {
            debug!("Stopping main loop after {:?}", event);
            self.main_loop.quit();
        }
        control
    }

    pub fn on_message(&self, msg: &gst::MessageRef) -> LoopControl {
        self.dispatch(&bus_event(msg))
    }
}

/// Reduce a bus message to a [`BusEvent`].
pub fn bus_event(msg: &gst::MessageRef) -> BusEvent {
    use gst::MessageView;

    let source = msg.src().map(|s| s.name().to_string());
    match msg.view() {
        MessageView::Eos(_) => BusEvent::Eos,
        MessageView::Error(err) => BusEvent::Error {
            message: err.error().to_string(),
            debug: err.debug().map(|d| d.to_string()),
            source,
        },
        MessageView::Warning(warning) => BusEvent::Warning {
            message: warning.error().to_string(),
            debug: warning.debug().map(|d| d.to_string()),
            source,
        },
        MessageView::NewClock(_) => BusEvent::NewClock { source },
        MessageView::ClockLost(_) => BusEvent::ClockLost { source },
        _ => BusEvent::Other {
            kind: format!("{:?}", msg.type_()),
        },
    }
}

impl PipelineContext {
    /// Attach an [`EventBridge`] to the pipeline bus.
    ///
    /// The signal watch dispatches on the default main context, so messages
    /// are handled while [`PipelineContext::run`] is blocking.
    pub(super) fn setup_bus_watch(&mut self) -> Result<(), PipelineError> {
        self.remove_bus_watch();

        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| glib::bool_error!("Pipeline '{}' does not have a bus", self.name))?;

        let bridge = EventBridge::with_handlers(self.main_loop.clone(), &self.handlers);

        // Ref-counted; balanced in remove_bus_watch
        bus.add_signal_watch();
        let handler_id = bus.connect_message(None, move |_bus, msg| {
            bridge.on_message(msg);
        });
        self.bus_handler = Some(handler_id);

        debug!(
            "Bus watch set up for pipeline {} with {} extra handler(s)",
            self.name,
            self.handlers.len()
        );
        Ok(())
    }

    pub(super) fn remove_bus_watch(&mut self) {
        let Some(handler_id) = self.bus_handler.take() else {
            return;
        };
        if let Some(bus) = self.pipeline.bus() {
            bus.disconnect(handler_id);
            bus.remove_signal_watch();
        }
        debug!("Bus watch removed for pipeline {}", self.name);
    }
}
