use super::{MessageHandler, PipelineContext, PipelineError};
use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of a [`PipelineContext`]. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Pipeline built, not yet playing
    Constructed,
    /// Pipeline playing, bus watched
    Running,
    /// Pipeline torn down
    Stopped,
}

/// Notified whenever an element is added anywhere in the pipeline,
/// including nested bins.
pub trait ElementObserver: Send + Sync {
    fn element_added(&self, bin: &gst::Bin, element: &gst::Element);
}

impl<F> ElementObserver for F
where
    F: Fn(&gst::Bin, &gst::Element) + Send + Sync,
{
    fn element_added(&self, bin: &gst::Bin, element: &gst::Element) {
        self(bin, element)
    }
}

impl PipelineContext {
    /// Create an empty pipeline and its main loop.
    ///
    /// GStreamer is initialized on first use; later calls are no-ops.
    pub fn new(name: &str) -> Result<Self, PipelineError> {
        gst::init()?;

        let pipeline = gst::Pipeline::builder().name(name).build();
        let main_loop = glib::MainLoop::new(None, false);
        info!("Created pipeline context: {}", name);

        Ok(Self {
            name: name.to_string(),
            pipeline,
            main_loop,
            state: ContextState::Constructed,
            handlers: Vec::new(),
            dot_dir: None,
            bus_handler: None,
            element_added_handler: None,
        })
    }

    /// Create a context and start it right away.
    pub fn init(name: &str, observer: impl ElementObserver + 'static) -> Result<Self, PipelineError> {
        let mut ctx = Self::new(name)?;
        ctx.start(observer)?;
        Ok(ctx)
    }

    /// Add a bus message handler. Handlers added after [`start`](Self::start)
    /// are not consulted.
    pub fn with_handler(mut self, handler: impl MessageHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Write DOT dumps to `dir` instead of `GST_DEBUG_DUMP_DOT_DIR`.
    pub fn with_dot_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.dot_dir = dir;
        self
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Set the pipeline playing, then watch element additions and the bus.
    ///
    /// Sources may start producing before consumers are attached; tees in
    /// the graph are expected to tolerate that. Fails with
    /// [`PipelineError::DoubleInit`] unless the context is freshly built.
    pub fn start(&mut self, observer: impl ElementObserver + 'static) -> Result<(), PipelineError> {
        if self.state != ContextState::Constructed {
            warn!(
                "Pipeline context {} started again in state {:?}",
                self.name, self.state
            );
            return Err(PipelineError::DoubleInit);
        }

        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| PipelineError::StateChange(format!("{}: {}", self.name, e)))?;
        info!("Pipeline {} set to Playing", self.name);

        let handler_id = self
            .pipeline
            .connect_deep_element_added(move |_pipeline, bin, element| {
                observer.element_added(bin, element);
            });
        self.element_added_handler = Some(handler_id);

        self.setup_bus_watch()?;
        self.state = ContextState::Running;
        Ok(())
    }

    /// Block until [`quit`](Self::quit) is called or the bus stops the loop.
    pub fn run(&self) {
        info!("Running main loop for pipeline {}", self.name);
        self.main_loop.run();
        info!("Main loop for pipeline {} exited", self.name);
    }

    pub fn quit(&self) {
        debug!("Quitting main loop for pipeline {}", self.name);
        self.main_loop.quit();
    }

    /// Tear the pipeline down. The context cannot be started again.
    pub fn stop(&mut self) {
        self.teardown();
        self.state = ContextState::Stopped;
    }

    pub(super) fn teardown(&mut self) {
        if let Some(handler_id) = self.element_added_handler.take() {
            self.pipeline.disconnect(handler_id);
        }
        self.remove_bus_watch();

        if self.state == ContextState::Running {
            if let Err(e) = self.pipeline.set_state(gst::State::Null) {
                warn!("Failed to stop pipeline {}: {}", self.name, e);
            } else {
                info!("Pipeline {} set to Null", self.name);
            }
        }
    }

    /// DOT description of the current pipeline graph.
    pub fn dot_data(&self) -> String {
        self.pipeline
            .debug_to_dot_data(gst::DebugGraphDetails::all())
            .to_string()
    }

    /// Dump the pipeline graph as `<name>.dot`.
    ///
    /// Writes into the configured dot directory and returns the file path.
    /// Without one, GStreamer writes the file only when
    /// `GST_DEBUG_DUMP_DOT_DIR` is set, and `None` is returned.
    pub fn dump_debug(&self, name: &str) -> Result<Option<PathBuf>, PipelineError> {
        match &self.dot_dir {
            Some(dir) => {
                let path = write_dot_file(dir, name, &self.dot_data())?;
                info!("Wrote pipeline graph to {}", path.display());
                Ok(Some(path))
            }
            None => {
                debug!("Dumping pipeline graph {} via GST_DEBUG_DUMP_DOT_DIR", name);
                self.pipeline
                    .debug_to_dot_file(gst::DebugGraphDetails::all(), name);
                Ok(None)
            }
        }
    }
}

fn write_dot_file(dir: &Path, name: &str, dot: &str) -> Result<PathBuf, PipelineError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.dot", name));
    std::fs::write(&path, dot)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fakesink(name: &str) -> gst::Element {
        gst::ElementFactory::make("fakesink")
            .name(name)
            .build()
            .unwrap()
    }

    #[test]
    fn test_start_sets_playing() {
        let mut ctx = PipelineContext::new("start").unwrap();
        assert_eq!(ctx.state(), ContextState::Constructed);

        ctx.start(|_: &gst::Bin, _: &gst::Element| {}).unwrap();
        assert_eq!(ctx.state(), ContextState::Running);
        assert_eq!(ctx.pipeline().current_state(), gst::State::Playing);

        ctx.stop();
        assert_eq!(ctx.state(), ContextState::Stopped);
        assert_eq!(ctx.pipeline().current_state(), gst::State::Null);
    }

    #[test]
    fn test_double_start_rejected() {
        let mut ctx = PipelineContext::init("double", |_: &gst::Bin, _: &gst::Element| {}).unwrap();
        let err = ctx.start(|_: &gst::Bin, _: &gst::Element| {}).unwrap_err();
        assert!(matches!(err, PipelineError::DoubleInit));

        ctx.stop();
        let err = ctx.start(|_: &gst::Bin, _: &gst::Element| {}).unwrap_err();
        assert!(matches!(err, PipelineError::DoubleInit));
    }

    #[test]
    fn test_observer_sees_nested_elements() {
        let added = Arc::new(AtomicUsize::new(0));
        let counter = added.clone();
        let ctx = PipelineContext::init("observer", move |_: &gst::Bin, _: &gst::Element| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        ctx.add_and_link(&[Some(fakesink("direct"))]).unwrap();
        assert_eq!(added.load(Ordering::SeqCst), 1);

        let nested = gst::Bin::builder().name("nested").build();
        ctx.pipeline().add(&nested).unwrap();
        assert_eq!(added.load(Ordering::SeqCst), 2);

        nested.add(&fakesink("inner")).unwrap();
        assert_eq!(added.load(Ordering::SeqCst), 3);
        assert!(ctx.by_name("inner").is_some());
    }

    #[test]
    fn test_quit_before_run_returns() {
        let ctx = PipelineContext::new("quit").unwrap();
        let main_loop = ctx.main_loop().clone();
        glib::idle_add_once(move || main_loop.quit());
        ctx.run();
        assert!(!ctx.main_loop().is_running());
    }

    #[test]
    fn test_dot_dump_to_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let ctx = PipelineContext::new("dot")
            .unwrap()
            .with_dot_dir(Some(dir.path().join("graphs")));
        ctx.add_and_link(&[Some(fakesink("graphsink"))]).unwrap();

        let path = ctx.dump_debug("assembled").unwrap().unwrap();
        assert_eq!(path, dir.path().join("graphs").join("assembled.dot"));

        let dot = std::fs::read_to_string(path).unwrap();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("graphsink"));
    }
}
