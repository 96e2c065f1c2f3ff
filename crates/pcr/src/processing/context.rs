use crate::{Engine, Error, Result, RuntimeConfiguration};

/// State shared by all algorithm runs.
///
/// The engine is located once on creation, algorithms that need it fail with
/// [`Error::EngineUnavailable`] when it was not found.
#[derive(Debug, Clone)]
pub struct ProcessingContext {
    engine: std::result::Result<Engine, String>,
}

impl ProcessingContext {
    pub fn new(config: &RuntimeConfiguration) -> Self {
        let engine = Engine::detect(config.pcraster_dir()).map_err(|err| {
            log::warn!("{err}, PCRaster algorithms will not run");
            err.to_string()
        });

        ProcessingContext { engine }
    }

    pub fn with_engine(engine: Engine) -> Self {
        ProcessingContext { engine: Ok(engine) }
    }

    #[cfg(test)]
    pub(crate) fn without_engine(reason: &str) -> Self {
        ProcessingContext {
            engine: Err(reason.to_string()),
        }
    }

    pub fn engine(&self) -> Result<&Engine> {
        self.engine.as_ref().map_err(|msg| Error::EngineUnavailable(msg.clone()))
    }

    pub fn engine_available(&self) -> bool {
        self.engine.is_ok()
    }
}
