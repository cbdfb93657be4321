use pageruler_core::{DefaultUnit, FormatterCache};
use pageruler_storage::Settings;
use std::rc::Rc;

/// Shared services handed to every widget and tool of one viewer process.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub default_unit: Rc<DefaultUnit>,
    pub formatters: Rc<FormatterCache>,
}

impl ViewerContext {
    pub fn new(settings: Settings) -> Self {
        Self::with_formatters(settings, FormatterCache::new())
    }

    pub fn with_formatters(settings: Settings, formatters: FormatterCache) -> Self {
        Self {
            default_unit: Rc::new(DefaultUnit::new(settings)),
            formatters: Rc::new(formatters),
        }
    }

    /// Context backed by throwaway in-memory settings.
    pub fn in_memory() -> Self {
        Self::new(Settings::in_memory())
    }
}
