use serde::Deserialize;

// Default value function for serde (bool::default() is false, so only true needs a fn)
pub(crate) const fn default_true() -> bool {
    true
}

const fn default_max_items() -> Option<usize> {
    Some(DEFAULT_MAX_TIMELINE_ITEMS)
}

/// Default cap on timeline length before the oldest rows are dropped.
pub const DEFAULT_MAX_TIMELINE_ITEMS: usize = 1000;

/// Which views honor the reject list at admission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MuteConfig {
    #[serde(default = "default_true")]
    pub home: bool,
    #[serde(default = "default_true")]
    pub mention: bool,
}

impl Default for MuteConfig {
    fn default() -> Self {
        Self {
            home: true,
            mention: true,
        }
    }
}

/// Engine configuration, fixed at construction.
///
/// The engine holds no global state; whoever builds it decides these
/// values once (typically from the application's config file).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Hard cap per view; `None` means unbounded.
    #[serde(default = "default_max_items")]
    pub max_timeline_items: Option<usize>,
    #[serde(default)]
    pub mute: MuteConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_timeline_items: Some(DEFAULT_MAX_TIMELINE_ITEMS),
            mute: MuteConfig::default(),
        }
    }
}
