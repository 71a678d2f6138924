//! Pipeline configuration.
//!
//! Configuration is resolved once at the CLI boundary and never mutated:
//! the orchestrator receives a [`PipelineConfig`] and threads it through
//! the run explicitly, rather than reading ambient global state.

mod settings;

pub use settings::{
    template_model_dir, PipelineConfig, SaveMode, DEFAULT_BEAST_CONF, DEFAULT_TEMPLATE,
    DEFAULT_VERBOSITY, DNAME_BEAST_LIB, ENV_SHARE_DIR, KNOWN_TEMPLATES, SUFFIX_TEMPLATE_MASK,
};
