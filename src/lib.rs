pub mod chart;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagram;
pub mod engine;
pub mod error;
pub mod layouts;
pub mod render;
pub mod richtext;
pub mod schema;
pub mod slide;
pub mod text;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use engine::{RenderedSlide, SlideRenderer};
pub use error::{
    DiagramCompileError, RegistryError, RenderError, SchemaDefinitionError, ValidationError,
    ValidationReason,
};
pub use layouts::{Layout, LayoutRegistry, builtin_registry, get_layout};
pub use schema::{FieldSpec, LayoutSchema, SlideInstance, define_schema, normalize};
