//! Template variable extraction and rendering (C1 + C2).

pub mod extractor;
pub mod renderer;

pub use extractor::{create_variable_hash, extract, get_used, ExtractError, FunctionCall, VariableRef};
pub use renderer::{hash_rendered_config, render, RenderError, RenderOptions, RenderOutput};
