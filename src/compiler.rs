//! Schema Compiler seam.
//!
//! Rule compilation only needs "schema + declaration name + style → TypeScript
//! source", so the backend sits behind [`SchemaCompiler`]. [`TypeScriptCompiler`]
//! is the built-in backend (lower to IR, then print); tests plug in stubs.
use serde_json::Value;

use crate::codegen;
use crate::config::StyleOptions;
use crate::error::Result;
use crate::lower;

pub trait SchemaCompiler: Sync {
    /// Declarations for `schema`, the first one named `name`. Output ends with a newline.
    fn compile(&self, schema: &Value, name: &str, style: &StyleOptions) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptCompiler;

impl SchemaCompiler for TypeScriptCompiler {
    fn compile(&self, schema: &Value, name: &str, style: &StyleOptions) -> Result<String> {
        let module = lower::lower_to_module(schema, name, style)?;
        Ok(codegen::print_module(&module, style))
    }
}

/// Compile one schema node under `name`, passing `style` through untouched.
pub fn compile_schema<C>(compiler: &C, schema: &Value, name: &str, style: &StyleOptions) -> Result<String>
where
    C: SchemaCompiler + ?Sized,
{
    tracing::debug!(declaration = name, "compiling schema");
    compiler.compile(schema, name, style)
}
