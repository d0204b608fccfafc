//! Code generation primitives
//!
//! The snapshot engine never translates entity shapes itself. It drives a
//! [`CodeEmitter`] and only decides what goes where. This module holds that
//! capability trait, the shared indented text buffer, and the reference
//! emitter used by the CLI and the monolithic snapshot generator.

pub mod fluent;
pub mod snapshot;

pub use fluent::FluentCodeEmitter;
pub use snapshot::ModelSnapshotGenerator;

use crate::model::{Annotations, EntityDescriptor, PropertyDescriptor, SequenceDescriptor};

/// Module path of the host runtime generated units build against
pub const DEFAULT_RUNTIME_PATH: &str = "schemaflow_runtime::prelude";

/// First line of every generated file
pub const AUTO_GENERATED_HEADER: &str = "// <auto-generated />";

/// What a set of annotations is attached to
#[derive(Debug, Clone, Copy)]
pub enum AnnotationTarget<'a> {
    Model,
    Entity(&'a EntityDescriptor),
    Property(&'a PropertyDescriptor),
}

/// Translates schema elements into builder statements.
///
/// Implementations are opaque text producers: callers never inspect what
/// they write, they only decide the order and the surrounding unit.
pub trait CodeEmitter {
    /// Write the statements that rebuild one entity (and everything it owns)
    /// against the builder named `builder_name`.
    fn emit_entity_shape(&self, builder_name: &str, entity: &EntityDescriptor, out: &mut IndentedWriter);

    /// Write annotation calls. With `chained` the calls continue an open
    /// expression and the caller terminates it; otherwise a complete
    /// statement rooted at `builder_name` is written.
    fn emit_annotations(
        &self,
        builder_name: &str,
        target: AnnotationTarget<'_>,
        out: &mut IndentedWriter,
        annotations: &Annotations,
        chained: bool,
        leading_blank_line: bool,
    );

    /// Write one sequence declaration.
    fn emit_sequence(&self, builder_name: &str, sequence: &SequenceDescriptor, out: &mut IndentedWriter);

    /// Module path holding `ModelSnapshot`, `ModelBuilder` and the types
    /// emitted statements refer to
    fn runtime_path(&self) -> String {
        DEFAULT_RUNTIME_PATH.to_string()
    }

    /// `use` paths generated units need from the host runtime
    fn runtime_imports(&self) -> Vec<String> {
        vec![format!("{}::*", self.runtime_path())]
    }
}

/// Text buffer that indents every line it starts
#[derive(Debug, Clone)]
pub struct IndentedWriter {
    buffer: String,
    level: usize,
    at_line_start: bool,
}

const INDENT: &str = "    ";

impl IndentedWriter {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            level: 0,
            at_line_start: true,
        }
    }

    /// Append text; embedded newlines start new indented lines
    pub fn append(&mut self, text: &str) -> &mut Self {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.buffer.push('\n');
                self.at_line_start = true;
            }
            if line.is_empty() {
                continue;
            }
            if self.at_line_start {
                for _ in 0..self.level {
                    self.buffer.push_str(INDENT);
                }
                self.at_line_start = false;
            }
            self.buffer.push_str(line);
        }
        self
    }

    pub fn append_line(&mut self, text: &str) -> &mut Self {
        self.append(text);
        self.buffer.push('\n');
        self.at_line_start = true;
        self
    }

    pub fn blank_line(&mut self) -> &mut Self {
        self.append_line("")
    }

    pub fn indent(&mut self) -> &mut Self {
        self.level += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl Default for IndentedWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the header shared by generated units: marker line, doc lines, the
/// lint allowances generated code needs, and a blank separator.
pub fn write_unit_header(out: &mut IndentedWriter, namespace: &str, description: &str) {
    out.append_line(AUTO_GENERATED_HEADER);
    out.append_line(&format!("//! {}", description));
    if !namespace.trim().is_empty() {
        out.append_line("//!");
        out.append_line(&format!("//! Namespace: `{}`", namespace.trim()));
    }
    out.append_line("#![allow(unused_imports, unused_variables, non_snake_case, clippy::all)]");
    out.blank_line();
}

/// Last segment of a type path (`crate::data::ShopContext` -> `ShopContext`)
pub fn type_name(type_path: &str) -> &str {
    type_path.rsplit("::").next().unwrap_or(type_path).trim()
}

/// Render a string as a Rust string literal
pub fn literal(value: &str) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_indented_writer_indents_new_lines() {
        let mut out = IndentedWriter::new();
        out.append_line("fn build() {");
        out.indent();
        out.append("let a = 1;\nlet b = 2;");
        out.append_line("");
        out.blank_line();
        out.dedent();
        out.append_line("}");

        assert_eq!(
            out.as_str(),
            "fn build() {\n    let a = 1;\n    let b = 2;\n\n}\n"
        );
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name("crate::data::ShopContext"), "ShopContext");
        assert_eq!(type_name("ShopContext"), "ShopContext");
    }

    #[test]
    fn test_literal_escapes_quotes() {
        assert_eq!(literal("a\"b"), "\"a\\\"b\"");
    }
}
