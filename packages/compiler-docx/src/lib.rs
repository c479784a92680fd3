mod compiler;
mod context;
mod escape;
mod options;
mod package;
mod run_tree;

pub use compiler::{
    compile_body, split_paragraphs, write_run_tree, CompileError, CompileResult, CompiledBody,
    RevisionEncoder, PARAGRAPH_BREAK,
};
pub use escape::escape_xml;
pub use options::{CompileOptions, RevisionMode};
pub use package::{CoreProperties, DocumentPackage, DocumentSettings, PackageError};
pub use run_tree::{
    AttachError, EncodeStats, Fragment, Highlight, Paragraph, RevisionFragment, RunFormat, RunTree,
};
