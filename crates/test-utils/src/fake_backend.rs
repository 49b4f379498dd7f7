use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lesswatch::compile::{
    BuildContext, CompileBackend, CompileFailure, CompileRequest, Diagnostic,
};

/// A fake compiler backend that:
/// - records every source it was asked to compile
/// - writes a small stylesheet to the requested output
/// - fails with a diagnostic for sources whose file name was marked broken.
///
/// Clones share state, so a test can keep one handle and give a boxed clone
/// to the `Compiler`.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    calls: Arc<Mutex<Vec<PathBuf>>>,
    broken: Arc<Mutex<HashSet<String>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every compilation of a source named `file_name` fail.
    pub fn break_file(&self, file_name: &str) {
        self.broken.lock().unwrap().insert(file_name.to_string());
    }

    pub fn fix_file(&self, file_name: &str) {
        self.broken.lock().unwrap().remove(file_name);
    }

    /// Sources compiled so far, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of calls for sources ending in `suffix`.
    pub fn calls_for(&self, suffix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.to_string_lossy().replace('\\', "/").ends_with(suffix))
            .count()
    }

    pub fn boxed(&self) -> Box<dyn CompileBackend> {
        Box::new(self.clone())
    }
}

impl CompileBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn compile(&self, request: &CompileRequest<'_>) -> Result<(), CompileFailure> {
        self.calls.lock().unwrap().push(request.source.to_path_buf());

        let name = file_name(request.source);
        if self.broken.lock().unwrap().contains(&name) {
            return Err(CompileFailure::Diagnostic(Diagnostic {
                message: format!("ParseError: Unrecognised input in {name}"),
                line: Some(1),
                column: Some(1),
            }));
        }

        let css = if request.options.compress {
            format!("/*{name}*/a{{b:c}}")
        } else {
            format!("/* {name} */\na {{\n  b: c;\n}}\n")
        };
        fs::write(request.output, css)?;
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Build context that remembers every notification.
#[derive(Debug, Default)]
pub struct RecordingBuildContext {
    pub removed: Mutex<Vec<PathBuf>>,
    pub refreshed: Mutex<Vec<PathBuf>>,
}

impl BuildContext for RecordingBuildContext {
    fn remove_messages(&self, source: &Path) {
        self.removed.lock().unwrap().push(source.to_path_buf());
    }

    fn refresh(&self, output: &Path) {
        self.refreshed.lock().unwrap().push(output.to_path_buf());
    }
}
