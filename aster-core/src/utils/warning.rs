use std::{
    path::PathBuf,
    rc::Rc,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, RwLock,
    },
};

use termcolor::Buffer;

use crate::analyzer::error::Warning as AnalyzerWarning;

use super::diagnostic::{Diagnostic, Label, Level, Location};
use super::src_span::SrcSpan;

pub trait WarningEmitterIO {
    fn emit_warning(&self, warning: Warning);
}

#[derive(Debug, Clone, Copy)]
pub struct NullWarningEmitterIO;

impl WarningEmitterIO for NullWarningEmitterIO {
    fn emit_warning(&self, _warning: Warning) {}
}

/// Collects warnings instead of printing them; used by tests.
#[derive(Debug, Default, Clone)]
pub struct VectorWarningEmitterIO {
    pub warnings: Arc<RwLock<Vec<Warning>>>,
}

impl VectorWarningEmitterIO {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Warning> {
        let mut warnings = self.write_lock();
        std::mem::take(&mut *warnings)
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Warning>> {
        self.warnings.write().expect("warning vector lock poisoned")
    }
}

impl WarningEmitterIO for VectorWarningEmitterIO {
    fn emit_warning(&self, warning: Warning) {
        let mut warnings = self.write_lock();
        warnings.push(warning);
    }
}

pub struct WarningEmitter {
    count: Arc<AtomicUsize>,
    emitter: Rc<dyn WarningEmitterIO>,
}

impl WarningEmitter {
    pub fn new(emitter: Rc<dyn WarningEmitterIO>) -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
            emitter,
        }
    }

    pub fn null() -> Self {
        Self::new(Rc::new(NullWarningEmitterIO))
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn emit(&self, warning: Warning) {
        let _ = self.count.fetch_add(1, Ordering::Relaxed);
        self.emitter.emit_warning(warning);
    }
}

/// Attaches the module path and source text to analyzer warnings so they
/// can be rendered as diagnostics later.
pub struct TypeWarningEmitter {
    module_path: PathBuf,
    module_src: String,
    emitter: WarningEmitter,
}

impl TypeWarningEmitter {
    pub fn new(module_path: PathBuf, module_src: String, emitter: WarningEmitter) -> Self {
        Self {
            module_path,
            module_src,
            emitter,
        }
    }

    pub fn null() -> Self {
        Self {
            module_path: PathBuf::new(),
            module_src: String::new(),
            emitter: WarningEmitter::null(),
        }
    }

    pub fn emit(&self, warning: AnalyzerWarning) {
        self.emitter.emit(Warning::Type {
            path: self.module_path.clone(),
            src: self.module_src.clone(),
            warning,
        });
    }
}

#[derive(Debug, Clone)]
pub enum Warning {
    Type {
        path: PathBuf,
        src: String,
        warning: AnalyzerWarning,
    },
}

impl Warning {
    pub fn pretty_string(&self) -> String {
        let mut nocolor = Buffer::no_color();
        self.pretty(&mut nocolor);

        String::from_utf8(nocolor.into_inner()).expect("warning printing produced invalid utf8")
    }

    pub fn pretty(&self, buf: &mut Buffer) {
        use std::io::Write;

        self.to_diagnostic().write(buf);
        buf.write_all(b"\n").expect("warning buffer write");
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Warning::Type { path, src, warning } => {
                let (title, label, span) = match warning {
                    AnalyzerWarning::UnreachableIfClause { location } => {
                        ("Unreachable branch", "The condition is always FALSE", *location)
                    },
                    AnalyzerWarning::UnreachableElseClause { location } => {
                        ("Unreachable branch", "The condition is always TRUE", *location)
                    },
                    AnalyzerWarning::UnreachableWhileBody { location } => {
                        ("Unreachable loop body", "The condition is always FALSE", *location)
                    },
                    AnalyzerWarning::InfiniteLoop { location } => {
                        ("Infinite loop", "The condition is always TRUE", *location)
                    },
                    AnalyzerWarning::UnreachableCode { location } => {
                        ("Unreachable code", "Execution returned just before this", *location)
                    },
                };

                self.spanned_diagnostic(title, label, span, path, src)
            },
        }
    }

    fn spanned_diagnostic<'a>(
        &self,
        title: &str,
        label: &str,
        span: SrcSpan,
        path: &PathBuf,
        src: &'a str,
    ) -> Diagnostic<'a> {
        Diagnostic {
            title: title.to_string(),
            text: String::new(),
            hint: None,
            level: Level::Warning,
            location: Some(Location {
                src,
                path: path.clone(),
                label: Label {
                    text: Some(label.to_string()),
                    span,
                },
                extra_labels: vec![],
            }),
        }
    }
}
