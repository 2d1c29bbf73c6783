/// Spec tests for `import`/`export`.
///
/// Every test writes its module files into a fresh directory under the
/// system temp dir and runs a main program with that directory as the
/// import base.
use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use kscript::interpreter::{InterpretError, Interpreter, RuntimeError};
use pretty_assertions::assert_eq;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct Capture(Rc<RefCell<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Write `files` (relative path, source) into a fresh directory.
fn fixture(name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kscript-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    for (rel, src) in files {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, src).unwrap();
    }
    dir
}

fn interpreter(base: &Path) -> (Interpreter, Capture) {
    let out = Capture::default();
    let mut interp = Interpreter::new().with_output(Box::new(out.clone()));
    interp.set_base_dir(base);
    (interp, out)
}

fn run_in(base: &Path, main: &str) -> String {
    let (mut interp, out) = interpreter(base);
    if let Err(e) = interp.run_source(main) {
        panic!("program failed: {}", e);
    }
    let text = String::from_utf8_lossy(&out.0.borrow()).into_owned();
    text
}

fn run_err_in(base: &Path, main: &str) -> RuntimeError {
    let (mut interp, _) = interpreter(base);
    match interp.run_source(main) {
        Err(InterpretError::Runtime(e)) => e,
        Err(other) => panic!("expected a runtime error, got: {}", other),
        Ok(()) => panic!("expected a runtime error, program succeeded"),
    }
}

const LIB: &str = "
__put('L');
int hidden = 5;
export int answer = 42;
export int twice(int n) { return n * 2; }
export int peek() { return hidden; }
export struct Pair { int a; int b; }
";

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn module_executes_once() {
    let dir = fixture("once", &[("lib.ks", LIB)]);
    let out = run_in(&dir, "import \"lib.ks\"; import \"lib.ks\"; answer;");
    assert_eq!(out, "LResult: 42\n");
}

#[test]
fn plain_import_binds_exports() {
    let dir = fixture("plain", &[("lib.ks", LIB)]);
    let out = run_in(&dir, "import \"lib.ks\"; twice(4); peek();");
    assert_eq!(out, "LResult: 8\nResult: 5\n");
}

#[test]
fn private_names_stay_private() {
    let dir = fixture("private", &[("lib.ks", LIB)]);
    assert_eq!(
        run_err_in(&dir, "import \"lib.ks\"; hidden;"),
        RuntimeError::UndefinedVariable("hidden".to_string())
    );
}

#[test]
fn aliased_import_is_a_namespace() {
    let dir = fixture("alias", &[("lib.ks", LIB)]);
    let out = run_in(&dir, "import as m from \"lib.ks\"; m.answer; m.twice(3);");
    assert_eq!(out, "LResult: 42\nResult: 6\n");
}

#[test]
fn missing_export_fails() {
    let dir = fixture("missing-export", &[("lib.ks", LIB)]);
    assert!(matches!(
        run_err_in(&dir, "import as m from \"lib.ks\"; m.nope;"),
        RuntimeError::MemberNotFound(_)
    ));
}

#[test]
fn module_exports_are_read_only() {
    let dir = fixture("read-only", &[("lib.ks", LIB)]);
    assert!(matches!(
        run_err_in(&dir, "import as m from \"lib.ks\"; m.answer = 1;"),
        RuntimeError::InvalidAssignmentTarget(_)
    ));
}

#[test]
fn exported_struct_can_be_constructed() {
    let dir = fixture("struct", &[("lib.ks", LIB)]);
    let out = run_in(&dir, "import \"lib.ks\"; Pair p = new Pair(); p.b = 3; p.b;");
    assert_eq!(out, "LResult: 3\n");
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

#[test]
fn nested_imports_resolve_against_importer() {
    let dir = fixture(
        "nested",
        &[
            ("sub/outer.ks", "import \"inner.ks\"; export int outer = inner + 1;"),
            ("sub/inner.ks", "export int inner = 1;"),
        ],
    );
    let out = run_in(&dir, "import \"sub/outer.ks\"; outer;");
    assert_eq!(out, "Result: 2\n");
}

#[test]
fn backslash_paths_are_accepted() {
    let dir = fixture("backslash", &[("sub/val.ks", "export int v = 7;")]);
    let out = run_in(&dir, "import \"sub\\\\val.ks\"; v;");
    assert_eq!(out, "Result: 7\n");
}

#[test]
fn same_file_through_different_paths_loads_once() {
    let dir = fixture("same-file", &[("a.ks", "__put('A');"), ("sub/x.ks", "")]);
    let out = run_in(&dir, "import \"a.ks\"; import \"sub/../a.ks\";");
    assert_eq!(out, "A");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn missing_file_fails() {
    let dir = fixture("missing-file", &[]);
    assert!(matches!(
        run_err_in(&dir, "import \"nope.ks\";"),
        RuntimeError::ModuleLoad { .. }
    ));
}

#[test]
fn parse_error_in_module_is_a_load_error() {
    let dir = fixture("bad-syntax", &[("bad.ks", "int = ;")]);
    match run_err_in(&dir, "import \"bad.ks\";") {
        RuntimeError::ModuleLoad { reason, .. } => assert!(reason.contains("error["), "{}", reason),
        other => panic!("expected a load error, got {:?}", other),
    }
}

#[test]
fn import_cycle_is_detected() {
    let dir = fixture(
        "cycle",
        &[("a.ks", "import \"b.ks\";"), ("b.ks", "import \"a.ks\";")],
    );
    assert_eq!(
        run_err_in(&dir, "import \"a.ks\";"),
        RuntimeError::CyclicImport("a -> b -> a".to_string())
    );
}

#[test]
fn failed_module_is_not_cached() {
    let dir = fixture("evict", &[("boom.ks", "export int x = 1 / 0;")]);
    let (mut interp, _) = interpreter(&dir);
    assert!(interp.run_source("import \"boom.ks\";").is_err());
    assert!(interp.modules().is_empty());
}

#[test]
fn loaded_modules_are_cached() {
    let dir = fixture("cache", &[("one.ks", "export int one = 1;"), ("two.ks", "export int two = 2;")]);
    let (mut interp, _) = interpreter(&dir);
    interp
        .run_source("import \"one.ks\"; import \"two.ks\"; import \"one.ks\";")
        .unwrap();
    assert_eq!(interp.modules().len(), 2);
}

#[test]
fn run_file_uses_file_directory() {
    let dir = fixture(
        "run-file",
        &[("prog/main.ks", "import \"lib.ks\"; __put('0' + value);"), ("prog/lib.ks", "export int value = 3;")],
    );
    let out = Capture::default();
    let mut interp = Interpreter::new().with_output(Box::new(out.clone()));
    interp.run_file(dir.join("prog/main.ks")).unwrap();
    assert_eq!(String::from_utf8_lossy(&out.0.borrow()), "3");
}
