//! Lowering: parsed tree -> executable module.
//!
//! "Compilation" for the baseline runtime profile is type erasure: type
//! aliases, interfaces, and import statements have no runtime presence
//! and are dropped; everything else executes as written. The output is
//! the stable input format the sandbox accepts, so a given source file
//! always lowers to the same module.

use std::rc::Rc;

use quicklens_frontend::ast::{SourceFile, Stmt};

/// Executable form of a whole source file.
#[derive(Clone)]
pub struct CompiledModule {
    pub body: Rc<Vec<Stmt>>,
}

pub fn compile(file: &SourceFile) -> CompiledModule {
    let body = file
        .items
        .iter()
        .filter(|stmt| {
            !matches!(
                stmt,
                Stmt::Interface(_) | Stmt::TypeAlias(_) | Stmt::Import(_)
            )
        })
        .cloned()
        .collect();
    CompiledModule {
        body: Rc::new(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicklens_frontend::parse_source;

    #[test]
    fn type_declarations_and_imports_are_erased() {
        let file = parse_source(
            "import { x } from \"m\";\ntype Id = number;\ninterface P { x: number }\nfunction f() { return 1; }\nconst g = () => 2;",
        )
        .expect("parse failed");
        let module = compile(&file);
        assert_eq!(module.body.len(), 2);
        assert!(matches!(module.body[0], Stmt::Function(_)));
        assert!(matches!(module.body[1], Stmt::Var(_)));
    }
}
