//! Call-site extraction.
//!
//! Scans a file's top-level declarations for callables: named function
//! declarations, plus identifier-bound variables whose initializer is an
//! arrow function or function expression. Anonymous functions have no
//! name to call and are skipped. Order is declaration order; the anchor
//! is the declaration's start offset.

use quicklens_frontend::ast::{Expr, Param, SourceFile, Stmt};
use quicklens_frontend::jsdoc::JsDoc;

use crate::descriptor::TypeDescriptor;
use crate::resolve::ResolutionContext;

/// A callable declaration with its resolved parameter descriptors.
/// Identity is positional: no two call-sites share an anchor.
#[derive(Debug, Clone)]
pub struct CallSite {
    pub name: String,
    pub params: Vec<TypeDescriptor>,
    pub anchor: u32,
}

pub fn extract_call_sites(file: &SourceFile, ctx: &ResolutionContext<'_>) -> Vec<CallSite> {
    let mut sites = Vec::new();
    for item in &file.items {
        match item {
            Stmt::Function(func) => {
                let Some(name) = &func.name else {
                    continue;
                };
                sites.push(CallSite {
                    name: name.clone(),
                    params: resolve_params(ctx, &func.params, func.doc.as_ref()),
                    anchor: func.span.pos,
                });
            }
            Stmt::Var(var) => {
                let params = match &var.init {
                    Some(Expr::Arrow { params, .. }) => params,
                    Some(Expr::FunctionExpr(func)) => &func.params,
                    _ => continue,
                };
                sites.push(CallSite {
                    name: var.name.clone(),
                    params: resolve_params(ctx, params, var.doc.as_ref()),
                    anchor: var.span.pos,
                });
            }
            _ => {}
        }
    }
    sites
}

fn resolve_params(
    ctx: &ResolutionContext<'_>,
    params: &[Param],
    doc: Option<&JsDoc>,
) -> Vec<TypeDescriptor> {
    params
        .iter()
        .map(|param| ctx.resolve_param(param, doc))
        .collect()
}
