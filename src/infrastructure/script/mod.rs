//! Embedded script engine for operator-submitted command snippets
//!
//! Snippets are Rhai scripts. The convention replacing the reference
//! implementation's scope diffing: a snippet must define exactly one public
//! top-level function taking a single parameter (the invocation arguments as
//! an array). The function's name becomes the command name.

use std::sync::Arc;

use async_trait::async_trait;
use rhai::{Array, Dynamic, Engine, FnAccess, Scope, AST};

use crate::application::errors::{CommandError, SnippetError};
use crate::domain::entities::{CommandContext, Handler};

/// Wrapper around a configured Rhai engine, shared by every script command.
pub struct ScriptEngine {
    engine: Engine,
}

impl ScriptEngine {
    /// Build an engine with script `print`/`debug` routed to tracing and an
    /// optional operation budget bounding runaway evaluation.
    pub fn new(max_operations: Option<u64>) -> Self {
        let mut engine = Engine::new();
        if let Some(ops) = max_operations {
            engine.set_max_operations(ops);
        }
        engine.on_print(|text| tracing::info!(target: "instantcmd::script", "{}", text));
        engine.on_debug(|text, source, pos| {
            tracing::debug!(target: "instantcmd::script", ?source, %pos, "{}", text)
        });
        Self { engine }
    }

    /// Compile a snippet and locate its single entry function.
    ///
    /// Top-level statements are run once here, so a snippet whose setup code
    /// fails is rejected the same way a syntax error is.
    pub fn extract(&self, source: &str) -> Result<ScriptFn, SnippetError> {
        let ast = self
            .engine
            .compile(source)
            .map_err(|e| SnippetError::Compile(e.to_string()))?;
        self.engine
            .run_ast(&ast)
            .map_err(|e| SnippetError::Compile(e.to_string()))?;

        let functions: Vec<_> = ast.iter_functions().collect();
        if functions.len() != 1 {
            return Err(SnippetError::AmbiguousDefinition {
                count: functions.len(),
            });
        }
        let meta = &functions[0];
        if meta.access == FnAccess::Private {
            return Err(SnippetError::InvalidKind(format!(
                "`{}` is private; the entry function must be public",
                meta.name
            )));
        }
        if meta.params.len() != 1 {
            return Err(SnippetError::InvalidKind(format!(
                "`{}` must take exactly one parameter (the argument list), it takes {}",
                meta.name,
                meta.params.len()
            )));
        }

        Ok(ScriptFn {
            name: meta.name.to_string(),
            ast,
        })
    }

    fn call(&self, ast: &AST, name: &str, args: Vec<String>) -> Result<Option<String>, CommandError> {
        let array: Array = args.into_iter().map(Dynamic::from).collect();
        let mut scope = Scope::new();
        let result: Dynamic = self
            .engine
            .call_fn(&mut scope, ast, name, (array,))
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        if result.is::<()>() {
            Ok(None)
        } else {
            Ok(Some(result.to_string()))
        }
    }
}

/// A compiled snippet entry function, ready to be registered as a command.
#[derive(Clone, Debug)]
pub struct ScriptFn {
    pub name: String,
    ast: AST,
}

impl ScriptFn {
    /// Turn the compiled function into a command handler.
    pub fn into_handler(self, engine: Arc<ScriptEngine>) -> Arc<dyn Handler> {
        Arc::new(ScriptHandler {
            engine,
            name: self.name,
            ast: self.ast,
        })
    }
}

struct ScriptHandler {
    engine: Arc<ScriptEngine>,
    name: String,
    ast: AST,
}

#[async_trait]
impl Handler for ScriptHandler {
    async fn run(&self, ctx: CommandContext) -> Result<Option<String>, CommandError> {
        self.engine.call(&self.ast, &self.name, ctx.args)
    }
}
