use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use minijinja::value::{Rest, Value};
use minijinja::{path_loader, Environment, ErrorKind};
use serde::Serialize;
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::error::{Chainable, Result};
use crate::renderer::ResponsiveImage;
use super::DIRECTIVE;

/// A minijinja environment with the image directive registered.
///
/// Directives run to completion on `runtime` while the template renders.
/// Rendering may happen on a plain thread, inside `spawn_blocking` or
/// directly on a tokio worker; on a worker the directive blocks only its own
/// thread.
#[derive(Debug)]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new(renderer: Arc<ResponsiveImage>, runtime: Handle) -> Self {
        let mut env = Environment::new();
        register(&mut env, renderer, runtime);
        MiniJinjaEngine { env }
    }

    /// Loads named templates from `dir`.
    pub fn with_templates<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.env.set_loader(path_loader(dir.as_ref().to_path_buf()));
        self
    }

    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    pub fn render<C: Serialize>(&self, name: &str, context: C) -> Result<String> {
        let template = self.env.get_template(name)?;
        template.render(context).chain_with(|| error! {
            "failed to render template",
            "template" => name,
        })
    }

    pub fn render_str<C: Serialize>(&self, template: &str, context: C) -> Result<String> {
        self.env.render_str(template, context)
            .chain_with(|| "failed to render template string")
    }
}

/// Registers the image directive with `env`, for callers that manage their
/// own environment.
pub fn register(env: &mut Environment<'_>, renderer: Arc<ResponsiveImage>, runtime: Handle) {
    env.add_function(DIRECTIVE, move |args: Rest<Value>| -> Result<Value, minijinja::Error> {
        let request = directive::request(&args.0)?;
        block_on(&runtime, renderer.render(&request))?
            .map(|fragment| Value::from_safe_string(fragment.into()))
            .map_err(directive::error)
    });
}

/// Drives `future` to completion on `runtime` from synchronous template code,
/// whether or not the caller is itself running inside a tokio runtime.
fn block_on<F>(runtime: &Handle, future: F) -> Result<F::Output, minijinja::Error>
    where F: Future + Send, F::Output: Send
{
    match Handle::try_current().map(|current| current.runtime_flavor()) {
        Err(_) => Ok(runtime.block_on(future)),
        Ok(RuntimeFlavor::MultiThread) => {
            Ok(tokio::task::block_in_place(|| runtime.block_on(future)))
        }
        // A current-thread runtime can't be blocked from within; a helper
        // thread drives the future instead.
        Ok(_) => std::thread::scope(|scope| scope.spawn(|| runtime.block_on(future)).join())
            .map_err(|_| minijinja::Error::new(
                ErrorKind::InvalidOperation,
                format!("`{DIRECTIVE}` panicked while rendering")
            )),
    }
}

mod directive {
    use minijinja::value::{Value, ValueKind};
    use minijinja::{Error, ErrorKind};

    use crate::error::ImageError;
    use crate::request::{AltText, ImageRequest};
    use crate::templating::{widths_from_ints, DIRECTIVE};

    const MAX_ARGS: usize = 6;

    fn is_absent(value: &Value) -> bool {
        value.is_undefined() || value.is_none()
    }

    fn string(value: &Value) -> String {
        value.as_str().map_or_else(|| value.to_string(), String::from)
    }

    fn optional(value: Option<&Value>) -> Option<String> {
        value.filter(|v| !is_absent(v)).map(string)
    }

    fn widths(value: &Value) -> Result<Vec<u32>, String> {
        match value.kind() {
            ValueKind::Number => widths_from_ints([i64::try_from(value.clone()).ok()]),
            ValueKind::Seq => {
                let iter = value.try_iter().map_err(|e| e.to_string())?;
                widths_from_ints(iter.map(|v| i64::try_from(v).ok()))
            }
            kind => Err(format!("expected a list of widths, found {kind}")),
        }
    }

    pub fn request(args: &[Value]) -> Result<ImageRequest, Error> {
        if args.len() > MAX_ARGS {
            return Err(Error::new(
                ErrorKind::TooManyArguments,
                format!("`{DIRECTIVE}` takes at most {MAX_ARGS} arguments, found {}", args.len())
            ));
        }

        let source = match args.first() {
            Some(value) => value.as_str().ok_or_else(|| Error::new(
                ErrorKind::InvalidOperation,
                format!("`{DIRECTIVE}` source must be a string, found {}", value.kind())
            ))?,
            None => return Err(Error::new(
                ErrorKind::MissingArgument,
                format!("`{DIRECTIVE}` expects a source image path")
            )),
        };

        let alt = AltText::from(optional(args.get(1)));
        let mut request = ImageRequest::new(source, alt, Vec::new());
        if let Some(value) = args.get(2).filter(|v| !is_absent(v)) {
            request.widths = widths(value).map_err(|reason| error(request.invalid_widths(reason)))?;
        }

        request.classes = optional(args.get(3)).unwrap_or_default();
        request.link_url = optional(args.get(4)).unwrap_or_default();
        request.link_target = optional(args.get(5));
        Ok(request)
    }

    pub fn error(e: ImageError) -> Error {
        Error::new(ErrorKind::InvalidOperation, format!("`{DIRECTIVE}` failed: {e}"))
            .with_source(e)
    }
}

impl_error_detail_with_std_error!(minijinja::Error);
