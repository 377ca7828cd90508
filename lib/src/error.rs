use std::{fmt, io};
use std::path::{Path, PathBuf};
use std::panic::Location;
use std::error::Error as StdError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A chain of error details, each carrying `(key, value)` context.
///
/// Anything implementing [`ErrorDetail`] converts into an `Error`, so `?`
/// works on `io::Error`, `toml::de::Error`, [`ImageError`] and friends. Use
/// [`Chainable::chain()`] to put a higher-level explanation in front.
#[derive(Debug)]
pub struct Error {
    detail: Vec<Box<dyn ErrorDetail>>,
    prev: Option<Box<Error>>,
    location: &'static Location<'static>,
}

pub trait ErrorDetail: fmt::Display + fmt::Debug + Send + Sync {
    fn context(&self) -> Vec<(Option<String>, String)> { vec![] }
}

impl Error {
    #[track_caller]
    pub fn from_std<E>(error: E) -> Self
        where E: StdError + Send + Sync + 'static
    {
        Error::from(Box::new(error) as Box<dyn StdError + Send + Sync>)
    }

    pub fn chain(self, mut other: Error) -> Self {
        fn _chain(error: Error, behind: &mut Error) {
            match behind.prev.as_mut() {
                Some(prev) => _chain(error, prev),
                None => behind.prev = Some(Box::new(error)),
            }
        }

        _chain(self, &mut other);
        other
    }

    /// The top-level messages of this error, outermost first.
    pub fn messages(&self) -> impl Iterator<Item = String> + '_ {
        self.detail.iter().map(|d| d.to_string())
    }

    /// The error this one was chained in front of, if any.
    pub fn cause(&self) -> Option<&Error> {
        self.prev.as_deref()
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl ErrorDetail for &(dyn StdError + Send + Sync) {
    fn context(&self) -> Vec<(Option<String>, String)> {
        let mut ctxt = vec![];
        let mut error = self.source();
        while let Some(e) = error {
            ctxt.push((None, e.to_string()));
            error = e.source();
        }

        ctxt
    }
}

impl ErrorDetail for Box<dyn StdError + Send + Sync> {
    fn context(&self) -> Vec<(Option<String>, String)> {
        let error: &(dyn StdError + Send + Sync) = &**self;
        ErrorDetail::context(&error)
    }
}

#[macro_export]
#[doc(hidden)]
macro_rules! impl_error_detail_with_std_error {
    ($T:ty) => {
        impl $crate::error::ErrorDetail for $T {
            fn context(&self) -> Vec<(Option<String>, String)> {
                let error: &(dyn std::error::Error + Send + Sync) = self;
                $crate::error::ErrorDetail::context(&error)
            }
        }
    }
}

impl_error_detail_with_std_error!(io::Error);
impl_error_detail_with_std_error!(toml::de::Error);
impl_error_detail_with_std_error!(ImageError);
impl_error_detail_with_std_error!(ResizeError);

impl ErrorDetail for String { }
impl ErrorDetail for &str { }

impl<T: ErrorDetail + 'static> From<T> for Error {
    #[track_caller]
    fn from(detail: T) -> Self {
        Error {
            prev: None,
            detail: vec![Box::new(detail)],
            location: Location::caller(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_nested(f: &mut fmt::Formatter<'_>, depth: usize, e: &Error) -> fmt::Result {
            let indent = " ".repeat(depth * 4);
            let indent_line = format!("\n{indent}");
            for detail in &e.detail {
                writeln!(f, "{indent}{}", detail.to_string().replace('\n', &indent_line))?;
                if let Some(prev) = &e.prev {
                    write_nested(f, depth + 1, prev)?;
                }

                for (key, value) in detail.context() {
                    let value = value.replace('\n', &indent_line);
                    match key {
                        Some(key) => writeln!(f, "{indent}{key}: {value}")?,
                        None => writeln!(f, "{indent}{value}")?,
                    }
                }

                if std::env::var_os("RUST_BACKTRACE").is_some() {
                    writeln!(f, "{indent}[{}]", e.location)?;
                }
            }

            Ok(())
        }

        write_nested(f, 0, self)
    }
}

/// A message with ad-hoc context, as built by [`error!`](crate::error!).
#[derive(Debug)]
pub struct Message {
    pub message: String,
    pub parameters: Vec<(Option<String>, String)>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl ErrorDetail for Message {
    fn context(&self) -> Vec<(Option<String>, String)> {
        self.parameters.clone()
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! err {
    ($($token:tt)*) => (Err($crate::error!($($token)*)));
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($msg:expr, $($rest:tt)*) => (
        $crate::error::Error::from($crate::error::Message {
            message: $msg.to_string(),
            parameters: {
                #[allow(unused_mut)]
                let mut v: Vec<(Option<String>, String)> = Vec::new();
                $crate::error!(@param v $($rest)*);
                v
            },
        })
    );

    ($msg:expr) => ( $crate::error!($msg,) );

    (@param $v:ident $key:expr => $value:expr, $($rest:tt)*) => {
        $crate::error!(@param $v $key => $value);
        $crate::error!(@param $v $($rest)*);
    };

    (@param $v:ident $key:expr => $value:expr) => {
        $v.push((Some($key.to_string()), $value.to_string()));
    };

    (@param $v:ident $value:expr, $($rest:tt)*) => {
        $crate::error!(@param $v $value);
        $crate::error!(@param $v $($rest)*);
    };

    (@param $v:ident $value:expr) => {
        $v.push((None, $value.to_string()));
    };

    (@param $v:ident $(,)?) => { };
}

pub trait Chainable<T> {
    fn chain(self, other: impl Into<Error>) -> Result<T>;

    fn chain_with<F, E>(self, f: F) -> Result<T>
        where F: FnOnce() -> E, E: Into<Error>;
}

impl<T, E: Into<Error>> Chainable<T> for Result<T, E> {
    #[track_caller]
    fn chain(self, other: impl Into<Error>) -> Result<T> {
        self.map_err(|e| e.into().chain(other.into()))
    }

    #[track_caller]
    fn chain_with<F, Err>(self, f: F) -> Result<T>
        where F: FnOnce() -> Err, Err: Into<Error>,
    {
        self.map_err(|e| e.into().chain(f().into()))
    }
}

/// Why a single image directive could not be rendered.
///
/// Every variant names the source image so a failed build points at the
/// offending directive.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("missing `alt` on responsive image from: {}", path.display())]
    MissingAltText { path: PathBuf },

    #[error("invalid width list for {}: {reason}", path.display())]
    InvalidWidthList { path: PathBuf, reason: String },

    #[error("failed to generate variants of {}", path.display())]
    ImageProcessingFailed {
        path: PathBuf,
        #[source]
        cause: ResizeError,
    },
}

impl ImageError {
    pub fn path(&self) -> &Path {
        match self {
            ImageError::MissingAltText { path }
            | ImageError::InvalidWidthList { path, .. }
            | ImageError::ImageProcessingFailed { path, .. } => path,
        }
    }
}

/// Failures of the resize primitive.
#[derive(Debug, thiserror::Error)]
pub enum ResizeError {
    #[error("i/o error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("source image could not be decoded")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode the {width}px variant")]
    Encode {
        width: u32,
        #[source]
        source: image::ImageError,
    },

    #[error("resize task did not run to completion")]
    Task(#[from] tokio::task::JoinError),

    #[error("resize produced {actual} variants for {expected} requested widths")]
    VariantCount { expected: usize, actual: usize },
}

impl ResizeError {
    pub(crate) fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        ResizeError::Io { path: path.as_ref().to_path_buf(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_errors_render_context() {
        let inner: Result<()> = err!("inner failure", "width" => 480);
        let error = inner.chain(error!("outer failure", "path" => "cat.jpg")).unwrap_err();

        let rendered = error.to_string();
        assert!(rendered.starts_with("outer failure\n"));
        assert!(rendered.contains("    inner failure\n"));
        assert!(rendered.contains("    width: 480\n"));
        assert!(rendered.contains("path: cat.jpg\n"));
        assert_eq!(error.cause().unwrap().messages().next().unwrap(), "inner failure");
    }

    #[test]
    fn image_error_source_chain_becomes_context() {
        let image_error = ImageError::ImageProcessingFailed {
            path: "img/cat.jpg".into(),
            cause: ResizeError::VariantCount { expected: 3, actual: 2 },
        };

        assert_eq!(image_error.path(), Path::new("img/cat.jpg"));
        let error = Error::from(image_error);
        let rendered = error.to_string();
        assert!(rendered.contains("failed to generate variants of img/cat.jpg"));
        assert!(rendered.contains("resize produced 2 variants for 3 requested widths"));
    }

    #[test]
    fn missing_alt_names_source() {
        let error = ImageError::MissingAltText { path: "img/dog.png".into() };
        assert_eq!(error.to_string(), "missing `alt` on responsive image from: img/dog.png");
    }
}
