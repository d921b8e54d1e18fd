//! Call-site resolution for the `caller` field
//!
//! Record constructors are `#[track_caller]`, so the location handed to the
//! resolver is already the first frame outside the logger. Wrapping layers
//! that also carry `#[track_caller]` stay transparent. Wrappers that don't
//! are covered by `caller_skip`: the default resolver then walks the stack
//! from the tracked frame and reports the frame `skip` levels further out.

use std::borrow::Cow;
use std::panic::Location;

/// Placeholder written when a call site cannot be resolved
pub const UNKNOWN_CALLER: &str = "???";

/// The call site of a record
#[derive(Debug, Clone, Copy)]
pub struct CallSite {
    location: &'static Location<'static>,
    skip: usize,
}

impl CallSite {
    pub fn new(location: &'static Location<'static>, skip: usize) -> Self {
        Self { location, skip }
    }

    #[inline]
    pub fn file(&self) -> &'static str {
        self.location.file()
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.location.line()
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.location.column()
    }

    /// Extra frames the configuration asks to skip
    #[inline]
    pub fn skip(&self) -> usize {
        self.skip
    }
}

/// Turns a call site into the textual `caller` value
pub trait CallerResolver: Send + Sync {
    /// `None` when the site is unknown
    fn resolve(&self, site: &CallSite) -> Option<Cow<'static, str>>;
}

/// Default resolver: `<parent dir>/<file>:<line>`
///
/// With a non-zero skip the stack is captured and symbolized, which needs
/// debug info. A site that cannot be found on the stack resolves to `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocationResolver;

impl CallerResolver for LocationResolver {
    fn resolve(&self, site: &CallSite) -> Option<Cow<'static, str>> {
        let file = site.file();
        if file.is_empty() {
            return None;
        }

        if site.skip() > 0 {
            return walk_stack(site).map(Cow::Owned);
        }

        Some(Cow::Owned(format!("{}:{}", short_path(file), site.line())))
    }
}

/// Find the frame of `site` on the current stack, then step `skip` frames
/// towards the root.
fn walk_stack(site: &CallSite) -> Option<String> {
    let mut anchored = false;
    let mut remaining = site.skip();
    let mut resolved: Option<Option<String>> = None;

    backtrace::trace(|frame| {
        // Inlined calls yield several symbols for one frame, innermost first
        backtrace::resolve_frame(frame, |symbol| {
            if resolved.is_some() {
                return;
            }

            let position = symbol.filename().zip(symbol.lineno());
            if !anchored {
                anchored = position.map_or(false, |(file, line)| {
                    line == site.line() && file.ends_with(site.file())
                });
                return;
            }

            remaining -= 1;
            if remaining == 0 {
                resolved = Some(position.map(|(file, line)| {
                    format!("{}:{}", short_path(&file.to_string_lossy()), line)
                }));
            }
        });

        resolved.is_none()
    });

    resolved.flatten()
}

/// Keep the last two components of `path`
fn short_path(path: &str) -> &str {
    let is_sep = |c: char| c == '/' || c == '\\';

    match path.rfind(is_sep) {
        Some(last) => match path[..last].rfind(is_sep) {
            Some(prev) => &path[prev + 1..],
            None => path,
        },
        None => path,
    }
}

impl<F> CallerResolver for F
where
    F: Fn(&CallSite) -> Option<Cow<'static, str>> + Send + Sync,
{
    fn resolve(&self, site: &CallSite) -> Option<Cow<'static, str>> {
        self(site)
    }
}
