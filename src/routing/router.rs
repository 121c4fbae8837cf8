//! Request dispatch.
//!
//! Precedence, first match wins:
//! 1. trigger hostname → easter egg
//! 2. intercepted path prefix → meme image or overlay, per image mode
//! 3. everything else → plain forward

use crate::config::{ImageMode, ProxyConfig};
use crate::http::ProxyRequest;
use crate::routing::matcher::{HostMatcher, Matcher, PathPrefixMatcher};

/// The handler a request is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    EasterEgg,
    MemeImage,
    ImageOverlay,
    Forward,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::EasterEgg => "easter_egg",
            Route::MemeImage => "meme_image",
            Route::ImageOverlay => "image_overlay",
            Route::Forward => "forward",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable dispatch table built once at startup.
#[derive(Debug)]
pub struct Router {
    easter_egg: Box<dyn Matcher>,
    images: Box<dyn Matcher>,
    mode: ImageMode,
}

impl Router {
    pub fn new(trigger_host: &str, path_prefix: &str, mode: ImageMode) -> Self {
        Self {
            easter_egg: Box::new(HostMatcher::new(trigger_host)),
            images: Box::new(PathPrefixMatcher::new(path_prefix)),
            mode,
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(
            &config.easter_egg.trigger_host,
            &config.images.path_prefix,
            config.images.mode,
        )
    }

    pub fn mode(&self) -> ImageMode {
        self.mode
    }

    /// Pick exactly one handler for `req`.
    pub fn route(&self, req: &ProxyRequest) -> Route {
        if self.easter_egg.matches(req) {
            return Route::EasterEgg;
        }
        if self.images.matches(req) {
            return match self.mode {
                ImageMode::Substitute => Route::MemeImage,
                ImageMode::Overlay => Route::ImageOverlay,
            };
        }
        Route::Forward
    }
}
