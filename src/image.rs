//! Image sizing.
//!
//! An [`ImageRef`] with no declared size (0 × 0) is laid out with a 1 × 1
//! placeholder until its natural size is known. Once measured, any image
//! wider than the layout boundary is scaled down to the boundary width,
//! keeping its aspect ratio.
//!
//! With the `async` feature, [`resolve_image_sizes`] measures every unsized
//! image of a render tree concurrently through a [`SizeResolver`].

use crate::node::{ImageRef, RenderNode};
use crate::style::Style;

// =============================================================================
// ResizableImage
// =============================================================================

/// Sizing state of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizableImage {
    pub uri: Option<String>,
    declared_width: u32,
    declared_height: u32,
    width: u32,
    height: u32,
}

impl ResizableImage {
    pub fn new(image: &ImageRef) -> Self {
        Self {
            uri: image.uri.clone(),
            declared_width: image.width,
            declared_height: image.height,
            width: if image.width > 0 { image.width } else { 1 },
            height: if image.height > 0 { image.height } else { 1 },
        }
    }

    /// Check if the natural size must be measured.
    ///
    /// Any declared dimension suppresses measuring.
    pub fn needs_measure(&self) -> bool {
        self.declared_width == 0 && self.declared_height == 0
    }

    /// Record a measured natural size.
    pub fn set_natural_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Current (declared, measured or placeholder) size.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Final style and source for a layout boundary of `boundary_width`.
    pub fn layout(&self, boundary_width: f32) -> ImageLayout {
        let width = self.width as f32;
        let height = self.height as f32;

        let clamped = (width > boundary_width).then(|| {
            let ratio = boundary_width / width;
            (boundary_width, height * ratio)
        });
        let (final_width, final_height) = clamped.unwrap_or((width, height));

        let mut style = Style::new().with("background_color", "transparent");
        style.merge(
            &Style::new()
                .with("width", self.declared_width)
                .with("height", self.declared_height),
        );
        style.set("width", final_width);
        style.set("height", final_height);

        let (source_width, source_height) = match clamped {
            Some((w, h)) if w > 0.0 && h > 0.0 => (w, h),
            _ => (width, height),
        };

        ImageLayout {
            style,
            source: ImageSource {
                uri: self.uri.clone(),
                width: source_width,
                height: source_height,
            },
        }
    }
}

/// Laid-out image handed to the image primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayout {
    pub style: Style,
    pub source: ImageSource,
}

/// Source descriptor of a laid-out image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    pub uri: Option<String>,
    pub width: f32,
    pub height: f32,
}

/// All image references of a render list, in document order.
pub fn collect_images(list: &[Option<RenderNode>]) -> Vec<&ImageRef> {
    let mut images = Vec::new();
    for node in list.iter().flatten() {
        node.walk(&mut |n| {
            if let Some(image) = n.as_image() {
                images.push(image);
            }
        });
    }
    images
}

// =============================================================================
// Async resolution
// =============================================================================

#[cfg(feature = "async")]
pub use resolve::{SizeResolver, resolve_image_sizes};

#[cfg(feature = "async")]
mod resolve {
    use std::future::Future;

    use futures_util::future::join_all;

    use super::{ImageLayout, ResizableImage, collect_images};
    use crate::node::RenderNode;

    /// Measures the natural size of an image.
    pub trait SizeResolver: Sync {
        type Error: std::fmt::Display;

        fn natural_size(&self, uri: &str) -> impl Future<Output = Result<(u32, u32), Self::Error>> + Send;
    }

    /// Measure every unsized image in `list` concurrently, then lay them out.
    ///
    /// Layouts are returned in document order. An image whose measurement
    /// fails keeps its placeholder size.
    pub async fn resolve_image_sizes<R>(
        list: &[Option<RenderNode>],
        resolver: &R,
        boundary_width: f32,
    ) -> Vec<ImageLayout>
    where
        R: SizeResolver,
    {
        let mut images: Vec<ResizableImage> = collect_images(list)
            .into_iter()
            .map(ResizableImage::new)
            .collect();

        let pending = images
            .iter()
            .enumerate()
            .filter(|(_, image)| image.needs_measure())
            .filter_map(|(i, image)| {
                let uri = image.uri.as_deref()?;
                Some(async move { (i, uri, resolver.natural_size(uri).await) })
            });
        let measured: Vec<_> = join_all(pending)
            .await
            .into_iter()
            .map(|(i, uri, result)| {
                if let Err(err) = &result {
                    log::warn!("failed to measure image {uri}: {err}");
                }
                (i, result.ok())
            })
            .collect();

        for (i, size) in measured {
            if let Some((width, height)) = size {
                images[i].set_natural_size(width, height);
            }
        }

        images.iter().map(|image| image.layout(boundary_width)).collect()
    }
}
