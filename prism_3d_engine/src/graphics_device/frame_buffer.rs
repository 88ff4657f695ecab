/// Framebuffer attachment points, completeness and renderbuffer formats
///
/// A framebuffer groups the color and depth images a pass renders into.
/// Created once and reused; attachments are swapped in place (cube faces,
/// mip levels) during bakes.

use std::fmt;

/// Attachment point of a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    /// Color attachment N
    Color(u32),
    Depth,
    DepthStencil,
}

/// Renderbuffer storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderbufferFormat {
    Depth24,
    Depth24Stencil8,
    Rgba8,
}

/// Result of a framebuffer completeness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    /// An attachment is missing storage or has zero size
    IncompleteAttachment,
    /// No image is attached at all
    MissingAttachment,
    /// Attached images differ in size
    IncompleteDimensions,
    /// Attachment formats are not renderable together
    Unsupported,
}

impl FramebufferStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, FramebufferStatus::Complete)
    }
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FramebufferStatus::Complete => "complete",
            FramebufferStatus::IncompleteAttachment => "incomplete attachment",
            FramebufferStatus::MissingAttachment => "missing attachment",
            FramebufferStatus::IncompleteDimensions => "incomplete dimensions",
            FramebufferStatus::Unsupported => "unsupported",
        };
        write!(f, "{}", name)
    }
}
