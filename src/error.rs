/// Error types surfaced at the edges of a render run (arguments, file I/O).
#[derive(Debug)]
pub enum RenderError {
    Io(std::io::Error),
    Image(image::ImageError),
    InvalidArgument(String),
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err)
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        match err {
            // File system failures stay distinguishable from decode/encode failures
            image::ImageError::IoError(e) => RenderError::Io(e),
            other => RenderError::Image(other),
        }
    }
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Io(e) => write!(f, "IO error: {}", e),
            RenderError::Image(e) => write!(f, "Image error: {}", e),
            RenderError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io(e) => Some(e),
            RenderError::Image(e) => Some(e),
            RenderError::InvalidArgument(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_io_error_maps_to_io() {
        let not_found = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = RenderError::from(image::ImageError::IoError(not_found));
        assert!(matches!(err, RenderError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_decode_error_stays_image() {
        let unsupported = image::ImageError::Unsupported(
            image::error::UnsupportedError::from_format_and_kind(
                image::error::ImageFormatHint::Unknown,
                image::error::UnsupportedErrorKind::Format(image::error::ImageFormatHint::Unknown),
            ),
        );
        assert!(matches!(RenderError::from(unsupported), RenderError::Image(_)));
    }
}
