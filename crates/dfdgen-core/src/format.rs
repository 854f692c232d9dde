//! Output formats understood by the external renderer.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::Deserialize;

/// A target format for a rendered diagram.
///
/// The lowercase name doubles as the value of the renderer's `-f` flag and
/// as the artifact file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
    #[serde(alias = "jpeg")]
    Jpg,
    Pdf,
}

impl OutputFormat {
    /// Formats offered in the format dropdown, in display order.
    pub const DISPLAY_CHOICES: [OutputFormat; 4] = [Self::Svg, Self::Png, Self::Pdf, Self::Jpg];

    /// Returns the flag value passed to the renderer.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns the file extension used for artifacts of this format.
    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    /// Returns the MIME type used when serving an artifact of this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
            Self::Pdf => "application/pdf",
        }
    }

    /// Whether a browser can show this format inline as an image.
    pub fn is_image(self) -> bool {
        !matches!(self, Self::Pdf)
    }
}

impl FromStr for OutputFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "pdf" => Ok(Self::Pdf),
            _ => Err("Unsupported output format"),
        }
    }
}

impl From<OutputFormat> for &'static str {
    fn from(val: OutputFormat) -> Self {
        match val {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}
