//! Input/output image naming.
//!
//! Uploaded images are named `input<N>.<ext>` and their annotated
//! counterparts `output<N>.<ext>`. The index is kept as the raw digit string so
//! `input007.jpg` pairs with `output007.jpg`, never `output7.jpg`.

use thiserror::Error;

pub const INPUT_PREFIX: &str = "input";
pub const OUTPUT_PREFIX: &str = "output";
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("`{0}` does not match input<N>.<jpg|jpeg|png|webp>")]
    InvalidInputName(String),
}

/// A validated input filename split into its index and extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputName {
    index: String,
    extension: String,
}

impl InputName {
    /// Parses `input<digits>.<ext>`, ignoring ASCII case.
    pub fn parse(name: &str) -> Result<Self, NamingError> {
        let invalid = || NamingError::InvalidInputName(name.to_string());

        let prefix = name.get(..INPUT_PREFIX.len()).ok_or_else(invalid)?;
        if !prefix.eq_ignore_ascii_case(INPUT_PREFIX) {
            return Err(invalid());
        }

        let (index, extension) = name[INPUT_PREFIX.len()..]
            .split_once('.')
            .ok_or_else(invalid)?;
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let extension = extension.to_ascii_lowercase();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(invalid());
        }

        Ok(Self {
            index: index.to_string(),
            extension,
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Lowercased extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn output_file_name(&self) -> String {
        format!("{}{}.{}", OUTPUT_PREFIX, self.index, self.extension)
    }
}

/// Maps an input filename to the filename of its annotated output.
pub fn encode_output_name(input_name: &str) -> Result<String, NamingError> {
    InputName::parse(input_name).map(|name| name.output_file_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_input_to_output_with_same_index() {
        assert_eq!(encode_output_name("input3.jpg").unwrap(), "output3.jpg");
        assert_eq!(encode_output_name("input12.png").unwrap(), "output12.png");
        assert_eq!(encode_output_name("input1.webp").unwrap(), "output1.webp");
        assert_eq!(encode_output_name("input9.jpeg").unwrap(), "output9.jpeg");
    }

    #[test]
    fn keeps_leading_zeros_and_lowercases_extension() {
        assert_eq!(encode_output_name("input007.JPG").unwrap(), "output007.jpg");
        assert_eq!(encode_output_name("input5.WebP").unwrap(), "output5.webp");
    }

    #[test]
    fn prefix_is_case_insensitive() {
        assert_eq!(encode_output_name("INPUT4.png").unwrap(), "output4.png");
        assert_eq!(encode_output_name("Input4.png").unwrap(), "output4.png");
    }

    #[test]
    fn rejects_names_outside_the_pattern() {
        for name in [
            "",
            "foo.jpg",
            "input.jpg",
            "input3.gif",
            "input3",
            "input3.",
            "inputx3.jpg",
            "input3a.jpg",
            "output3.jpg",
            "input3.jpg.png",
            "input3.jpgx",
            " input3.jpg",
            "../input3.jpg",
            "input-3.jpg",
        ] {
            assert_eq!(
                encode_output_name(name),
                Err(NamingError::InvalidInputName(name.to_string())),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_non_ascii_digits() {
        assert!(encode_output_name("input٣.jpg").is_err());
        assert!(encode_output_name("inpü3.jpg").is_err());
    }

    #[test]
    fn exposes_parsed_parts() {
        let name = InputName::parse("input042.PNG").unwrap();
        assert_eq!(name.index(), "042");
        assert_eq!(name.extension(), "png");
    }
}
